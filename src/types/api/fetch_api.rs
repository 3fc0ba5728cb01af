use futures::future;
use http::{header, Request};
use serde::{Deserialize, Serialize};

use crate::runtime::{ConditionalSend, Env, EnvError, EnvFutureExt, TryEnvFuture};
use crate::types::api::{APIResponse, FetchRequestParams};

pub fn fetch_api<
    E: Env,
    BODY: Serialize + ConditionalSend + 'static,
    REQ: FetchRequestParams<BODY>,
    RESP: for<'de> Deserialize<'de> + ConditionalSend + 'static,
>(
    api_request: REQ,
) -> TryEnvFuture<APIResponse<RESP>> {
    let url = match api_request.endpoint().join(&api_request.path()) {
        Ok(url) => url,
        Err(error) => return future::err(EnvError::Fetch(error.to_string())).boxed_env(),
    };
    let authorization = api_request
        .auth_key()
        .map(|auth_key| format!("Bearer {auth_key}"));
    let mut builder = Request::builder()
        .method(api_request.method())
        .uri(url.as_str());
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }
    match builder.body(api_request.body()) {
        Ok(request) => E::fetch::<_, _>(request),
        Err(error) => future::err(EnvError::Fetch(error.to_string())).boxed_env(),
    }
}
