use std::any::Any;

use futures::future;

use crate::models::ctx::{CtxField, SearchHistoryStatus};
use crate::runtime::msg::{Action, ActionCtx, Event};
use crate::runtime::{EnvFutureExt, Runtime, RuntimeAction, RuntimeEvent, TryEnvFuture};
use crate::types::api::APIResponse;
use crate::types::profile::Profile;
use crate::types::search_history::SearchType;
use crate::unit_tests::{
    anonymous_ctx, api_item, auth, database_entry, default_fetch_handler, local_entry,
    minutes_ago, store_local_entries, stored_local_entries, Request, TestEnv, FETCH_HANDLER,
    REQUESTS, SEARCH_HISTORY_URL, USER_ID,
};

#[test]
fn actionctx_authenticate() {
    fn fetch_handler(request: Request) -> TryEnvFuture<Box<dyn Any + Send>> {
        match request {
            Request { url, method, .. } if url == SEARCH_HISTORY_URL && method == "GET" => {
                let gets = REQUESTS
                    .read()
                    .unwrap()
                    .iter()
                    .filter(|request| request.method == "GET")
                    .count();
                let items = match gets {
                    1 => vec![api_item("1", "dune", SearchType::Movie, minutes_ago(30))],
                    _ => vec![
                        api_item("2", "severance", SearchType::Tv, minutes_ago(0)),
                        api_item("1", "dune", SearchType::Movie, minutes_ago(30)),
                    ],
                };
                future::ok(Box::new(APIResponse::ok(items)) as Box<dyn Any + Send>).boxed_env()
            }
            Request { url, method, .. } if url == SEARCH_HISTORY_URL && method == "POST" => {
                future::ok(
                    Box::new(APIResponse::ok(serde_json::Value::Null)) as Box<dyn Any + Send>
                )
                .boxed_env()
            }
            _ => default_fetch_handler(request),
        }
    }
    let _env_mutex = TestEnv::reset().expect("Should have exclusive lock to TestEnv");
    *FETCH_HANDLER.write().unwrap() = Box::new(fetch_handler);
    store_local_entries(&[local_entry("severance", SearchType::Tv, minutes_ago(2))]);
    let mut ctx = anonymous_ctx();
    ctx.search_history.items = vec![local_entry("severance", SearchType::Tv, minutes_ago(2))];
    let (runtime, mut rx) = Runtime::<TestEnv, _>::new(ctx, vec![], 1000);
    TestEnv::run(|| {
        runtime.dispatch(RuntimeAction {
            field: None,
            action: Action::Ctx(ActionCtx::Authenticate(auth())),
        })
    });
    assert_eq!(
        runtime.model().unwrap().profile,
        Profile { auth: Some(auth()) },
        "profile updated successfully in memory"
    );
    assert_eq!(
        runtime.model().unwrap().search_history.uid,
        Some(USER_ID.to_owned())
    );
    assert_eq!(
        runtime.model().unwrap().search_history.items,
        vec![
            database_entry("2", "severance", SearchType::Tv, minutes_ago(0)),
            database_entry("1", "dune", SearchType::Movie, minutes_ago(30)),
        ],
        "search history merged and reloaded"
    );
    assert_eq!(
        runtime.model().unwrap().search_history_status,
        SearchHistoryStatus::Ready
    );
    assert_eq!(stored_local_entries(), None, "Local entries removed from storage");
    let mut events = vec![];
    let mut fields = vec![];
    while let Ok(Some(event)) = rx.try_next() {
        match event {
            RuntimeEvent::CoreEvent(event) => events.push(event),
            RuntimeEvent::NewState(new_fields) => fields.extend(new_fields),
        }
    }
    assert_eq!(
        fields.first(),
        Some(&CtxField::Profile),
        "profile change is reported first"
    );
    assert!(fields.contains(&CtxField::SearchHistory));
    let uid = Some(USER_ID.to_owned());
    assert_eq!(
        events,
        vec![
            Event::UserAuthenticated { uid: uid.to_owned() },
            Event::SearchHistoryPulledFromAPI { uid: uid.to_owned() },
            Event::SearchHistoryMigratedToAPI {
                uid: uid.to_owned(),
                queries: vec!["severance".to_owned()],
            },
            Event::SearchHistoryPulledFromAPI { uid },
        ]
    );
}
