use serde::Serialize;

use crate::runtime::EnvError;
use crate::types::api::APIError;

#[derive(Clone, PartialEq, Eq, Serialize, Debug, thiserror::Error)]
#[serde(tag = "type")]
pub enum CtxError {
    #[error(transparent)]
    API(#[from] APIError),
    #[error(transparent)]
    Env(#[from] EnvError),
}
