use serde::Serialize;

use crate::{
    models::ctx::CtxError,
    types::{profile::UID, search_history::SearchType},
};

///
/// Those messages are meant to be dispatched by the crate and handled by its
/// users and by the crate itself.
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "event", content = "args")]
pub enum Event {
    UserAuthenticated {
        uid: UID,
    },
    UserLoggedOut {
        uid: UID,
    },
    SearchHistoryPulledFromStorage {
        uid: UID,
    },
    SearchHistoryPulledFromAPI {
        uid: UID,
    },
    SearchHistoryMigratedToAPI {
        uid: UID,
        queries: Vec<String>,
    },
    SearchHistoryPushedToStorage {
        uid: UID,
    },
    SearchHistoryItemAdded {
        query: String,
        r#type: SearchType,
    },
    SearchHistoryItemRemoved {
        query: String,
        r#type: SearchType,
    },
    SearchHistoryCleared {
        uid: UID,
    },
    Error {
        error: CtxError,
        source: Box<Event>,
    },
}
