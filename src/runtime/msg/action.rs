use serde::Deserialize;

use crate::types::{
    profile::Auth,
    search_history::{RecentSearchEntry, SearchType},
};

#[derive(Clone, Deserialize, Debug)]
#[serde(tag = "action", content = "args")]
pub enum ActionCtx {
    /// Starts a session with credentials obtained by the host.
    ///
    /// Local search history is merged with the server history and migrated to it.
    Authenticate(Auth),
    Logout,
    /// Reloads the search history from storage, or from the API when authenticated.
    LoadSearchHistory,
    /// Queries shorter than [`SEARCH_QUERY_MIN_LENGTH`] after trimming are ignored.
    ///
    /// [`SEARCH_QUERY_MIN_LENGTH`]: crate::constants::SEARCH_QUERY_MIN_LENGTH
    AddSearchHistoryItem {
        query: String,
        r#type: SearchType,
    },
    RemoveSearchHistoryItem(RecentSearchEntry),
    ClearSearchHistory,
}

/// Action messages
///
/// Those messages are meant to be dispatched only by the users of the
/// `recent-searches-core` crate and handled by the crate itself.
#[derive(Clone, Deserialize, Debug)]
#[serde(tag = "action", content = "args")]
pub enum Action {
    Ctx(ActionCtx),
}
