use crate::models::common::PendingOperation;
use crate::models::ctx::{CtxError, SearchHistoryLoadRequest, SearchHistoryMutation};
use crate::types::profile::AuthKey;
use crate::types::search_history::RecentSearchEntry;

pub type SearchHistoryPendingOperation = PendingOperation<SearchHistoryMutation>;

//
// Those messages are meant to be dispatched and handled only inside the crate
//
#[derive(Debug)]
pub enum Internal {
    /// Result for reading the local search history from storage.
    SearchHistoryStorageResult(SearchHistoryLoadRequest, Vec<RecentSearchEntry>),
    /// Result for pulling the search history from API,
    /// together with the local entries read from storage.
    SearchHistoryAPIResult(
        SearchHistoryLoadRequest,
        Vec<RecentSearchEntry>,
        Result<Vec<RecentSearchEntry>, CtxError>,
    ),
    /// Dispatched when a local change was written over the stored entries while loading.
    SearchHistoryStoragePatched(SearchHistoryLoadRequest),
    /// Dispatched when local entries were pushed to API and removed from storage.
    SearchHistoryMigrated(SearchHistoryLoadRequest, Vec<RecentSearchEntry>),
    /// Result for pushing a search history entry to API.
    SearchHistoryItemPushResult(AuthKey, RecentSearchEntry, Result<(), CtxError>),
    /// Result for deleting a single search history entry from API.
    SearchHistoryItemDeleteResult(AuthKey, SearchHistoryPendingOperation, Result<(), CtxError>),
    /// Result for deleting the whole search history from API.
    SearchHistoryClearResult(AuthKey, SearchHistoryPendingOperation, Result<(), CtxError>),
    /// Dispatched when search history changes with a flag if its already persisted.
    SearchHistoryChanged(bool),
}
