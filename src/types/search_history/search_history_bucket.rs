use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{SEARCH_HISTORY_LOCAL_CAP, SEARCH_HISTORY_MERGED_CAP};
use crate::types::profile::UID;
use crate::types::search_history::{RecentSearchEntry, SearchHistoryKey};

/// The visible search history, newest first, with unique keys.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryBucket {
    pub uid: UID,
    pub items: Vec<RecentSearchEntry>,
}

impl SearchHistoryBucket {
    pub fn new(uid: UID, items: Vec<RecentSearchEntry>, cap: usize) -> Self {
        Self {
            uid,
            items: sort_and_truncate(items, cap),
        }
    }
    /// Unions the server entries with the local ones whose key the server does not have.
    ///
    /// On key collision the server entry wins, regardless of recency.
    pub fn merge(
        local: Vec<RecentSearchEntry>,
        database: Vec<RecentSearchEntry>,
    ) -> Vec<RecentSearchEntry> {
        let database_keys = database
            .iter()
            .map(RecentSearchEntry::key)
            .collect::<HashSet<_>>();
        let items = database
            .into_iter()
            .chain(
                local
                    .into_iter()
                    .filter(|entry| !database_keys.contains(&entry.key())),
            )
            .collect();
        sort_and_truncate(items, SEARCH_HISTORY_MERGED_CAP)
    }
    /// Replaces any entry with the same key and moves the new one to the front.
    pub fn upsert(&mut self, entry: RecentSearchEntry, cap: usize) {
        let key = entry.key();
        self.items.retain(|item| item.key() != key);
        self.items.insert(0, entry);
        self.items = sort_and_truncate(std::mem::take(&mut self.items), cap);
    }
    pub fn remove(&mut self, key: &SearchHistoryKey) -> Option<RecentSearchEntry> {
        self.items
            .iter()
            .position(|item| item.key() == *key)
            .map(|position| self.items.remove(position))
    }
    pub fn contains(&self, key: &SearchHistoryKey) -> bool {
        self.items.iter().any(|item| item.key() == *key)
    }
    /// The entries that belong in local storage.
    pub fn local_items(&self) -> Vec<RecentSearchEntry> {
        self.items
            .iter()
            .filter(|item| item.is_local())
            .take(SEARCH_HISTORY_LOCAL_CAP)
            .cloned()
            .collect()
    }
}

pub(crate) fn sort_and_truncate(
    items: Vec<RecentSearchEntry>,
    cap: usize,
) -> Vec<RecentSearchEntry> {
    items
        .into_iter()
        .sorted_by(|a, b| b.timestamp.cmp(&a.timestamp))
        .take(cap)
        .collect()
}
