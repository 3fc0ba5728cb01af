use crate::constants::SEARCH_HISTORY_MERGED_CAP;
use crate::models::common::Reversible;
use crate::types::search_history::{sort_and_truncate, RecentSearchEntry, SearchHistoryBucket};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchHistoryMutation {
    /// Removes the entries with matching keys.
    Remove(Vec<RecentSearchEntry>),
    /// Inserts the entries whose key is missing.
    Restore(Vec<RecentSearchEntry>),
}

impl SearchHistoryMutation {
    pub fn entries(&self) -> &[RecentSearchEntry] {
        match self {
            SearchHistoryMutation::Remove(entries) | SearchHistoryMutation::Restore(entries) => {
                entries
            }
        }
    }
}

impl Reversible<SearchHistoryBucket> for SearchHistoryMutation {
    fn invert(&self, search_history: &SearchHistoryBucket) -> Self {
        match self {
            SearchHistoryMutation::Remove(entries) => SearchHistoryMutation::Restore(
                entries
                    .iter()
                    .filter_map(|entry| {
                        let key = entry.key();
                        search_history.items.iter().find(|item| item.key() == key)
                    })
                    .cloned()
                    .collect(),
            ),
            SearchHistoryMutation::Restore(entries) => SearchHistoryMutation::Remove(
                entries
                    .iter()
                    .filter(|entry| !search_history.contains(&entry.key()))
                    .cloned()
                    .collect(),
            ),
        }
    }
    fn apply(&self, search_history: &mut SearchHistoryBucket) {
        match self {
            SearchHistoryMutation::Remove(entries) => {
                for entry in entries {
                    search_history.remove(&entry.key());
                }
            }
            SearchHistoryMutation::Restore(entries) => {
                let missing = entries
                    .iter()
                    .filter(|entry| !search_history.contains(&entry.key()))
                    .cloned()
                    .collect::<Vec<_>>();
                search_history.items.extend(missing);
                search_history.items = sort_and_truncate(
                    std::mem::take(&mut search_history.items),
                    SEARCH_HISTORY_MERGED_CAP,
                );
            }
        }
    }
}
