use percent_encoding::utf8_percent_encode;
use serde::Serialize;

use crate::constants::URI_COMPONENT_ENCODE_SET;
use crate::types::search_history::RecentSearchEntry;

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItemDeepLinks {
    pub search: String,
}

impl From<&RecentSearchEntry> for SearchHistoryItemDeepLinks {
    fn from(entry: &RecentSearchEntry) -> Self {
        SearchHistoryItemDeepLinks {
            search: format!(
                "/search?query={}&type={}",
                utf8_percent_encode(&entry.query, URI_COMPONENT_ENCODE_SET),
                entry.r#type
            ),
        }
    }
}
