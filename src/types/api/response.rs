use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::search_history::{EntrySource, RecentSearchEntry, SearchType};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, thiserror::Error)]
#[error("{message}")]
pub struct APIError {
    pub message: String,
    pub code: u64,
}

/// The envelope of every search history API response.
#[derive(PartialEq, Serialize, Deserialize, Debug)]
pub struct APIResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub code: Option<u64>,
}

impl<T> APIResponse<T> {
    pub fn ok(data: T) -> Self {
        APIResponse {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }
    pub fn into_result(self) -> Result<Option<T>, APIError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(APIError {
                message: self
                    .message
                    .unwrap_or_else(|| "Request was not successful".to_owned()),
                code: self.code.unwrap_or_default(),
            })
        }
    }
}

/// Sometimes, the API returns only `{ "success": true }`
pub type SuccessResponse = APIResponse<serde_json::Value>;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItemResponse {
    pub id: String,
    pub query: String,
    pub r#type: SearchType,
    pub created_at: DateTime<Utc>,
}

impl From<SearchHistoryItemResponse> for RecentSearchEntry {
    fn from(item: SearchHistoryItemResponse) -> Self {
        RecentSearchEntry {
            query: item.query,
            r#type: item.r#type,
            timestamp: item.created_at,
            source: EntrySource::Database,
            id: Some(item.id),
        }
    }
}
