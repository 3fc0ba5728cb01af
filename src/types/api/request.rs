use http::Method;
use percent_encoding::utf8_percent_encode;
use serde::Serialize;
use url::Url;

use crate::constants::{API_URL, SEARCH_HISTORY_API_PATH, URI_COMPONENT_ENCODE_SET};
use crate::types::profile::AuthKey;
use crate::types::search_history::SearchType;

pub trait FetchRequestParams<T> {
    fn endpoint(&self) -> Url;
    fn method(&self) -> Method;
    fn path(&self) -> String;
    fn auth_key(&self) -> Option<&AuthKey>;
    fn body(self) -> T;
}

#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct SearchHistoryItemRequest {
    pub query: String,
    pub r#type: SearchType,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchHistoryRequest {
    Get {
        auth_key: AuthKey,
    },
    Add {
        auth_key: AuthKey,
        item: SearchHistoryItemRequest,
    },
    Delete {
        auth_key: AuthKey,
        id: String,
    },
    Clear {
        auth_key: AuthKey,
    },
}

impl FetchRequestParams<Option<SearchHistoryItemRequest>> for SearchHistoryRequest {
    fn endpoint(&self) -> Url {
        API_URL.to_owned()
    }
    fn method(&self) -> Method {
        match self {
            SearchHistoryRequest::Get { .. } => Method::GET,
            SearchHistoryRequest::Add { .. } => Method::POST,
            SearchHistoryRequest::Delete { .. } | SearchHistoryRequest::Clear { .. } => {
                Method::DELETE
            }
        }
    }
    fn path(&self) -> String {
        match self {
            SearchHistoryRequest::Delete { id, .. } => format!(
                "{}/{}",
                SEARCH_HISTORY_API_PATH,
                utf8_percent_encode(id, URI_COMPONENT_ENCODE_SET)
            ),
            _ => SEARCH_HISTORY_API_PATH.to_owned(),
        }
    }
    fn auth_key(&self) -> Option<&AuthKey> {
        match self {
            SearchHistoryRequest::Get { auth_key }
            | SearchHistoryRequest::Add { auth_key, .. }
            | SearchHistoryRequest::Delete { auth_key, .. }
            | SearchHistoryRequest::Clear { auth_key } => Some(auth_key),
        }
    }
    fn body(self) -> Option<SearchHistoryItemRequest> {
        match self {
            SearchHistoryRequest::Add { item, .. } => Some(item),
            _ => None,
        }
    }
}
