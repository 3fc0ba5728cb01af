use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::constants::SEARCH_QUERY_MIN_LENGTH;

/// The search scope filter that was active when the search was made.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Debug)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchType {
    Movie,
    Tv,
    All,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Kept only on this client, a candidate for migration.
    #[default]
    Local,
    /// Stored by the API.
    Database,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearchEntry {
    pub query: String,
    pub r#type: SearchType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: EntrySource,
    /// Present only for [`EntrySource::Database`] entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Two entries with equal keys are the same search.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SearchHistoryKey {
    pub query: String,
    pub r#type: SearchType,
}

impl RecentSearchEntry {
    /// Returns `None` when the query is too short after trimming.
    pub fn new(
        query: &str,
        r#type: SearchType,
        timestamp: DateTime<Utc>,
        source: EntrySource,
    ) -> Option<Self> {
        normalize_query(query).map(|query| RecentSearchEntry {
            query,
            r#type,
            timestamp,
            source,
            id: None,
        })
    }
    pub fn key(&self) -> SearchHistoryKey {
        SearchHistoryKey {
            query: self.query.to_lowercase(),
            r#type: self.r#type,
        }
    }
    pub fn is_local(&self) -> bool {
        self.source == EntrySource::Local
    }
    pub fn into_local(self) -> Self {
        RecentSearchEntry {
            source: EntrySource::Local,
            id: None,
            ..self
        }
    }
}

pub fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim();
    if query.chars().count() >= SEARCH_QUERY_MIN_LENGTH {
        Some(query.to_owned())
    } else {
        None
    }
}
