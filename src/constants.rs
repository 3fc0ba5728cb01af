use lazy_static::lazy_static;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use url::Url;

pub const RECENT_SEARCHES_STORAGE_KEY: &str = "recentSearches";
pub const SEARCH_HISTORY_API_PATH: &str = "search/recent";
pub const SEARCH_HISTORY_LOCAL_CAP: usize = 10;
pub const SEARCH_HISTORY_MERGED_CAP: usize = 20;
pub const SEARCH_QUERY_MIN_LENGTH: usize = 2;
pub const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

lazy_static! {
    pub static ref API_URL: Url =
        Url::parse("https://api.streamflix.app/").expect("API_URL parse failed");
}
