mod recent_search_entry;
pub use recent_search_entry::*;

mod search_history_bucket;
pub use search_history_bucket::*;
