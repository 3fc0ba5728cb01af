pub mod api;
pub mod profile;
pub mod search_history;
