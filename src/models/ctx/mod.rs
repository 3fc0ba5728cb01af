mod update_profile;
use update_profile::*;

mod update_search_history;
use update_search_history::*;

mod search_history_mutation;
pub use search_history_mutation::*;

mod error;
pub use error::*;

mod ctx;
pub use ctx::*;
