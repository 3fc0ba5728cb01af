mod auth;
pub use auth::*;

mod profile;
pub use profile::*;

mod user;
pub use user::*;
