use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::profile::User;

pub type AuthKey = String;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    pub key: AuthKey,
    pub user: User,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("key", &"<SENSITIVE>")
            .field("user", &self.user)
            .finish()
    }
}
