use serde::{Deserialize, Serialize};

use crate::types::profile::{Auth, AuthKey};

pub type UID = Option<String>;

#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub auth: Option<Auth>,
}

impl Profile {
    pub fn uid(&self) -> UID {
        self.auth.as_ref().map(|auth| auth.user.id.to_owned())
    }
    pub fn auth_key(&self) -> Option<&AuthKey> {
        self.auth.as_ref().map(|auth| &auth.key)
    }
}
