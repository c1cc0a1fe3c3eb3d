//! TC3-HMAC-SHA256 request signing for Tencent Cloud APIs.

mod canonical;
mod tc3;

use std::fmt;

pub use canonical::{CanonicalHeaders, HeaderPair};
pub use tc3::sign;

#[derive(Clone)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"********")
            .finish()
    }
}
