//! Stored login credentials.

use serde::{Deserialize, Serialize};

/// Login material for one hostname.
///
/// Looked up by exact hostname match against a target URL's host; a
/// subdomain never inherits its parent domain's credentials.
///
/// The password round-trips as cleartext between the backing store and the
/// login form; nothing encrypts it at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub domain: String,
    pub username: String,
    pub password: String,
}
