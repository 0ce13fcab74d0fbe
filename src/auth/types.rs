//! Authentication context types.

use crate::jwt::Claims;

/// Identity recovered from a verified access token.
/// Attached to request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity claims embedded in the access token
    pub claims: Claims,
}

impl AuthContext {
    /// The `username` claim, if the identity carries one.
    pub fn username(&self) -> Option<&str> {
        self.claims.get("username").and_then(|v| v.as_str())
    }
}
