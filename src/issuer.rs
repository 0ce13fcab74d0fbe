//! Access and refresh token issuance.

use std::time::Duration;

use crate::jwt::{Claims, JwtError, TokenCodec, TokenType};

/// Default access token lifetime: 15 seconds.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(15);

/// Signing keys and lifetimes for both token kinds.
///
/// Access and refresh tokens are signed by separate codecs. They share a key
/// unless a distinct refresh secret is configured.
#[derive(Clone)]
pub struct TokenIssuer {
    access: TokenCodec,
    refresh: TokenCodec,
    access_lifetime: Duration,
    refresh_lifetime: Option<Duration>,
}

impl TokenIssuer {
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: TokenCodec::new(TokenType::Access, access_secret),
            refresh: TokenCodec::new(TokenType::Refresh, refresh_secret),
            access_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
            refresh_lifetime: None,
        }
    }

    pub fn with_access_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_lifetime = lifetime;
        self
    }

    /// Give refresh tokens a codec-enforced expiry on top of store revocation.
    pub fn with_refresh_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.refresh_lifetime = lifetime;
        self
    }

    pub fn issue_access_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.access.sign(claims, Some(self.access_lifetime))
    }

    /// Refresh tokens are not registered here; the caller owns store membership.
    pub fn issue_refresh_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.refresh.sign(claims, self.refresh_lifetime)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.access.verify(token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.refresh.verify(token)
    }
}
