//! Refresh token storage for revocation.
//!
//! Only refresh tokens are stored. Access tokens are stateless and
//! short-lived, so there is nothing to clean up when they lapse.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Storage backend failure.
#[derive(Debug)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "Token store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Set of refresh tokens that are currently allowed to mint access tokens.
///
/// A token is a member from its last `add` until a following `remove`.
/// Implementations must be safe to share across concurrent handlers.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Record a token as valid. Adding an existing token is a no-op.
    async fn add(&self, token: &str) -> Result<(), StoreError>;

    /// Revoke a token. Returns whether it was present; absence is not an error.
    async fn remove(&self, token: &str) -> Result<bool, StoreError>;

    async fn contains(&self, token: &str) -> Result<bool, StoreError>;

    /// Number of live refresh tokens.
    async fn len(&self) -> Result<usize, StoreError>;
}

/// In-memory store. Unbounded, lost on restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashSet<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryTokenStore {
    async fn add(&self, token: &str) -> Result<(), StoreError> {
        self.tokens.write().await.insert(token.to_string());
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.tokens.write().await.remove(token))
    }

    async fn contains(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.tokens.read().await.contains(token))
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.tokens.read().await.len())
    }
}
