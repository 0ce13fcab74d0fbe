pub mod api;
pub mod auth;
pub mod cli;
pub mod identity;
pub mod issuer;
pub mod jwt;
pub mod store;

use api::create_api_router;
use axum::Router;
use identity::{AcceptAllVerifier, IdentityVerifier};
use issuer::{DEFAULT_ACCESS_TOKEN_LIFETIME, TokenIssuer};
use std::sync::Arc;
use std::time::Duration;
use store::{MemoryTokenStore, RefreshTokenStore};
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Secret for signing access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens (same value as `access_secret` unless configured)
    pub refresh_secret: Vec<u8>,
    /// Lifetime of access tokens
    pub access_token_lifetime: Duration,
    /// Codec-enforced lifetime of refresh tokens; `None` relies on revocation alone
    pub refresh_token_lifetime: Option<Duration>,
    /// Registry of valid refresh tokens, shared by all handlers
    pub store: Arc<dyn RefreshTokenStore>,
    /// Credential check used by login
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl ServerConfig {
    /// Configuration with one shared secret, default lifetimes, an in-memory
    /// store and the accept-all identity verifier.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        let secret = secret.into();
        Self {
            refresh_secret: secret.clone(),
            access_secret: secret,
            access_token_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
            refresh_token_lifetime: None,
            store: Arc::new(MemoryTokenStore::new()),
            verifier: Arc::new(AcceptAllVerifier),
        }
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let issuer = Arc::new(
        TokenIssuer::new(&config.access_secret, &config.refresh_secret)
            .with_access_lifetime(config.access_token_lifetime)
            .with_refresh_lifetime(config.refresh_token_lifetime),
    );

    create_api_router(issuer, config.store.clone(), config.verifier.clone())
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
