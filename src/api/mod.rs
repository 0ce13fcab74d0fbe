mod error;
mod protected;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::identity::IdentityVerifier;
use crate::issuer::TokenIssuer;
use crate::store::RefreshTokenStore;

pub use error::ApiError;
pub use session::IDENTITY_CLAIMS;

/// Create the API router.
pub fn create_api_router(
    issuer: Arc<TokenIssuer>,
    store: Arc<dyn RefreshTokenStore>,
    verifier: Arc<dyn IdentityVerifier>,
) -> Router {
    let session_state = session::SessionState {
        issuer: issuer.clone(),
        store,
        verifier,
    };

    let protected_state = protected::ProtectedState { issuer };

    Router::new()
        .merge(session::router(session_state))
        .merge(protected::router(protected_state))
}
