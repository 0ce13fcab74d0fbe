//! Axum middleware and extractors for access token authentication.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::bearer::get_bearer_token;
use super::errors::AuthError;
use super::state::HasAuthBackend;
use super::types::AuthContext;

/// Core authentication logic shared by the middleware and the extractor.
/// Stateless: only the signature and expiry of the access token are checked.
pub fn authenticate_request<S>(headers: &HeaderMap, state: &S) -> Result<AuthContext, AuthError>
where
    S: HasAuthBackend,
{
    let token = get_bearer_token(headers).ok_or(AuthError::MissingCredential)?;

    let claims = state.issuer().verify_access_token(token).map_err(|e| {
        debug!(error = %e, "Rejected access token");
        AuthError::from(e)
    })?;

    Ok(AuthContext { claims })
}

/// Middleware for routes that require a valid access token.
///
/// On success the recovered [`AuthContext`] is attached to the request
/// extensions before the next stage runs.
pub async fn require_auth<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    match authenticate_request(request.headers(), &state) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for handlers that need the authenticated identity.
///
/// Uses the context attached by [`require_auth`] when present, and
/// authenticates the request itself otherwise.
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(Auth(context.clone()));
        }

        authenticate_request(&parts.headers, state).map(Auth)
    }
}
