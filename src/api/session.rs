//! Session endpoints.
//!
//! - POST `/login` - Verify an identity proof, issue access and refresh tokens
//! - POST `/refreshToken` - Exchange a registered refresh token for a new access token
//! - DELETE `/logout` - Revoke a refresh token

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{ApiError, ResultExt};
use crate::auth::AuthError;
use crate::identity::IdentityVerifier;
use crate::issuer::TokenIssuer;
use crate::jwt::Claims;
use crate::store::RefreshTokenStore;

/// Claims carried forward when a refresh token mints a new access token.
/// Everything else in the original identity is left behind.
pub const IDENTITY_CLAIMS: [&str; 1] = ["username"];

#[derive(Clone)]
pub struct SessionState {
    pub issuer: Arc<TokenIssuer>,
    pub store: Arc<dyn RefreshTokenStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

pub fn router(state: SessionState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refreshToken", post(refresh_token))
        .route("/logout", delete(logout))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    refresh_token: Option<Value>,
}

/// Read `refreshToken` from a JSON body.
///
/// An absent or unparseable body, or a null, false, zero or empty field,
/// counts as no token. Any other non-string value is presented as its JSON
/// text, which never matches a registered token.
fn parse_refresh_token(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<TokenRequest>(body).ok()?.refresh_token? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(token) if token.is_empty() => None,
        Value::String(token) => Some(token),
        other => Some(other.to_string()),
    }
}

/// Minimal identity projection of a refresh token's claims.
fn identity_projection(claims: &Claims) -> Claims {
    claims
        .iter()
        .filter(|(key, _)| IDENTITY_CLAIMS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Verify the identity proof and issue a token pair.
/// The refresh token is registered only once both tokens exist.
async fn login(
    State(state): State<SessionState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let proof: Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::from(AuthError::IdentityRejected))?;

    let claims = state.verifier.verify(&proof).await.map_err(|e| {
        info!(error = %e, "Login rejected");
        AuthError::IdentityRejected
    })?;

    let access = state
        .issuer
        .issue_access_token(&claims)
        .signing_err("Failed to generate access token")?;
    let refresh = state
        .issuer
        .issue_refresh_token(&claims)
        .signing_err("Failed to generate refresh token")?;

    state
        .store
        .add(&refresh)
        .await
        .store_err("Failed to register refresh token")?;

    info!(
        username = ?claims.get("username").and_then(|v| v.as_str()),
        "Logged in"
    );

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            access_token: access,
            refresh_token: refresh,
        }),
    ))
}

/// Mint a new access token from a registered refresh token.
/// Store membership is checked before the signature.
async fn refresh_token(
    State(state): State<SessionState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let token = parse_refresh_token(&body).ok_or(AuthError::MissingCredential)?;

    let registered = state
        .store
        .contains(&token)
        .await
        .store_err("Failed to check refresh token")?;
    if !registered {
        debug!("Refresh token not registered");
        return Err(AuthError::UnknownOrRevokedRefreshToken.into());
    }

    let claims = state.issuer.verify_refresh_token(&token).map_err(|e| {
        warn!(error = %e, "Registered refresh token failed verification");
        AuthError::from(e)
    })?;

    let access = state
        .issuer
        .issue_access_token(&identity_projection(&claims))
        .signing_err("Failed to generate access token")?;

    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            access_token: access,
        }),
    ))
}

/// Revoke a refresh token.
/// Responds 204 whether or not the token was registered.
async fn logout(
    State(state): State<SessionState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = parse_refresh_token(&body) {
        let revoked = state
            .store
            .remove(&token)
            .await
            .store_err("Failed to revoke refresh token")?;
        debug!(revoked, "Logged out");
    }

    Ok(StatusCode::NO_CONTENT)
}
