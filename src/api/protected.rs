//! Protected resource behind the access token middleware.
//!
//! - GET `/protected` - Returns data for any valid access token

use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{Auth, require_auth};
use crate::impl_has_auth_backend;
use crate::issuer::TokenIssuer;

#[derive(Clone)]
pub struct ProtectedState {
    pub issuer: Arc<TokenIssuer>,
}

impl_has_auth_backend!(ProtectedState);

pub fn router(state: ProtectedState) -> Router {
    Router::new()
        .route("/protected", get(protected_data))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<ProtectedState>,
        ))
        .with_state(state)
}

async fn protected_data(Auth(auth): Auth) -> Json<Value> {
    debug!(username = ?auth.username(), "Serving protected data");
    Json(json!({ "data": {} }))
}
