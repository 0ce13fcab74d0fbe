//! Bearer token authentication.
//!
//! Dual-token system: short-lived access tokens (stateless, checked here on
//! every protected request) and refresh tokens (store-tracked, checked only
//! by the refresh endpoint). No revocation check happens in this module.

mod bearer;
mod errors;
mod extractors;
mod state;
mod types;

pub use bearer::{BEARER_SCHEME, get_bearer_token};
pub use errors::AuthError;
pub use extractors::{Auth, authenticate_request, require_auth};
pub use state::HasAuthBackend;
pub use types::AuthContext;
