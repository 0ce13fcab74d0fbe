//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::JwtError;

/// Token and identity failures, each terminal for the request.
///
/// "Presented nothing" is 401; "presented something invalid" is 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingCredential,
    Malformed,
    InvalidSignature,
    Expired,
    WrongTokenType,
    /// Unknown and revoked refresh tokens are deliberately indistinguishable.
    UnknownOrRevokedRefreshToken,
    IdentityRejected,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential | AuthError::IdentityRejected => StatusCode::UNAUTHORIZED,
            AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::WrongTokenType
            | AuthError::UnknownOrRevokedRefreshToken => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "Missing credentials",
            AuthError::Malformed => "Malformed token",
            AuthError::InvalidSignature => "Invalid token signature",
            AuthError::Expired => "Token has expired",
            AuthError::WrongTokenType => "Wrong token type",
            AuthError::UnknownOrRevokedRefreshToken => "Unknown or revoked refresh token",
            AuthError::IdentityRejected => "Identity rejected",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::InvalidSignature => AuthError::InvalidSignature,
            JwtError::Expired => AuthError::Expired,
            JwtError::WrongTokenType => AuthError::WrongTokenType,
            JwtError::Malformed(_) | JwtError::Encoding(_) | JwtError::TimeError => {
                AuthError::Malformed
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::IdentityRejected.status_code(),
            StatusCode::UNAUTHORIZED
        );
        for err in [
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::WrongTokenType,
            AuthError::UnknownOrRevokedRefreshToken,
        ] {
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN, "{:?}", err);
        }
    }

    #[test]
    fn test_from_jwt_error() {
        assert_eq!(
            AuthError::from(JwtError::InvalidSignature),
            AuthError::InvalidSignature
        );
        assert_eq!(AuthError::from(JwtError::Expired), AuthError::Expired);
        assert_eq!(
            AuthError::from(JwtError::WrongTokenType),
            AuthError::WrongTokenType
        );
    }
}
