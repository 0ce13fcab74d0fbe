//! Credential verification seam.
//!
//! Login delegates the question "who is this?" to an [`IdentityVerifier`].
//! The verifier turns an identity proof into the claims embedded in tokens.

use async_trait::async_trait;
use serde_json::Value;

use crate::jwt::Claims;

/// The presented identity proof was not accepted.
#[derive(Debug)]
pub struct IdentityRejected;

impl std::fmt::Display for IdentityRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity rejected")
    }
}

impl std::error::Error for IdentityRejected {}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, proof: &Value) -> Result<Claims, IdentityRejected>;
}

/// Accepts any JSON object and uses it verbatim as the identity claims.
///
/// Stand-in for a real identity store; anything that is not an object is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllVerifier;

#[async_trait]
impl IdentityVerifier for AcceptAllVerifier {
    async fn verify(&self, proof: &Value) -> Result<Claims, IdentityRejected> {
        proof.as_object().cloned().ok_or(IdentityRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_accepts_object_verbatim() {
        let proof = json!({ "username": "alice", "password": "hunter2" });

        let claims = AcceptAllVerifier.verify(&proof).await.unwrap();

        assert_eq!(Value::Object(claims), proof);
    }

    #[tokio::test]
    async fn test_rejects_non_object() {
        assert!(AcceptAllVerifier.verify(&json!("alice")).await.is_err());
        assert!(AcceptAllVerifier.verify(&json!(null)).await.is_err());
        assert!(AcceptAllVerifier.verify(&json!([1, 2])).await.is_err());
    }
}
