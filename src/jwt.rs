//! JWT token signing and validation.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Opaque identity payload carried inside every token.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Registered claims owned by the codec. Caller-supplied values are dropped.
const RESERVED_CLAIMS: [&str; 4] = ["typ", "jti", "iat", "exp"];

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived, stateless access token
    Access,
    /// Refresh token, valid only while registered in the store
    Refresh,
}

#[derive(Serialize)]
struct SignedClaims<'a> {
    #[serde(flatten)]
    identity: &'a Claims,
    #[serde(rename = "typ")]
    token_type: TokenType,
    jti: String,
    iat: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<u64>,
}

/// Signs and verifies tokens of a single kind with a single key.
#[derive(Clone)]
pub struct TokenCodec {
    token_type: TokenType,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for `token_type` tokens keyed with `secret`.
    pub fn new(token_type: TokenType, secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // `exp` is optional: refresh tokens may carry none.
        validation.required_spec_claims.clear();
        // Identity payloads are opaque, an `aud` key in them means nothing to us.
        validation.validate_aud = false;

        Self {
            token_type,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign `claims` into a compact token.
    /// With a `lifetime`, the token embeds an absolute `exp` that `verify` enforces.
    pub fn sign(&self, claims: &Claims, lifetime: Option<Duration>) -> Result<String, JwtError> {
        let now = now_secs()?;

        let identity: Claims = claims
            .iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let signed = SignedClaims {
            identity: &identity,
            token_type: self.token_type,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: lifetime.map(|lifetime| now + lifetime.as_secs()),
        };

        jsonwebtoken::encode(&Header::default(), &signed, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Verify signature, expiry and token type, and recover the identity claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| JwtError::from_decode(token, e))?;

        let mut claims = token_data.claims;

        let token_type = claims
            .get("typ")
            .cloned()
            .and_then(|value| serde_json::from_value::<TokenType>(value).ok());
        if token_type != Some(self.token_type) {
            return Err(JwtError::WrongTokenType);
        }

        for name in RESERVED_CLAIMS {
            claims.remove(name);
        }

        Ok(claims)
    }
}

fn now_secs() -> Result<u64, JwtError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| JwtError::TimeError)?
        .as_secs())
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token cannot be parsed at all
    Malformed(jsonwebtoken::errors::Error),
    /// Signature does not match (tampered or signed with another key)
    InvalidSignature,
    /// Embedded expiry has passed
    Expired,
    /// Wrong token type (e.g., using refresh token as access token)
    WrongTokenType,
    /// System time error
    TimeError,
}

impl JwtError {
    fn from_decode(token: &str, e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
            ErrorKind::ExpiredSignature => JwtError::Expired,
            // The signature segment is decoded before comparison, so a damaged
            // signature can surface as a base64 error on an otherwise sound token.
            ErrorKind::Base64(_) if signed_part_is_well_formed(token) => {
                JwtError::InvalidSignature
            }
            _ => JwtError::Malformed(e),
        }
    }
}

/// True when the token has three segments and its header and payload decode
/// to JSON objects.
fn signed_part_is_well_formed(token: &str) -> bool {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return false;
    };

    [header, payload].into_iter().all(|segment| {
        URL_SAFE_NO_PAD
            .decode(segment)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Claims>(&bytes).ok())
            .is_some()
    })
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Malformed(e) => write!(f, "Malformed token: {}", e),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-key-for-testing";

    fn alice() -> Claims {
        json!({ "username": "alice" }).as_object().unwrap().clone()
    }

    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    fn next_symbol(c: char) -> char {
        let index = ALPHABET.find(c).unwrap();
        ALPHABET.as_bytes()[(index + 1) % ALPHABET.len()] as char
    }

    fn replace_last_char(token: &str, replace: impl Fn(char) -> char) -> String {
        let mut tampered = token.to_string();
        let last = tampered.pop().unwrap();
        tampered.push(replace(last));
        tampered
    }

    #[test]
    fn test_sign_and_verify_access_token() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);

        let token = codec.sign(&alice(), Some(Duration::from_secs(15))).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims, alice());
    }

    #[test]
    fn test_token_without_lifetime_has_no_exp() {
        let codec = TokenCodec::new(TokenType::Refresh, SECRET);

        let token = codec.sign(&alice(), None).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        let raw = jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET),
            &validation,
        )
        .unwrap();

        assert!(!raw.claims.contains_key("exp"));
        assert_eq!(codec.verify(&token).unwrap(), alice());
    }

    #[test]
    fn test_reserved_claims_are_overwritten() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);
        let mut claims = alice();
        claims.insert("exp".into(), json!(1));
        claims.insert("typ".into(), json!("refresh"));

        let token = codec.sign(&claims, Some(Duration::from_secs(15))).unwrap();

        assert_eq!(codec.verify(&token).unwrap(), alice());
    }

    #[test]
    fn test_expired_token() {
        let now = now_secs().unwrap();
        let claims = json!({
            "username": "alice",
            "typ": "access",
            "jti": "jti-1",
            "iat": now - 100,
            "exp": now - 50,
        });
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let codec = TokenCodec::new(TokenType::Access, SECRET);
        assert!(matches!(codec.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_tampered_signature() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);
        let token = codec.sign(&alice(), Some(Duration::from_secs(15))).unwrap();

        let result = codec.verify(&tamper_signature(&token));
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_last_signature_character() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);
        let token = codec.sign(&alice(), Some(Duration::from_secs(15))).unwrap();

        // The last symbol of an HS256 signature carries unused low bits, so its
        // successor in the alphabet no longer decodes.
        assert!(matches!(
            codec.verify(&replace_last_char(&token, next_symbol)),
            Err(JwtError::InvalidSignature)
        ));
        assert!(matches!(
            codec.verify(&replace_last_char(&token, |_| '!')),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_damaged_payload_is_malformed() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);
        let token = codec.sign(&alice(), Some(Duration::from_secs(15))).unwrap();
        let (header, rest) = token.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();

        let damaged = format!("{}.!!!.{}!", header, signature);

        assert!(matches!(codec.verify(&damaged), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let codec1 = TokenCodec::new(TokenType::Access, b"secret-1");
        let codec2 = TokenCodec::new(TokenType::Access, b"secret-2");

        let token = codec1.sign(&alice(), None).unwrap();

        assert!(matches!(
            codec2.verify(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let codec = TokenCodec::new(TokenType::Access, SECRET);

        assert!(matches!(
            codec.verify("invalid-token"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(codec.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let access = TokenCodec::new(TokenType::Access, SECRET);
        let refresh = TokenCodec::new(TokenType::Refresh, SECRET);

        let access_token = access.sign(&alice(), Some(Duration::from_secs(15))).unwrap();
        let refresh_token = refresh.sign(&alice(), None).unwrap();

        assert!(matches!(
            refresh.verify(&access_token),
            Err(JwtError::WrongTokenType)
        ));
        assert!(matches!(
            access.verify(&refresh_token),
            Err(JwtError::WrongTokenType)
        ));
    }

    #[test]
    fn test_unique_token_per_signing() {
        let codec = TokenCodec::new(TokenType::Refresh, SECRET);

        let token1 = codec.sign(&alice(), None).unwrap();
        let token2 = codec.sign(&alice(), None).unwrap();

        assert_ne!(token1, token2, "Each token should have a unique jti");
    }
}
