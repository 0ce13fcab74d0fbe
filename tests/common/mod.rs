#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tokengate::{ServerConfig, create_app};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-secret-that-is-long-enough!!";

pub fn test_config() -> ServerConfig {
    ServerConfig::with_secret(TEST_SECRET.to_vec())
}

pub fn create_test_app() -> Router {
    create_app(&test_config())
}

/// Send a request and return the status and the JSON body (Null when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, json)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn protected_request(access_token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/protected")
        .header("authorization", format!("Bearer {}", access_token))
        .body(Body::empty())
        .unwrap()
}

/// Log in as `username` and return (access_token, refresh_token).
pub async fn login(app: &Router, username: &str) -> (String, String) {
    let (status, json) = send(
        app,
        json_request("POST", "/login", &serde_json::json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);

    (
        json["accessToken"].as_str().unwrap().to_string(),
        json["refreshToken"].as_str().unwrap().to_string(),
    )
}

pub async fn refresh(app: &Router, refresh_token: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/refreshToken",
            &serde_json::json!({ "refreshToken": refresh_token }),
        ),
    )
    .await
}

pub async fn logout(app: &Router, refresh_token: &str) -> StatusCode {
    let (status, _) = send(
        app,
        json_request(
            "DELETE",
            "/logout",
            &serde_json::json!({ "refreshToken": refresh_token }),
        ),
    )
    .await;
    status
}

/// Flip the first character of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}

const BASE64URL_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Replace the last signature character with its successor in the base64url
/// alphabet. For HS256 this sets unused low bits, so the segment stops decoding.
pub fn tamper_last_signature_char(token: &str) -> String {
    let mut tampered = token.to_string();
    let last = tampered.pop().unwrap();
    let index = BASE64URL_ALPHABET.find(last).unwrap();
    tampered.push(BASE64URL_ALPHABET.as_bytes()[(index + 1) % BASE64URL_ALPHABET.len()] as char);
    tampered
}
