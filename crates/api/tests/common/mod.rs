#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use userdir_api::auth::jwt::{JwtConfig, JwtIssuer};
use userdir_api::auth::password::{Argon2Hasher, HashConfig};
use userdir_api::config::ServerConfig;
use userdir_api::router::build_app_router;
use userdir_api::state::AppState;
use userdir_core::identity::IdentityService;
use userdir_core::store::memory::InMemoryCredentialStore;

/// Signing secret shared by the test app and tests that forge tokens.
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and the cheapest Argon2 cost.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        application_name: "User Service".to_string(),
        database_url: String::new(),
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: "User Service".to_string(),
            expiry_hours: 24,
        },
        hashing: HashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// The full application plus a handle on its store for ledger inspection.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryCredentialStore>,
}

/// Build the full application router with all middleware layers over an
/// in-memory credential store.
///
/// Uses the same [`build_app_router`] as `main.rs`, with the real Argon2
/// hasher and JWT issuer.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryCredentialStore::new());

    let hasher = Argon2Hasher::new(&config.hashing).expect("valid test hash params");
    let identity = IdentityService::new(
        store.clone(),
        Arc::new(hasher),
        Arc::new(JwtIssuer::new(config.jwt.clone())),
    );

    let state = AppState {
        identity: Arc::new(identity),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PATCH, uri, Some(token), body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
