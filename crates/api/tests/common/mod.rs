#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use innovate_api::auth::token::{issue_token, TokenConfig};
use innovate_api::auth::password::hash_password;
use innovate_api::config::ServerConfig;
use innovate_api::enrichment::{EnrichmentError, MediaProbe};
use innovate_api::router::build_app_router;
use innovate_api::state::AppState;
use innovate_core::roles::ROLE_USER;
use innovate_db::models::user::{CreateUser, User};
use innovate_db::repositories::{SessionRepo, UserRepo};
use innovate_storage::memory::MemoryObjectStore;
use innovate_storage::{StorageBackend, StorageConfig, DEFAULT_BUCKET};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123!";
pub const PUBLIC_BASE_URL: &str = "http://localhost:3000/storage";
const BOUNDARY: &str = "innovate-test-boundary";

/// A `ServerConfig` with safe test defaults and a 1 MiB upload cap.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        tokens: TokenConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            session_ttl_mins: 60,
        },
        password_min_length: 8,
        max_upload_bytes: 1024 * 1024,
        enrichment_enabled: false,
        session_cleanup_interval_secs: 3600,
        storage: StorageConfig {
            backend: StorageBackend::Local {
                root: std::env::temp_dir().join("innovate-api-tests"),
            },
            bucket: DEFAULT_BUCKET.to_string(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
    }
}

pub fn memory_store() -> Arc<MemoryObjectStore> {
    Arc::new(MemoryObjectStore::new(DEFAULT_BUCKET, PUBLIC_BASE_URL))
}

/// The full router over an in-memory store, enrichment off.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, memory_store(), None)
}

/// The full router over the given store and optional probe.
pub fn build_test_app_with(
    pool: PgPool,
    storage: Arc<MemoryObjectStore>,
    probe: Option<Arc<dyn MediaProbe>>,
) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), storage, probe);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// Probe with canned answers. `None` makes the step fail.
pub struct StubProbe {
    pub duration: Option<f64>,
    pub thumbnail: Option<Vec<u8>>,
}

#[async_trait]
impl MediaProbe for StubProbe {
    async fn probe_duration(&self, _path: &Path) -> Result<f64, EnrichmentError> {
        self.duration.ok_or(EnrichmentError::NoDuration)
    }

    async fn extract_thumbnail(
        &self,
        _path: &Path,
        _duration: Option<f64>,
    ) -> Result<Vec<u8>, EnrichmentError> {
        self.thumbnail
            .clone()
            .ok_or_else(|| EnrichmentError::Io(std::io::Error::other("no frame")))
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Insert a regular user and sign them in.
pub async fn user_with_token(pool: &PgPool, email: &str) -> (User, String) {
    let user = create_user(pool, email, ROLE_USER).await;
    let token = token_for(pool, &user).await;
    (user, token)
}

/// Open a session for `user` directly and sign a token for it.
pub async fn token_for(pool: &PgPool, user: &User) -> String {
    let tokens = test_config().tokens;
    let session = SessionRepo::open(pool, user.id, chrono::Utc::now() + tokens.session_ttl())
        .await
        .expect("session should open");
    issue_token(user.id, session.id, &user.role, session.expires_at, &tokens)
        .expect("token signing should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::put(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

/// One part of a `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response {
    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

/// Upload `bytes` as `clip.mp4` and return the created video JSON.
pub async fn upload_clip(app: Router, token: &str, title: &str, bytes: &[u8]) -> serde_json::Value {
    let size = bytes.len().to_string();
    let response = post_multipart_auth(
        app,
        "/api/v1/videos",
        &[
            Part::File {
                name: "file",
                file_name: "clip.mp4",
                content_type: "video/mp4",
                bytes,
            },
            Part::Text("title", title),
            Part::Text("size", &size),
        ],
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
