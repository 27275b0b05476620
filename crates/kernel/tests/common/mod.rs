#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] drives the REAL kernel router; only the two upstream
//! capabilities (token verification and storage) are replaced with
//! in-process doubles so every branch of the handler can be reached
//! deterministically.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use fprints_kernel::AppState;
use fprints_kernel::config::DEFAULT_ALLOWED_ORIGINS;
use fprints_kernel::file::{ImageStorage, StorageError};
use fprints_kernel::middleware::CorsPolicy;
use fprints_kernel::services::{AuthenticatedUser, IdentityProvider};

pub const VALID_TOKEN: &str = "valid-token";
pub const ENDPOINT: &str = "/fprints-delete-image";

/// Identity double accepting a fixed set of tokens.
pub struct StaticIdentity {
    users: HashMap<String, AuthenticatedUser>,
    calls: Mutex<Vec<String>>,
}

impl StaticIdentity {
    pub fn with_token(token: &str) -> Self {
        let mut users = HashMap::new();
        users.insert(
            token.to_string(),
            AuthenticatedUser {
                id: Uuid::new_v4(),
                email: Some("engineer@fprints.xyz".to_string()),
            },
        );
        Self {
            users,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tokens received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve_user(&self, token: &str) -> anyhow::Result<AuthenticatedUser> {
        self.calls.lock().push(token.to_string());
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("invalid JWT"))
    }
}

/// What [`RecordingStorage`] answers to a delete.
#[derive(Debug, Clone, Copy)]
pub enum StorageReply {
    Success,
    Status(StatusCode),
}

/// Storage double recording every deleted filename.
pub struct RecordingStorage {
    reply: StorageReply,
    deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new(reply: StorageReply) -> Self {
        Self {
            reply,
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Filenames passed to `delete` so far.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl ImageStorage for RecordingStorage {
    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        self.deleted.lock().push(filename.to_string());
        match self.reply {
            StorageReply::Success => Ok(()),
            StorageReply::Status(status) => Err(StorageError::rejected(status)),
        }
    }

    fn scheme(&self) -> &'static str {
        "memory"
    }
}

/// Test application wrapper using the REAL kernel routes.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub identity: Arc<StaticIdentity>,
    pub storage: Arc<RecordingStorage>,
}

impl TestApp {
    /// App whose storage deletes everything successfully.
    pub fn new() -> Self {
        Self::with_storage_reply(StorageReply::Success)
    }

    /// App whose storage answers every delete with `reply`.
    pub fn with_storage_reply(reply: StorageReply) -> Self {
        let identity = Arc::new(StaticIdentity::with_token(VALID_TOKEN));
        let storage = Arc::new(RecordingStorage::new(reply));
        let cors = CorsPolicy::new(
            DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        )
        .unwrap();

        let state = AppState::with_services(cors, identity.clone(), storage.clone());
        let router = fprints_kernel::routes::app(state.clone());

        Self {
            router,
            state,
            identity,
            storage,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }
}

/// POST a JSON body to the delete endpoint.
pub fn delete_request(origin: Option<&str>, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(ENDPOINT).header("content-type", "application/json");
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Read a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `Access-Control-Allow-Origin` of a response.
pub fn allow_origin(response: &Response) -> String {
    response
        .headers()
        .get("access-control-allow-origin")
        .expect("missing Access-Control-Allow-Origin")
        .to_str()
        .unwrap()
        .to_string()
}
