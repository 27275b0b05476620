//! fprints test utilities.
//!
//! Fake upstream servers for integration testing: a Supabase-style identity
//! provider and a Bunny-style storage API. Each server binds an ephemeral
//! port on 127.0.0.1 and records what it was asked to do.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{delete, get};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Bind `app` to an ephemeral local port and serve it in the background.
async fn serve(app: Router) -> Result<(String, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async {
        // Test servers die with the test runtime.
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{}:{}", addr.ip(), addr.port()), server))
}

/// Fake identity provider serving `GET /auth/v1/user`.
pub struct FakeIdentityServer {
    pub url: String,
    pub anon_key: String,
    state: Arc<IdentityState>,
    _server: JoinHandle<()>,
}

struct IdentityState {
    anon_key: String,
    users: HashMap<String, Uuid>,
    calls: Mutex<usize>,
}

impl FakeIdentityServer {
    /// Start a server accepting each `(token, user id)` pair.
    pub async fn start(anon_key: &str, users: &[(&str, Uuid)]) -> Result<Self> {
        let state = Arc::new(IdentityState {
            anon_key: anon_key.to_string(),
            users: users
                .iter()
                .map(|(token, id)| ((*token).to_string(), *id))
                .collect(),
            calls: Mutex::new(0),
        });

        let app = Router::new()
            .route("/auth/v1/user", get(get_user))
            .with_state(state.clone());
        let (url, server) = serve(app).await?;

        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            state,
            _server: server,
        })
    }

    /// Number of user lookups received.
    pub fn calls(&self) -> usize {
        *self.state.calls.lock()
    }
}

async fn get_user(
    State(state): State<Arc<IdentityState>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    *state.calls.lock() += 1;

    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    if apikey != Some(state.anon_key.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"message": "Invalid API key"}).to_string(),
        );
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token.and_then(|t| state.users.get(t)) {
        Some(id) => (
            StatusCode::OK,
            serde_json::json!({
                "id": id,
                "aud": "authenticated",
                "role": "authenticated",
                "email": format!("{id}@fprints.test"),
            })
            .to_string(),
        ),
        None => (
            StatusCode::FORBIDDEN,
            serde_json::json!({
                "code": 403,
                "error_code": "bad_jwt",
                "msg": "invalid JWT"
            })
            .to_string(),
        ),
    }
}

/// A delete request received by [`FakeStorageServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelete {
    /// Request path, still percent-encoded.
    pub path: String,
    pub access_key: Option<String>,
}

/// Fake storage API answering `DELETE /{*path}`.
pub struct FakeStorageServer {
    pub url: String,
    state: Arc<StorageState>,
    _server: JoinHandle<()>,
}

struct StorageState {
    status: StatusCode,
    deletes: Mutex<Vec<RecordedDelete>>,
}

impl FakeStorageServer {
    /// Start a server answering every delete with `status`.
    pub async fn start(status: StatusCode) -> Result<Self> {
        let state = Arc::new(StorageState {
            status,
            deletes: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/{*path}", delete(delete_object))
            .with_state(state.clone());
        let (url, server) = serve(app).await?;

        Ok(Self {
            url,
            state,
            _server: server,
        })
    }

    /// Deletes received so far.
    pub fn deletes(&self) -> Vec<RecordedDelete> {
        self.state.deletes.lock().clone()
    }
}

async fn delete_object(
    State(state): State<Arc<StorageState>>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    state.deletes.lock().push(RecordedDelete {
        path: uri.path().to_string(),
        access_key: headers
            .get("AccessKey")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });

    let body = if state.status.is_success() {
        serde_json::json!({"HttpCode": 200, "Message": "File deleted successfully."})
    } else {
        serde_json::json!({"HttpCode": state.status.as_u16(), "Message": "Object Not Found"})
    };

    (state.status, body.to_string())
}
