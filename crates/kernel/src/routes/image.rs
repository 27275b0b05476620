//! Image deletion route handler.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, State},
    routing::post,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ApiResponse, DeleteError, DeleteResult};
use crate::file::{StorageError, image_filename};
use crate::services::AuthenticatedUser;
use crate::state::AppState;

/// Path the front end calls.
pub const DELETE_IMAGE_PATH: &str = "/fprints-delete-image";

/// Same endpoint under the hosted edge-functions prefix.
pub const FUNCTIONS_DELETE_IMAGE_PATH: &str = "/functions/v1/fprints-delete-image";

/// Create the image router.
///
/// Requests are authenticated by the bearer middleware before the handler
/// runs.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(DELETE_IMAGE_PATH, post(delete_image))
        .route(FUNCTIONS_DELETE_IMAGE_PATH, post(delete_image))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::authenticate_bearer_token,
        ))
}

/// Deletion request body.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "imagePath", default)]
    pub image_path: Option<String>,
}

/// Delete an uploaded image.
///
/// POST /fprints-delete-image
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// Body: `{"imagePath": "<CDN URL or storage path>"}`
async fn delete_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> DeleteResult<Json<ApiResponse>> {
    let result = delete_image_inner(&state, &user, &body).await;

    let outcome = match &result {
        Ok(_) => "deleted",
        Err(e) => e.outcome(),
    };
    state.metrics().record_deletion(outcome);

    result
}

async fn delete_image_inner(
    state: &AppState,
    user: &AuthenticatedUser,
    body: &[u8],
) -> DeleteResult<Json<ApiResponse>> {
    let request = parse_request(body)?;

    let image_path = request
        .image_path
        .filter(|p| !p.is_empty())
        .ok_or_else(DeleteError::missing_image_path)?;

    let filename = image_filename(&image_path).ok_or_else(DeleteError::invalid_image_path)?;

    let started = Instant::now();
    let deleted = state.storage().delete(filename).await;
    state
        .metrics()
        .record_storage_call(started.elapsed().as_secs_f64());

    if let Err(e) = deleted {
        if let StorageError::Transport(err) = &e {
            warn!(error = %err, filename = %filename, "storage request failed");
        }
        return Err(DeleteError::UpstreamFailure(format!(
            "Failed to delete image: {e}"
        )));
    }

    info!(user_id = %user.id, filename = %filename, "image deleted");

    Ok(Json(ApiResponse::ok("Image deleted successfully")))
}

/// Parse the JSON body.
///
/// An empty body is treated as `{}` so the caller gets the missing-path
/// error rather than a parse error.
fn parse_request(body: &[u8]) -> DeleteResult<DeleteRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeleteRequest { image_path: None });
    }

    serde_json::from_slice(body)
        .map_err(|e| DeleteError::BadRequest(format!("Invalid request body: {e}")))
}
