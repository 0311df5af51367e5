use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
};
use corkboard_core::{
    BoardError, BoardRepo, Container, ContainerWithItems, Item, ReorderBatch, Snapshot,
    id::is_valid_id,
    model::{ContainerPatch, ItemPatch},
    validate_batch,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::sync::BoardChannel;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub repo: Arc<BoardRepo>,
    pub channel: Arc<BoardChannel>,
}

/// Generic error body for not-found and internal failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Structured body for validation failures
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

/// Server status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub active_connections: usize,
}

/// Acknowledgement for bulk reorder
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
}

/// Request body for container creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerRequest {
    pub title: String,
    pub description: Option<String>,
}

/// Request body for item creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub container_id: String,
    pub title: String,
}

/// Maps core errors onto HTTP responses.
///
/// Store detail never reaches the caller; it goes to the log only.
pub struct ApiError(BoardError);

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            BoardError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            BoardError::NotFound { kind, id } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("{kind} '{id}' not found"),
                }),
            )
                .into_response(),
            BoardError::Storage(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Create API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/board", get(get_board))
        .route("/containers", post(create_container))
        .route(
            "/containers/{id}",
            get(get_container)
                .patch(update_container)
                .delete(delete_container),
        )
        .route("/items", post(create_item))
        .route("/items/{id}", patch(update_item).delete(delete_item))
        .route("/reorder", post(apply_reorder))
        .with_state(state)
}

/// GET /api/status - Server status
async fn get_status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_connections: state.channel.connection_count(),
    })
}

/// GET /api/board - Full board snapshot
async fn get_board(State(state): State<ApiState>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.repo.snapshot()?))
}

/// GET /api/containers/:id - One container with its items
async fn get_container(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ContainerWithItems>, ApiError> {
    check_id(&id)?;
    match state.repo.get_container(&id)? {
        Some(container) => Ok(Json(container)),
        None => Err(BoardError::not_found("container", id).into()),
    }
}

/// POST /api/containers - Create a container at the end of the board
async fn create_container(
    State(state): State<ApiState>,
    Json(body): Json<CreateContainerRequest>,
) -> Result<(StatusCode, Json<Container>), ApiError> {
    check_title(&body.title)?;

    let container = state
        .repo
        .create_container(body.title.trim(), body.description.as_deref())?;

    broadcast_state(&state);
    Ok((StatusCode::CREATED, Json(container)))
}

/// PATCH /api/containers/:id - Update a container
async fn update_container(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(patch): Json<ContainerPatch>,
) -> Result<Json<Container>, ApiError> {
    check_id(&id)?;
    if let Some(title) = &patch.title {
        check_title(title)?;
    }

    let container = state.repo.update_container(&id, &patch)?;

    broadcast_state(&state);
    Ok(Json(container))
}

/// DELETE /api/containers/:id - Delete a container (items are not cascaded)
async fn delete_container(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_id(&id)?;
    state.repo.delete_container(&id)?;

    broadcast_state(&state);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items - Create an item at the end of its container
async fn create_item(
    State(state): State<ApiState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let mut errors = Vec::new();
    if !is_valid_id(&body.container_id) {
        errors.push(format!("invalid container id '{}'", body.container_id));
    }
    if body.title.trim().is_empty() {
        errors.push("title must not be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(BoardError::Validation(errors).into());
    }

    let item = state.repo.create_item(&body.container_id, body.title.trim())?;

    broadcast_state(&state);
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/items/:id - Update an item (including moving it to another
/// container)
async fn update_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, ApiError> {
    check_id(&id)?;
    if let Some(title) = &patch.title {
        check_title(title)?;
    }
    if let Some(container_id) = &patch.container_id {
        if !is_valid_id(container_id) {
            return Err(
                BoardError::validation(format!("invalid container id '{container_id}'")).into(),
            );
        }
    }

    let item = state.repo.update_item(&id, &patch)?;

    broadcast_state(&state);
    Ok(Json(item))
}

/// DELETE /api/items/:id - Delete an item
async fn delete_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_id(&id)?;
    state.repo.delete_item(&id)?;

    broadcast_state(&state);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/reorder - Apply a bulk reorder batch atomically
async fn apply_reorder(
    State(state): State<ApiState>,
    Json(batch): Json<ReorderBatch>,
) -> Result<Json<ReorderResponse>, ApiError> {
    validate_batch(&batch)?;
    state.repo.apply_reorder(&batch)?;

    broadcast_state(&state);
    Ok(Json(ReorderResponse { success: true }))
}

// ===== Helper functions =====

fn check_id(id: &str) -> Result<(), ApiError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(BoardError::validation(format!(
            "invalid id '{id}': expected 5-8 alphanumeric characters"
        ))
        .into())
    }
}

fn check_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        Err(BoardError::validation("title must not be empty").into())
    } else {
        Ok(())
    }
}

/// Re-read the board and broadcast it to every realtime client
fn broadcast_state(state: &ApiState) {
    match state.repo.snapshot() {
        Ok(board) => state.channel.broadcast_state(board),
        Err(e) => error!("Failed to read snapshot for broadcast: {}", e),
    }
}
