//! HTTP routes
//!
//! Thin handlers: validate the request, resolve the session, call into
//! `remote`, serialize the result.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::protocol::*;
use crate::config::FinderConfig;
use crate::error::FinderError;
use crate::remote::{self, FileContent};
use crate::session::{SessionRegistry, FALLBACK_HOME};

/// Request bodies carry whole files
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<FinderConfig>,
}

impl AppState {
    pub fn new(registry: Arc<SessionRegistry>, config: FinderConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/connect", post(connect))
        .route("/api/files", get(list_files))
        .route("/api/file", get(read_file).post(save_file))
        .route("/api/disconnect", post(disconnect))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for FinderError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            stderr: self.stderr().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for FinderError {
    fn from(rejection: JsonRejection) -> Self {
        FinderError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for FinderError {
    fn from(rejection: QueryRejection) -> Self {
        FinderError::Validation(rejection.body_text())
    }
}

async fn connect(
    State(state): State<AppState>,
    request: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, FinderError> {
    let Json(request) = request?;
    let params = request.into_params()?;
    let (session_id, home_dir) = state.registry.create(params).await?;

    Ok(Json(ConnectResponse {
        session_id,
        home_dir,
        message: "Connected successfully".to_string(),
    }))
}

async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<TreeListing>, FinderError> {
    let Query(query) = query?;
    let include_hidden = query.include_hidden();
    let session_id = require(query.session_id, "Session ID is required")?;
    let session = state.registry.get(&session_id)?;

    let path = match query.path.filter(|p| !p.is_empty()) {
        Some(path) => path,
        None if !session.home_dir.is_empty() => session.home_dir.clone(),
        None => FALLBACK_HOME.to_string(),
    };

    let entries = remote::list_directory(&session, &path, include_hidden).await?;
    Ok(Json(to_tree(entries)))
}

async fn read_file(
    State(state): State<AppState>,
    query: Result<Query<ReadFileQuery>, QueryRejection>,
) -> Result<Json<FileContent>, FinderError> {
    let Query(query) = query?;
    let (session_id, path) = match (query.session_id, query.path) {
        (Some(id), Some(path)) if !id.is_empty() && !path.is_empty() => (id, path),
        _ => {
            return Err(FinderError::Validation(
                "Session ID and file path are required".to_string(),
            ))
        }
    };
    let session = state.registry.get(&session_id)?;

    Ok(Json(remote::read_file(&session, &path).await?))
}

async fn save_file(
    State(state): State<AppState>,
    request: Result<Json<SaveFileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, FinderError> {
    let Json(request) = request?;
    let message = "Session ID, file path, and content are required";
    let session_id = require(request.session_id, message)?;
    let path = require(request.path, message)?;
    let content = request
        .content
        .ok_or_else(|| FinderError::Validation(message.to_string()))?;

    let session = state.registry.get(&session_id)?;
    remote::write_file(&session, &path, &content, state.config.staging_dir.as_deref()).await?;

    Ok(Json(MessageResponse::new("File saved successfully")))
}

async fn disconnect(
    State(state): State<AppState>,
    request: Result<Json<DisconnectRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, FinderError> {
    let Json(request) = request?;
    let session_id = require(request.session_id, "Session ID is required")?;
    if state.registry.remove(&session_id).await {
        info!("Session {} disconnected", session_id);
    }
    Ok(Json(MessageResponse::new("Disconnected successfully")))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.registry.count(),
    })
}
