use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    response::{Html, IntoResponse},
    Json,
};
use codecore::store::{ProjectContent, ProjectSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use teloxide::types::Update;

use super::{ApiError, AppState};
use crate::telegram::{dispatch_update, send_project_document};

/// Header Telegram uses to echo the secret given at webhook registration
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

const MINI_APP_PAGE: &str = include_str!("../../webapp/index.html");

// ============================================================================
// REQUEST / RESPONSE BODIES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveProjectRequest {
    pub user_id: i64,
    #[serde(default)]
    pub title: String,
    pub task: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SaveProjectResponse {
    pub status: &'static str,
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectRequest {
    pub user_id: i64,
    pub project_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SendToChatRequest {
    pub user_id: i64,
    #[serde(default)]
    pub title: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: i64,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET / - mini app page
pub async fn index() -> Html<&'static str> {
    Html(MINI_APP_PAGE)
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok"
    }))
}

/// POST /generate - run the enhance-then-generate pipeline
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request = json_body(payload)?;
    if request.text.trim().is_empty() {
        return Err(ApiError::validation("text must not be empty"));
    }

    log::info!("Generate request from user {}", request.user_id);
    let code = state.pipeline.run(&request.text).await?;
    Ok(Json(GenerateResponse { code }))
}

/// POST /projects/save
pub async fn save_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveProjectRequest>, JsonRejection>,
) -> Result<Json<SaveProjectResponse>, ApiError> {
    let request = json_body(payload)?;
    let id = state
        .store
        .save(request.user_id, &request.title, &request.task, &request.code)
        .await?;
    Ok(Json(SaveProjectResponse { status: "ok", id }))
}

/// GET /projects/list/{user_id} - newest first
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let Path(user_id) = user_id.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    Ok(Json(state.store.list_by_owner(user_id).await?))
}

/// GET /projects/{id}?user_id=N
///
/// Only the owner can read a project; anyone else gets the same 404 as for a
/// missing id.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    project_id: Result<Path<i64>, PathRejection>,
    owner: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<ProjectContent>, ApiError> {
    let Path(project_id) = project_id.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let Query(owner) = owner.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    Ok(Json(state.store.fetch_owned(project_id, owner.user_id).await?))
}

/// POST /projects/delete - succeeds whether or not a row matched
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteProjectRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    state
        .store
        .delete_by_id_and_owner(request.project_id, request.user_id)
        .await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /projects/send_to_chat - upload code to the user's chat as a file
pub async fn send_to_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendToChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    let link = state
        .bot
        .as_ref()
        .ok_or_else(|| codecore::AppError::Config("BOT_TOKEN is not set".to_string()))?;

    send_project_document(&link.bot, request.user_id, &request.title, &request.code)
        .await
        .map_err(|e| ApiError::Telegram(e.to_string()))?;
    Ok(Json(json!({ "status": "sent" })))
}

/// POST /webhook - Telegram update delivery
///
/// The update is handed to the bot schema on a spawned task so Telegram gets
/// its acknowledgement immediately. Bodies that do not decode are dropped
/// with `ok`, otherwise Telegram would redeliver them forever.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let received = headers.get(SECRET_TOKEN_HEADER).and_then(|value| value.to_str().ok());
    if !state.telegram.webhook_secret_matches(received) {
        return Err(ApiError::Forbidden);
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            log::warn!("Dropping undecodable update: {}", e);
            return Ok(Json(json!({ "ok": true })));
        }
    };

    match state.bot.clone() {
        Some(link) => {
            tokio::spawn(async move {
                dispatch_update(&link.handler, link.bot, update).await;
            });
        }
        None => log::warn!("Webhook update {:?} received but no bot is configured", update.id),
    }

    Ok(Json(json!({ "ok": true })))
}
