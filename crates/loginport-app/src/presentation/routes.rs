use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ApiError;
use super::page::render_listing;
use super::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMfaRequest {
    pub mfa_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMfaResponse {
    pub mfa_code: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub account: String,
    pub field: String,
    pub value: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login/:name", get(login))
        .route("/generate-mfa", post(generate_mfa))
        .route("/update-client", post(update_client))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_listing(&state.clients.snapshot().await))
}

/// Answers before the browser starts; the outcome only reaches the log.
async fn login(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let client = state
        .clients
        .find_by_name(&name)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No client named {}", name)))?;

    info!(client = %name, "Login triggered");
    let _ = state.sequencer.spawn(client);
    Ok(StatusCode::OK)
}

async fn generate_mfa(
    State(state): State<AppState>,
    Json(request): Json<GenerateMfaRequest>,
) -> Result<Json<GenerateMfaResponse>, ApiError> {
    let mfa_code = state.otp.generate(&request.mfa_secret)?;
    Ok(Json(GenerateMfaResponse { mfa_code }))
}

async fn update_client(
    State(state): State<AppState>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<StatusCode, ApiError> {
    let field = state
        .clients
        .update_field(&request.account, &request.field, request.value)
        .await?;

    info!(account = %request.account, field = field.as_str(), "Client updated");
    Ok(StatusCode::OK)
}
