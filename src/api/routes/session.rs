//! Session control endpoints.
//!
//! Provides HTTP endpoints for:
//! - Submitting audio metadata (POST /submit/audio)
//! - Submitting meeting notes (POST /submit/text)
//! - Resetting the session (POST /reset)
//! - Getting session status (GET /status)
//! - Exporting the result as text (GET /result/export)

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::export::{self, ExportSection};
use crate::intake;
use crate::session::{AudioInput, SessionMachine, SessionState};

#[derive(Clone)]
pub struct SessionRouteState {
    pub machine: Arc<SessionMachine>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAudioRequest {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub section: Option<ExportSection>,
}

pub fn router(state: SessionRouteState) -> Router {
    Router::new()
        .route("/submit/audio", post(submit_audio))
        .route("/submit/text", post(submit_text))
        .route("/reset", post(reset))
        .route("/status", get(session_status))
        .route("/result/export", get(export_result))
        .with_state(state)
}

async fn submit_audio(
    State(state): State<SessionRouteState>,
    Json(req): Json<SubmitAudioRequest>,
) -> ApiResult<Json<Value>> {
    info!("Audio submission received via API: {}", req.name);

    let audio = intake::validate_audio(AudioInput {
        name: req.name,
        size_bytes: req.size_bytes,
        mime_type: req.mime_type,
        source: None,
    })?;
    let run_id = state.machine.submit_audio(audio).await?;

    Ok(Json(json!({
        "success": true,
        "run_id": run_id,
        "message": "Processing your audio file",
    })))
}

async fn submit_text(
    State(state): State<SessionRouteState>,
    Json(req): Json<SubmitTextRequest>,
) -> ApiResult<Json<Value>> {
    info!(
        "Text submission received via API: {} chars",
        req.text.chars().count()
    );

    let text = intake::validate_text(&req.text)?;
    let run_id = state.machine.submit_text(text).await?;

    Ok(Json(json!({
        "success": true,
        "run_id": run_id,
        "message": "Processing your meeting notes",
    })))
}

async fn reset(State(state): State<SessionRouteState>) -> Json<Value> {
    state.machine.reset().await;
    Json(json!({ "success": true, "stage": "idle" }))
}

async fn session_status(State(state): State<SessionRouteState>) -> Json<Value> {
    Json(status_json(&state.machine.snapshot().await))
}

async fn export_result(
    Query(query): Query<ExportQuery>,
    State(state): State<SessionRouteState>,
) -> ApiResult<String> {
    let section = query.section.unwrap_or(ExportSection::Summary);
    let result = state
        .machine
        .observe_result()
        .await
        .ok_or_else(|| ApiError::not_found("No result available yet"))?;

    Ok(export::format_section(&result, section))
}

fn status_json(state: &SessionState) -> Value {
    json!({
        "stage": state.stage.as_str(),
        "progress": state.progress,
        "stage_label": state.stage_label(),
        "run_id": state.run_id,
        "started_at": state.started_at,
        "input": state.input,
        "result": state.result,
        "last_error": state.last_error,
    })
}
