//! HTTP API endpoints for driving sessions.
//!
//! A thin layer over [`Engine`]: every handler forwards to one engine
//! operation and maps [`EngineError`] onto a status code with a JSON body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::EngineError;
use crate::protocol::{ClueInput, ErrorBody, GuessInput, SessionStatus, VoteInput};
use crate::state::{ClueVerdict, Engine};

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Invalid(_) => StatusCode::BAD_REQUEST,
            EngineError::Provider(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub lobby_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WordRequest {
    pub player_token: String,
    /// Index into the offered words, random when absent
    #[serde(default)]
    pub choice: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ClueRequest {
    pub player_id: String,
    #[serde(flatten)]
    pub input: ClueInput,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub player_id: String,
    #[serde(flatten)]
    pub input: VoteInput,
}

#[derive(Debug, Serialize)]
pub struct WordResponse {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct ClueResponse {
    pub verdicts: Vec<ClueVerdict>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub recorded: bool,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    pub correct: bool,
}

pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(start_session))
        .route("/api/sessions/{id}", get(session_status))
        .route("/api/sessions/{id}/word", post(pick_word))
        .route("/api/sessions/{id}/clues", post(submit_clue))
        .route("/api/sessions/{id}/votes", post(cast_vote))
        .route("/api/sessions/{id}/guess", post(submit_guess))
        .with_state(engine)
}

/// GET /api/sessions
pub async fn list_sessions(State(engine): State<Arc<Engine>>) -> Json<Vec<SessionStatus>> {
    Json(engine.sessions().await)
}

/// POST /api/sessions
pub async fn start_session(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<StartRequest>,
) -> Result<(StatusCode, Json<SessionStatus>), EngineError> {
    let status = engine.start_session(&req.lobby_id).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

/// GET /api/sessions/{id}
pub async fn session_status(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatus>, EngineError> {
    Ok(Json(engine.status(&id).await?))
}

pub async fn pick_word(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
    Json(req): Json<WordRequest>,
) -> Result<Json<WordResponse>, EngineError> {
    let word = engine.pick_word(&id, &req.player_token, req.choice).await?;
    Ok(Json(WordResponse { word }))
}

pub async fn submit_clue(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
    Json(req): Json<ClueRequest>,
) -> Result<Json<ClueResponse>, EngineError> {
    let verdicts = engine.submit_clue(&id, &req.player_id, req.input).await?;
    Ok(Json(ClueResponse { verdicts }))
}

pub async fn cast_vote(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, EngineError> {
    let recorded = engine.cast_vote(&id, &req.player_id, req.input).await?;
    Ok(Json(VoteResponse { recorded }))
}

pub async fn submit_guess(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
    Json(input): Json<GuessInput>,
) -> Result<Json<GuessResponse>, EngineError> {
    let correct = engine.submit_guess(&id, input).await?;
    Ok(Json(GuessResponse { correct }))
}
