use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

pub const SYNTHESIZE_PATH: &str = "/api/tts/audio";
pub const SPEAKERS_PATH: &str = "/api/speakers";
pub const HEALTH_PATH: &str = "/health";

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    speaker: Option<String>,
    language: Option<String>,
}

#[derive(Serialize)]
pub struct Endpoints {
    synthesize_binary: &'static str,
    speakers: &'static str,
    health: &'static str,
}

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    status: &'static str,
    model: String,
    endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    device: String,
    speakers_available: usize,
}

#[derive(Serialize)]
pub struct SpeakersResponse {
    speakers: Vec<String>,
    count: usize,
    model: String,
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "TTS API Server",
        status: "running",
        model: state.model_name().to_string(),
        endpoints: Endpoints {
            synthesize_binary: SYNTHESIZE_PATH,
            speakers: SPEAKERS_PATH,
            health: HEALTH_PATH,
        },
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.is_ready(),
        device: state.device().to_string(),
        speakers_available: state.speaker_count(),
    })
}

pub async fn list_speakers(
    State(state): State<AppState>,
) -> Result<Json<SpeakersResponse>, ApiError> {
    let model = state.model()?;
    let speakers = model.speakers().to_vec();
    Ok(Json(SpeakersResponse {
        count: speakers.len(),
        speakers,
        model: state.model_name().to_string(),
    }))
}

pub async fn synthesize_audio(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    let model = state.model()?.clone();

    let preview: String = req.text.chars().take(50).collect();
    info!(
        "Synthesizing text: {preview}... (Speaker: {:?})",
        req.speaker.as_deref()
    );

    // Inference blocks; keep it off the async workers.
    let speech = tokio::task::spawn_blocking(move || {
        model.synthesize(&req.text, req.speaker.as_deref(), req.language.as_deref())
    })
    .await
    .map_err(|join_err| {
        error!("Task join error: {join_err}");
        ApiError::Internal(format!("Task join error: {join_err}"))
    })??;

    info!(
        speaker = %speech.speaker,
        language = %speech.language,
        duration_ms = speech.duration_ms(),
        bytes = speech.wav.len(),
        "Synthesis complete"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CONTENT_DISPOSITION, "attachment; filename=speech.wav"),
        ],
        speech.wav,
    )
        .into_response())
}
