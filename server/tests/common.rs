//! Common utilities for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;
use tts_core::{Device, LoadedModel, SpeechModel};
use tts_server::{build_app, config::ServerConfig, state::AppState};

pub const STUB_SAMPLE_RATE: u32 = 24_000;

/// (text, speaker, language) for every call the stub received.
pub type CallLog = Arc<Mutex<Vec<(String, String, String)>>>;

/// A model that records what it was asked to say and returns a short tone,
/// or fails with a fixed message.
#[derive(Default)]
pub struct StubModel {
    pub speakers: Vec<String>,
    pub fail_with: Option<String>,
    pub calls: CallLog,
}

impl StubModel {
    pub fn with_speakers(names: &[&str]) -> Self {
        Self {
            speakers: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            speakers: vec!["A".to_string()],
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }
}

impl SpeechModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    fn speakers(&self) -> Vec<String> {
        self.speakers.clone()
    }

    fn output_sample_rate(&self) -> u32 {
        STUB_SAMPLE_RATE
    }

    fn tts(&self, text: &str, speaker: &str, language: &str) -> anyhow::Result<Vec<f32>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), speaker.to_string(), language.to_string()));
        if let Some(msg) = &self.fail_with {
            anyhow::bail!("{msg}");
        }
        Ok((0..2400).map(|i| (i as f32 * 0.05).sin() * 0.5).collect())
    }
}

/// App with a loaded stub model; returns the stub's call log.
pub fn ready_app(model: StubModel) -> (Router, CallLog) {
    ready_app_with_config(model, &ServerConfig::default())
}

pub fn ready_app_with_config(model: StubModel, config: &ServerConfig) -> (Router, CallLog) {
    let calls = model.calls.clone();
    let loaded = LoadedModel::new(Box::new(model), Device::Cpu);
    let state = AppState::ready(loaded, Some("XTTS v2".to_string()));
    (build_app(state, config), calls)
}

/// App whose model never finished loading.
pub fn uninitialized_app() -> Router {
    let state = AppState::uninitialized("XTTS v2", Device::Cpu);
    build_app(state, &ServerConfig::default())
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn preflight(app: Router, uri: &str, origin: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn json_body(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
