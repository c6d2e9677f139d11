use std::sync::Arc;

use tts_core::{Device, LoadedModel};

use crate::error::ApiError;

/// Shared state handed to every handler. The model is set once at startup
/// and never replaced.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<LoadedModel>>,
    model_name: String,
    device: Device,
}

impl AppState {
    /// State for a process whose model finished loading.
    pub fn ready(model: LoadedModel, model_name: Option<String>) -> Self {
        let model_name = model_name.unwrap_or_else(|| model.name().to_string());
        let device = model.device();
        Self {
            model: Some(Arc::new(model)),
            model_name,
            device,
        }
    }

    /// State before the model is available; model-backed endpoints answer 503.
    pub fn uninitialized(model_name: impl Into<String>, device: Device) -> Self {
        Self {
            model: None,
            model_name: model_name.into(),
            device,
        }
    }

    pub fn model(&self) -> Result<&Arc<LoadedModel>, ApiError> {
        self.model.as_ref().ok_or(ApiError::ModelNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn speaker_count(&self) -> usize {
        self.model.as_ref().map_or(0, |m| m.speakers().len())
    }
}
