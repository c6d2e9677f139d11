// Configuration for the server

use std::path::PathBuf;

use tracing::warn;
use tts_core::DevicePreference;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_config: PathBuf,
    pub model_name: Option<String>,
    pub device: DevicePreference,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            model_config: PathBuf::from("models/voice.onnx.json"),
            model_name: None,
            device: DevicePreference::Auto,
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let model_config = lookup("TTS_MODEL_CONFIG")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_config);

        let model_name = lookup("TTS_MODEL_NAME").filter(|v| !v.trim().is_empty());

        let device = match lookup("TTS_DEVICE") {
            Some(v) => v.parse().unwrap_or_else(|e| {
                warn!("Ignoring TTS_DEVICE: {e}");
                DevicePreference::Auto
            }),
            None => defaults.device,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            host,
            port,
            model_config,
            model_name,
            device,
            cors_allowed_origins,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
