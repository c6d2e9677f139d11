mod device;
pub mod piper;
mod speakers;
mod wav;

use std::sync::Mutex;

use tracing::{info, warn};

pub use device::{Device, DevicePreference};
pub use speakers::{resolve_speakers, FALLBACK_SPEAKERS};
pub use wav::encode_wav;

/// Language used when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A pretrained speech model. Inference is blocking; callers are expected to
/// run it off the async runtime.
pub trait SpeechModel: Send + Sync {
    /// Identifier reported to clients.
    fn name(&self) -> &str;

    /// Speakers the model can render, in model order. Empty if the model
    /// does not enumerate them.
    fn speakers(&self) -> Vec<String>;

    /// Native output sample rate in Hz.
    fn output_sample_rate(&self) -> u32;

    fn tts(&self, text: &str, speaker: &str, language: &str) -> anyhow::Result<Vec<f32>>;
}

/// Synthesized audio ready to send.
#[derive(Debug, Clone)]
pub struct Speech {
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub num_samples: usize,
    pub speaker: String,
    pub language: String,
}

impl Speech {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.num_samples as f64 / self.sample_rate as f64 * 1000.0) as u64
    }
}

/// The model plus everything resolved about it at startup. Created once and
/// shared read-only between requests.
pub struct LoadedModel {
    model: Box<dyn SpeechModel>,
    speakers: Vec<String>,
    default_speaker: String,
    device: Device,
    // Held for the whole model call; Piper's speaker selection is model-wide.
    inference: Mutex<()>,
}

// dyn SpeechModel doesn't implement Debug
impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model", &self.model.name())
            .field("speakers", &self.speakers.len())
            .field("device", &self.device)
            .finish()
    }
}

impl LoadedModel {
    pub fn new(model: Box<dyn SpeechModel>, device: Device) -> Self {
        let speakers = resolve_speakers(model.speakers());
        // resolve_speakers never returns an empty list
        let default_speaker = speakers
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_SPEAKERS[0].to_string());
        Self {
            model,
            speakers,
            default_speaker,
            device,
            inference: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn speakers(&self) -> &[String] {
        &self.speakers
    }

    /// Speaker used when a request names none: the first listed speaker.
    pub fn default_speaker(&self) -> &str {
        &self.default_speaker
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn sample_rate(&self) -> u32 {
        self.model.output_sample_rate()
    }

    /// Run the model and encode its output as WAV.
    ///
    /// An absent or empty speaker selects the first known speaker; an absent
    /// language selects [`DEFAULT_LANGUAGE`].
    pub fn synthesize(
        &self,
        text: &str,
        speaker: Option<&str>,
        language: Option<&str>,
    ) -> anyhow::Result<Speech> {
        let speaker = speaker
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_speaker.as_str())
            .to_string();
        let language = language.unwrap_or(DEFAULT_LANGUAGE).to_string();

        let samples = {
            let _guard = self.inference.lock().map_err(|_| {
                anyhow::anyhow!("Model lock poisoned by an earlier panic; restart the server")
            })?;
            self.model.tts(text, &speaker, &language)?
        };

        let sample_rate = self.model.output_sample_rate();
        let wav = encode_wav(&samples, sample_rate)?;

        Ok(Speech {
            wav,
            sample_rate,
            num_samples: samples.len(),
            speaker,
            language,
        })
    }
}

/// Build the model on `device` and resolve its speaker list.
///
/// Errors from `load` are logged and returned; the caller decides whether
/// the process can continue.
pub fn initialize<F>(device: Device, load: F) -> anyhow::Result<LoadedModel>
where
    F: FnOnce(Device) -> anyhow::Result<Box<dyn SpeechModel>>,
{
    info!("Initializing speech model...");
    info!("Using device: {device}");

    let model = load(device).map_err(|e| {
        tracing::error!("Error initializing TTS: {e:#}");
        e
    })?;

    let from_model = model.speakers();
    if from_model.is_empty() {
        warn!("Model does not enumerate speakers, using default speaker list");
    } else {
        info!("Available speakers: {:?}", from_model);
    }

    let loaded = LoadedModel::new(model, device);
    info!(
        model = loaded.name(),
        speakers = loaded.speakers().len(),
        sample_rate = loaded.sample_rate(),
        "Speech model initialized successfully"
    );
    Ok(loaded)
}
