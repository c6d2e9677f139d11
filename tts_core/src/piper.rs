use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use piper_rs::synth::{PiperSpeechStreamParallel, PiperSpeechSynthesizer};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{Device, SpeechModel};

/// The parts of a Piper voice config (`*.onnx.json`) the service needs.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub audio: AudioSection,
    #[serde(default)]
    pub speaker_id_map: HashMap<String, i64>,
    #[serde(default)]
    pub language: Option<LanguageSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSection {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSection {
    pub code: String,
}

impl VoiceConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("voice config is not valid JSON")
    }

    /// Speaker names ordered by speaker id.
    pub fn speakers(&self) -> Vec<(String, i64)> {
        let mut speakers: Vec<(String, i64)> = self
            .speaker_id_map
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        speakers.sort_by_key(|(_, id)| *id);
        speakers
    }

    pub fn language_code(&self) -> Option<&str> {
        self.language.as_ref().map(|l| l.code.as_str())
    }
}

/// Switches the model-wide speaker; returns the piper error text on failure.
type SpeakerSelector = Box<dyn Fn(i64) -> Option<String> + Send + Sync>;

/// A Piper ONNX voice loaded through piper-rs.
pub struct PiperVoice {
    name: String,
    set_speaker: SpeakerSelector,
    synth: PiperSpeechSynthesizer,
    speakers: Vec<(String, i64)>,
    sample_rate: u32,
    language: Option<String>,
}

// PiperSpeechSynthesizer doesn't implement Debug
impl std::fmt::Debug for PiperVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiperVoice")
            .field("name", &self.name)
            .field("synth", &"<PiperSpeechSynthesizer>")
            .field("speakers", &self.speakers.len())
            .field("sample_rate", &self.sample_rate)
            .field("language", &self.language)
            .finish()
    }
}

impl PiperVoice {
    /// Load a voice from its config path; the ONNX weights are resolved by
    /// piper-rs next to the config.
    pub fn load<P: AsRef<Path>>(cfg_path: P, device: Device) -> anyhow::Result<Self> {
        let cfg_path = cfg_path.as_ref();
        let text = fs::read_to_string(cfg_path)
            .with_context(|| format!("Failed to read voice config: {}", cfg_path.display()))?;
        let config = VoiceConfig::from_json(&text)?;

        // Sessions pick up the environment's execution providers when built.
        device.register_execution_provider()?;

        let model = piper_rs::from_config_path(cfg_path)
            .map_err(|e| anyhow::anyhow!("piper load error: {e}"))?;
        let synth = PiperSpeechSynthesizer::new(model.clone())
            .map_err(|e| anyhow::anyhow!("piper synthesizer error: {e}"))?;
        let set_speaker: SpeakerSelector =
            Box::new(move |sid| model.set_speaker(sid).map(|e| e.to_string()));

        let name = voice_name(cfg_path);
        info!(
            voice = %name,
            %device,
            sample_rate = config.audio.sample_rate,
            speakers = config.speaker_id_map.len(),
            "Loaded Piper voice"
        );

        Ok(Self {
            name,
            set_speaker,
            synth,
            speakers: config.speakers(),
            sample_rate: config.audio.sample_rate,
            language: config.language_code().map(str::to_string),
        })
    }
}

impl SpeechModel for PiperVoice {
    fn name(&self) -> &str {
        &self.name
    }

    fn speakers(&self) -> Vec<String> {
        self.speakers.iter().map(|(name, _)| name.clone()).collect()
    }

    fn output_sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn tts(&self, text: &str, speaker: &str, language: &str) -> anyhow::Result<Vec<f32>> {
        if let Some(code) = self.language.as_deref() {
            if !language_matches(code, language) {
                warn!(
                    voice = %self.name,
                    requested = language,
                    "Voice speaks {code}; ignoring requested language"
                );
            }
        }

        select_speaker(&self.speakers, speaker, &self.set_speaker)
            .with_context(|| format!("voice '{}'", self.name))?;

        let iter: PiperSpeechStreamParallel = self
            .synth
            .synthesize_parallel(text.to_string(), None)
            .map_err(|e| anyhow::anyhow!("piper synth error: {e}"))?;

        let mut samples: Vec<f32> = Vec::new();
        for part in iter {
            samples.extend(
                part.map_err(|e| anyhow::anyhow!("chunk error: {e}"))?
                    .into_vec(),
            );
        }
        Ok(samples)
    }
}

/// Point the model at `speaker`. Single-speaker voices have no id map, so
/// any name renders the one voice.
fn select_speaker<F>(
    speakers: &[(String, i64)],
    speaker: &str,
    set_speaker: F,
) -> anyhow::Result<()>
where
    F: Fn(i64) -> Option<String>,
{
    if speakers.is_empty() {
        return Ok(());
    }
    let sid = speakers
        .iter()
        .find(|(name, _)| name == speaker)
        .map(|(_, id)| *id)
        .ok_or_else(|| anyhow::anyhow!("Unknown speaker '{speaker}'"))?;
    match set_speaker(sid) {
        Some(e) => Err(anyhow::anyhow!("piper speaker error: {e}")),
        None => Ok(()),
    }
}

/// `en` matches `en_US`, `en-GB`, and so on.
fn language_matches(voice_code: &str, requested: &str) -> bool {
    let primary = |code: &str| {
        code.split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    };
    primary(voice_code) == primary(requested)
}

/// `models/en_US-libritts-high.onnx.json` -> `en_US-libritts-high`
fn voice_name(cfg_path: &Path) -> String {
    let file = cfg_path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    file.trim_end_matches(".json")
        .trim_end_matches(".onnx")
        .to_string()
}
