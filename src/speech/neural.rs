//! Neural voice using sherpa-rs VITS models
//!
//! Synthesises whole utterances and plays them on the default output
//! device through rodio.

use crate::config::sections::DEFAULT_SPEECH_RATE_WPM;
use crate::speech::{SpeechDriver, VoiceInfo};
use crate::{ChatError, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use tracing::{debug, info};

/// Paths and synthesis knobs for a VITS model
#[derive(Clone, Debug)]
pub struct NeuralVoiceConfig {
    pub model_path: String,
    pub tokens_path: String,
    pub lexicon_path: Option<String>,
    pub data_dir: Option<String>,

    /// Larger is slower speech
    pub length_scale: f32,
    pub noise_scale: f32,
    pub noise_scale_w: f32,
    pub speaker_id: i32,
}

impl NeuralVoiceConfig {
    pub fn new(model_path: impl Into<String>, tokens_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            lexicon_path: None,
            data_dir: None,
            length_scale: 1.0,
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            speaker_id: 0,
        }
    }

    /// Speaking rate in words per minute, relative to the 180 wpm baseline
    pub fn with_rate(mut self, words_per_minute: u32) -> Self {
        self.length_scale = length_scale_for(words_per_minute);
        self
    }
}

pub fn length_scale_for(words_per_minute: u32) -> f32 {
    DEFAULT_SPEECH_RATE_WPM as f32 / words_per_minute.max(1) as f32
}

/// Driver backed by a local VITS model
pub struct NeuralDriver {
    tts: VitsTts,
    config: NeuralVoiceConfig,
    sink: Option<Sink>,
}

impl NeuralDriver {
    pub fn new(config: NeuralVoiceConfig) -> Result<Self> {
        for (label, path) in [("Model", &config.model_path), ("Tokens file", &config.tokens_path)] {
            if !Path::new(path).exists() {
                return Err(ChatError::Speech(format!("{} not found: {}", label, path)));
            }
        }

        info!("Loading VITS voice from {}", config.model_path);
        let tts = VitsTts::new(vits_config(&config));

        Ok(Self {
            tts,
            config,
            sink: None,
        })
    }

    fn reload(&mut self) {
        self.tts = VitsTts::new(vits_config(&self.config));
    }
}

fn vits_config(config: &NeuralVoiceConfig) -> VitsTtsConfig {
    VitsTtsConfig {
        model: config.model_path.clone(),
        tokens: config.tokens_path.clone(),
        lexicon: config.lexicon_path.clone().unwrap_or_default(),
        data_dir: config.data_dir.clone().unwrap_or_default(),
        length_scale: config.length_scale,
        noise_scale: config.noise_scale,
        noise_scale_w: config.noise_scale_w,
        ..Default::default()
    }
}

impl SpeechDriver for NeuralDriver {
    fn name(&self) -> &str {
        "vits"
    }

    fn voices(&mut self) -> Result<Vec<VoiceInfo>> {
        // Multi-speaker models address voices by speaker id only
        Ok(Vec::new())
    }

    fn set_voice(&mut self, id: &str) {
        if let Ok(speaker_id) = id.parse() {
            self.config.speaker_id = speaker_id;
        }
    }

    fn set_rate(&mut self, words_per_minute: u32) {
        let length_scale = length_scale_for(words_per_minute);
        if (length_scale - self.config.length_scale).abs() > f32::EPSILON {
            self.config.length_scale = length_scale;
            self.reload();
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        let audio = self
            .tts
            .create(text, self.config.speaker_id, 1.0)
            .map_err(|e| ChatError::Speech(format!("Synthesis failed: {}", e)))?;
        debug!(
            "Synthesized {} samples at {} Hz",
            audio.samples.len(),
            audio.sample_rate
        );

        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| ChatError::Speech(format!("No audio output device: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| ChatError::Speech(format!("Failed to open audio sink: {}", e)))?;

        sink.append(SamplesBuffer::new(1, audio.sample_rate as u32, audio.samples));
        self.sink.insert(sink).sleep_until_end();
        self.sink = None;
        Ok(())
    }

    fn end_loop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_scale_from_rate() {
        assert!((length_scale_for(180) - 1.0).abs() < 1e-6);
        assert!((length_scale_for(360) - 0.5).abs() < 1e-6);
        assert!((length_scale_for(90) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_rate() {
        let config = NeuralVoiceConfig::new("model.onnx", "tokens.txt").with_rate(120);
        assert!(config.lexicon_path.is_none());
        assert_eq!(config.speaker_id, 0);
        assert!((config.length_scale - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_model_is_reported() {
        let err = NeuralDriver::new(NeuralVoiceConfig::new("/nonexistent.onnx", "/nope.txt"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }
}
