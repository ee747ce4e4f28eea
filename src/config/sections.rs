//! Typed views over validated configuration sections

use crate::config::{ConfigSection, SectionKind, ValidationReport};
use crate::{ChatError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_APP_NAME: &str = "LLM Chat";
pub const DEFAULT_CHAT_PLACEHOLDER_TEXT: &str = "Please ask me a question.";
pub const DEFAULT_TEXTBOX_PLACEHOLDER_TEXT: &str = "Please ask me a question.";
pub const DEFAULT_APP_THEME: &str = "Soft";
pub const DEFAULT_RESPONSE_STREAM_LAG_TIME: f64 = 0.1;
pub const DEFAULT_RESPONSE_DELAY_TIME: f64 = 0.0;
pub const DEFAULT_SPEECH_RATE_WPM: u32 = 180;

fn parse_section<T: DeserializeOwned>(kind: SectionKind, section: &ConfigSection) -> Result<T> {
    serde_json::from_value(Value::Object(section.clone()))
        .map_err(|e| ChatError::ConfigValidation(ValidationReport::single(kind, e.to_string())))
}

fn default_true() -> bool {
    true
}

/// Model backend selection and hyperparameters
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub use_remote_model: bool,
    pub model_source: String,
    pub model_name: String,
    pub model_parameters: Map<String, Value>,
    #[serde(default)]
    pub use_gpu: bool,
    #[serde(default)]
    pub num_gpu: Option<u64>,
    #[serde(default = "default_true")]
    pub send_chat_history: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ModelConfig {
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        parse_section(SectionKind::Model, section)
    }

    /// Number of GPUs handed to the local backend
    ///
    /// `num_gpu` (default 1) when `use_gpu` is set, otherwise 0.
    pub fn gpu_count(&self) -> u64 {
        if self.use_gpu {
            self.num_gpu.unwrap_or(1)
        } else {
            0
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Prompt template definition
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PromptConfig {
    pub template: String,
    pub input_variables: Vec<String>,
}

impl PromptConfig {
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        parse_section(SectionKind::Prompt, section)
    }
}

/// Response streaming and speech behaviour
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ResponseSettings {
    /// Seconds to wait before the response starts streaming
    #[serde(default = "ResponseSettings::default_delay")]
    pub response_delay_time: f64,

    /// Seconds between revealed characters
    #[serde(default = "ResponseSettings::default_lag")]
    pub response_stream_lag_time: f64,

    #[serde(default = "default_true")]
    pub speak_responses: bool,

    #[serde(default)]
    pub speech_rate_wpm: Option<f64>,

    #[serde(default)]
    pub voice_name: Option<String>,

    /// Speak through the macOS `say` command instead of the engine
    #[serde(default)]
    pub use_mac_os_speech: bool,

    #[serde(default)]
    pub tts_model_path: Option<String>,

    #[serde(default)]
    pub tts_tokens_path: Option<String>,
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self {
            response_delay_time: DEFAULT_RESPONSE_DELAY_TIME,
            response_stream_lag_time: DEFAULT_RESPONSE_STREAM_LAG_TIME,
            speak_responses: true,
            speech_rate_wpm: None,
            voice_name: None,
            use_mac_os_speech: false,
            tts_model_path: None,
            tts_tokens_path: None,
        }
    }
}

impl ResponseSettings {
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        parse_section(SectionKind::Response, section)
    }

    fn default_delay() -> f64 {
        DEFAULT_RESPONSE_DELAY_TIME
    }

    fn default_lag() -> f64 {
        DEFAULT_RESPONSE_STREAM_LAG_TIME
    }

    pub fn response_delay(&self) -> Duration {
        seconds(self.response_delay_time)
    }

    pub fn stream_lag(&self) -> Duration {
        seconds(self.response_stream_lag_time)
    }

    /// Speech rate in words per minute
    pub fn speech_rate(&self) -> u32 {
        match self.speech_rate_wpm {
            Some(wpm) if wpm.is_finite() && wpm >= 1.0 => wpm.round() as u32,
            _ => DEFAULT_SPEECH_RATE_WPM,
        }
    }
}

fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

/// UI cosmetics
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ThemeSettings {
    #[serde(default = "ThemeSettings::default_app_name")]
    pub app_name: String,

    #[serde(default = "ThemeSettings::default_chat_placeholder")]
    pub chat_placeholder_text: String,

    #[serde(default = "ThemeSettings::default_textbox_placeholder")]
    pub textbox_placeholder_text: String,

    #[serde(default = "ThemeSettings::default_source_theme")]
    pub source_theme: String,

    #[serde(default)]
    pub primary_hue: Option<String>,

    #[serde(default)]
    pub font: Vec<String>,

    #[serde(default)]
    pub load_theme_from_hf_hub: bool,

    #[serde(default)]
    pub hf_hub_theme_name: Option<String>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            app_name: Self::default_app_name(),
            chat_placeholder_text: Self::default_chat_placeholder(),
            textbox_placeholder_text: Self::default_textbox_placeholder(),
            source_theme: Self::default_source_theme(),
            primary_hue: None,
            font: Vec::new(),
            load_theme_from_hf_hub: false,
            hf_hub_theme_name: None,
        }
    }
}

impl ThemeSettings {
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        parse_section(SectionKind::Theme, section)
    }

    fn default_app_name() -> String {
        DEFAULT_APP_NAME.to_string()
    }

    fn default_chat_placeholder() -> String {
        DEFAULT_CHAT_PLACEHOLDER_TEXT.to_string()
    }

    fn default_textbox_placeholder() -> String {
        DEFAULT_TEXTBOX_PLACEHOLDER_TEXT.to_string()
    }

    fn default_source_theme() -> String {
        DEFAULT_APP_THEME.to_string()
    }

    /// Apply `APP_NAME`, `CHAT_PLACEHOLDER_TEXT` and `INITIAL_CHAT_PROMPT`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply text overrides from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup("APP_NAME") {
            self.app_name = name;
        }
        if let Some(text) = lookup("CHAT_PLACEHOLDER_TEXT") {
            self.chat_placeholder_text = text;
        }
        if let Some(text) = lookup("INITIAL_CHAT_PROMPT") {
            self.textbox_placeholder_text = text;
        }
        self
    }
}
