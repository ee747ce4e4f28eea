//! Application configuration
//!
//! Configuration arrives as four JSON sections (model, prompt, response,
//! theme), either as one file per section or as a single unified file. The
//! loader keeps each section as a raw JSON object; the validator checks the
//! raw objects and collects every problem before reporting; the typed views in
//! [`sections`] are derived once validation has passed.

pub mod loader;
pub mod sections;
pub mod validator;

use serde_json::{Map, Value};

pub use loader::{build_app_config, load_config, ConfigSource};
pub use sections::{ModelConfig, PromptConfig, ResponseSettings, ThemeSettings};
pub use validator::{
    validate_all_configs, validate_model_config, validate_prompt_config,
    validate_response_config, validate_section, validate_theme_config, SectionErrors,
    SectionKind, ValidationReport,
};

/// A configuration section: JSON object keyed by field name
pub type ConfigSection = Map<String, Value>;

/// All configuration sections for one process
///
/// Loaded once at startup. The only field rewritten afterwards is
/// `response.use_mac_os_speech`, which the speech subsystem may force off
/// when the host cannot honour it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppConfig {
    /// Model backend selection and hyperparameters
    pub model: ConfigSection,

    /// Prompt template definition
    pub prompt: ConfigSection,

    /// Response streaming and speech behaviour
    pub response: ConfigSection,

    /// UI cosmetics
    pub theme: ConfigSection,

    /// Configuration version (unified files only)
    pub version: Option<String>,
}

impl AppConfig {
    /// Validate every section, collecting all errors
    pub fn validate(&self) -> crate::Result<()> {
        validate_all_configs(&self.model, &self.prompt, &self.response, &self.theme)
    }

    /// Typed model section
    pub fn model_config(&self) -> crate::Result<ModelConfig> {
        ModelConfig::from_section(&self.model)
    }

    /// Typed prompt section
    pub fn prompt_config(&self) -> crate::Result<PromptConfig> {
        PromptConfig::from_section(&self.prompt)
    }

    /// Typed response section
    pub fn response_settings(&self) -> crate::Result<ResponseSettings> {
        ResponseSettings::from_section(&self.response)
    }

    /// Typed theme section
    pub fn theme_settings(&self) -> crate::Result<ThemeSettings> {
        ThemeSettings::from_section(&self.theme)
    }
}
