//! Configuration file loading
//!
//! Resolves configuration paths from the environment and parses the JSON
//! files behind them.

use crate::config::{AppConfig, ConfigSection};
use crate::{ChatError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_MODEL_CONFIG_PATH: &str = "./config/model_config_chatgpt_default.json";
pub const DEFAULT_PROMPT_CONFIG_PATH: &str = "./config/prompt_config_default.json";
pub const DEFAULT_RESPONSE_CONFIG_PATH: &str = "./config/response_config_default.json";
pub const DEFAULT_THEME_CONFIG_PATH: &str = "./config/theme_config_default.json";

/// Where the configuration lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// One JSON file per section
    Split {
        model: PathBuf,
        prompt: PathBuf,
        response: PathBuf,
        theme: PathBuf,
    },

    /// A single JSON file holding every section
    Unified(PathBuf),
}

impl ConfigSource {
    /// Resolve the source from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the source using an arbitrary variable lookup
    ///
    /// `CONFIG_PATH` selects the unified layout; otherwise each section path
    /// falls back to its default location.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("CONFIG_PATH").filter(|p| !p.trim().is_empty()) {
            return ConfigSource::Unified(PathBuf::from(path));
        }

        let resolve = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };

        ConfigSource::Split {
            model: resolve("MODEL_CONFIG_PATH", DEFAULT_MODEL_CONFIG_PATH),
            prompt: resolve("PROMPT_CONFIG_PATH", DEFAULT_PROMPT_CONFIG_PATH),
            response: resolve("RESPONSE_CONFIG_PATH", DEFAULT_RESPONSE_CONFIG_PATH),
            theme: resolve("THEME_CONFIG_PATH", DEFAULT_THEME_CONFIG_PATH),
        }
    }

    /// Load every section from this source
    pub fn load(&self) -> Result<AppConfig> {
        match self {
            ConfigSource::Split {
                model,
                prompt,
                response,
                theme,
            } => {
                info!("Loading split configuration files");
                Ok(AppConfig {
                    model: load_config(model)?,
                    prompt: load_config(prompt)?,
                    response: load_config(response)?,
                    theme: load_config(theme)?,
                    version: None,
                })
            }
            ConfigSource::Unified(path) => {
                info!("Loading unified configuration from {}", path.display());
                unify(load_config(path)?)
            }
        }
    }
}

/// Read a JSON configuration file into a section mapping
///
/// Nothing is returned unless the whole file parsed as a JSON object.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigSection> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ChatError::ConfigNotFound {
            path: shown.clone(),
        },
        _ => ChatError::Io(format!("Failed to read {}: {}", shown, e)),
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|e| ChatError::ConfigParse {
        path: shown.clone(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => {
            debug!("Loaded {} ({} keys)", shown, map.len());
            Ok(map)
        }
        other => Err(ChatError::ConfigParse {
            path: shown,
            message: format!("expected a JSON object, found {}", json_type_name(&other)),
        }),
    }
}

/// Build the application configuration from the environment
pub fn build_app_config() -> Result<AppConfig> {
    ConfigSource::from_env().load()
}

/// Split a unified document into its sections
fn unify(mut root: ConfigSection) -> Result<AppConfig> {
    let mut take_section = |name: &str, required: bool| -> Result<ConfigSection> {
        match root.remove(name) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(ChatError::ConfigParse {
                path: name.to_string(),
                message: format!("section '{}' must be a JSON object", name),
            }),
            None if required => Err(ChatError::MissingSection(name.to_string())),
            None => Ok(ConfigSection::new()),
        }
    };

    let model = take_section("model", true)?;
    let prompt = take_section("prompt", true)?;
    let response = take_section("response", false)?;
    let mut theme = take_section("theme", false)?;

    if let Some(app_name) = root.remove("app_name") {
        theme.entry("app_name").or_insert(app_name);
    }

    let version = root.remove("version").map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(AppConfig {
        model,
        prompt,
        response,
        theme,
        version,
    })
}

/// Human-readable JSON type name for diagnostics
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
