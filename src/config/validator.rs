//! Configuration validation
//!
//! Each section validator returns `(is_valid, errors)` so a caller can report
//! every problem at once. [`validate_all_configs`] aggregates all four
//! sections into a single [`ValidationReport`].

use crate::config::loader::json_type_name;
use crate::config::ConfigSection;
use crate::llm::backend::{MODEL_SOURCE_OLLAMA, MODEL_SOURCE_OPENAI};
use crate::{ChatError, Result};
use serde_json::Value;
use std::fmt;

/// Environment variable holding the remote backend credential
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// The four configuration section kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Model,
    Prompt,
    Response,
    Theme,
}

impl SectionKind {
    /// Header line used in aggregated reports
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Model => "Model Configuration Errors:",
            SectionKind::Prompt => "Prompt Configuration Errors:",
            SectionKind::Response => "Response Configuration Errors:",
            SectionKind::Theme => "Theme Configuration Errors:",
        }
    }
}

/// Errors found in one section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionErrors {
    pub kind: SectionKind,
    pub errors: Vec<String>,
}

/// Every validation error across all sections
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub sections: Vec<SectionErrors>,
}

impl ValidationReport {
    /// Record the errors of one section; empty lists are skipped
    pub fn push(&mut self, kind: SectionKind, errors: Vec<String>) {
        if !errors.is_empty() {
            self.sections.push(SectionErrors { kind, errors });
        }
    }

    /// Report holding a single error
    pub fn single(kind: SectionKind, error: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.push(kind, vec![error.into()]);
        report
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of individual errors
    pub fn error_count(&self) -> usize {
        self.sections.iter().map(|s| s.errors.len()).sum()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration validation failed:\n")?;
        for section in &self.sections {
            write!(f, "\n{}", section.kind.header())?;
            for error in &section.errors {
                write!(f, "\n  - {}", error)?;
            }
        }
        Ok(())
    }
}

/// Validate a section of the given kind
pub fn validate_section(kind: SectionKind, config: &ConfigSection) -> (bool, Vec<String>) {
    match kind {
        SectionKind::Model => validate_model_config(config),
        SectionKind::Prompt => validate_prompt_config(config),
        SectionKind::Response => validate_response_config(config),
        SectionKind::Theme => validate_theme_config(config),
    }
}

/// Validate the model section
///
/// The remote backend additionally requires `OPENAI_API_KEY` in the
/// environment.
pub fn validate_model_config(config: &ConfigSection) -> (bool, Vec<String>) {
    let has_credential = std::env::var(OPENAI_API_KEY_VAR)
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    let errors = model_errors(config, has_credential);
    (errors.is_empty(), errors)
}

fn model_errors(config: &ConfigSection, has_credential: bool) -> Vec<String> {
    let mut errors = Vec::new();

    match config.get("use_remote_model") {
        None => errors.push(missing("use_remote_model")),
        Some(v) if !v.is_boolean() => {
            errors.push("'use_remote_model' must be a boolean (true/false)".to_string())
        }
        _ => {}
    }

    match config.get("model_source") {
        None => errors.push(missing("model_source")),
        Some(Value::String(s)) if s == MODEL_SOURCE_OPENAI || s == MODEL_SOURCE_OLLAMA => {}
        Some(other) => errors.push(format!(
            "Invalid 'model_source': '{}'. Must be '{}' or '{}'",
            display_value(other),
            MODEL_SOURCE_OPENAI,
            MODEL_SOURCE_OLLAMA
        )),
    }

    match config.get("model_name") {
        None => errors.push(missing("model_name")),
        Some(v) if !v.is_string() => errors.push("'model_name' must be a string".to_string()),
        _ => {}
    }

    match config.get("model_parameters") {
        None => errors.push(missing("model_parameters")),
        Some(v) if !v.is_object() => {
            errors.push("'model_parameters' must be a dictionary".to_string())
        }
        _ => {}
    }

    let remote = config.get("use_remote_model") == Some(&Value::Bool(true));
    let source = config.get("model_source").and_then(Value::as_str);
    if remote && source == Some(MODEL_SOURCE_OPENAI) && !has_credential {
        errors.push(format!(
            "{} environment variable is required for OpenAI models",
            OPENAI_API_KEY_VAR
        ));
    }

    check_optional(config, "use_gpu", FieldType::Boolean, &mut errors);
    check_optional(config, "num_gpu", FieldType::Count, &mut errors);
    check_optional(config, "send_chat_history", FieldType::Boolean, &mut errors);
    check_optional(config, "base_url", FieldType::String, &mut errors);
    check_optional(config, "request_timeout_secs", FieldType::Count, &mut errors);

    errors
}

/// Validate the prompt section
///
/// Every declared input variable must appear as a `{name}` placeholder.
pub fn validate_prompt_config(config: &ConfigSection) -> (bool, Vec<String>) {
    let mut errors = Vec::new();

    let variables = match config.get("input_variables") {
        None => {
            errors.push(missing("input_variables"));
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            errors.push("'input_variables' must be a list".to_string());
            None
        }
    };

    let template = match config.get("template") {
        None => {
            errors.push(missing("template"));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push("'template' must be a string".to_string());
            None
        }
    };

    if let Some(items) = variables {
        for item in items {
            match item.as_str() {
                Some(name) => {
                    if let Some(template) = template {
                        if !template.contains(&format!("{{{}}}", name)) {
                            errors.push(format!(
                                "Input variable '{}' not found in template string",
                                name
                            ));
                        }
                    }
                }
                None => errors.push(format!(
                    "Input variable {} must be a string",
                    display_value(item)
                )),
            }
        }
    }

    (errors.is_empty(), errors)
}

/// Validate the response section; every field is optional
pub fn validate_response_config(config: &ConfigSection) -> (bool, Vec<String>) {
    let mut errors = Vec::new();

    check_optional(config, "speak_responses", FieldType::Boolean, &mut errors);
    check_optional(config, "response_delay_time", FieldType::Number, &mut errors);
    check_optional(config, "response_stream_lag_time", FieldType::Number, &mut errors);
    check_optional(config, "speech_rate_wpm", FieldType::Number, &mut errors);
    check_optional(config, "voice_name", FieldType::String, &mut errors);
    check_optional(config, "use_mac_os_speech", FieldType::Boolean, &mut errors);
    check_optional(config, "tts_model_path", FieldType::String, &mut errors);
    check_optional(config, "tts_tokens_path", FieldType::String, &mut errors);

    (errors.is_empty(), errors)
}

/// Validate the theme section; every field is optional
pub fn validate_theme_config(config: &ConfigSection) -> (bool, Vec<String>) {
    let mut errors = Vec::new();

    check_optional(config, "app_name", FieldType::String, &mut errors);
    check_optional(config, "chat_placeholder_text", FieldType::String, &mut errors);
    check_optional(config, "textbox_placeholder_text", FieldType::String, &mut errors);
    check_optional(config, "source_theme", FieldType::String, &mut errors);
    check_optional(config, "primary_hue", FieldType::String, &mut errors);
    check_optional(config, "load_theme_from_hf_hub", FieldType::Boolean, &mut errors);
    check_optional(config, "hf_hub_theme_name", FieldType::String, &mut errors);
    check_optional(config, "font", FieldType::StringList, &mut errors);

    (errors.is_empty(), errors)
}

/// Validate every section and fail with all collected errors
pub fn validate_all_configs(
    model_config: &ConfigSection,
    prompt_config: &ConfigSection,
    response_config: &ConfigSection,
    theme_config: &ConfigSection,
) -> Result<()> {
    let mut report = ValidationReport::default();

    for (kind, config) in [
        (SectionKind::Model, model_config),
        (SectionKind::Prompt, prompt_config),
        (SectionKind::Response, response_config),
        (SectionKind::Theme, theme_config),
    ] {
        let (_, errors) = validate_section(kind, config);
        report.push(kind, errors);
    }

    if report.is_empty() {
        Ok(())
    } else {
        Err(ChatError::ConfigValidation(report))
    }
}

#[derive(Clone, Copy, Debug)]
enum FieldType {
    Boolean,
    /// Non-negative integer
    Count,
    Number,
    String,
    StringList,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Boolean => value.is_boolean(),
            FieldType::Count => value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldType::Boolean => "a boolean",
            FieldType::Count => "a non-negative integer",
            FieldType::Number => "a number",
            FieldType::String => "a string",
            FieldType::StringList => "a list of strings",
        }
    }
}

fn check_optional(
    config: &ConfigSection,
    field: &str,
    expected: FieldType,
    errors: &mut Vec<String>,
) {
    if let Some(value) = config.get(field) {
        if !expected.matches(value) {
            errors.push(format!(
                "'{}' must be {} if specified (found {})",
                field,
                expected.describe(),
                json_type_name(value)
            ));
        }
    }
}

fn missing(field: &str) -> String {
    format!("Missing required field: '{}'", field)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
