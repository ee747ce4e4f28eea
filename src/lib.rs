pub mod config;
pub mod integration;
pub mod llm;
pub mod logging;
pub mod messages;
pub mod speech;
pub mod ui;

use crate::config::ValidationReport;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatError {
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration file {path} is not valid JSON: {message}")]
    ConfigParse { path: String, message: String },

    #[error("{0}")]
    ConfigValidation(ValidationReport),

    #[error("Configuration is missing the '{0}' section")]
    MissingSection(String),

    #[error(
        "Model configuration not yet supported: use_remote_model={use_remote_model}, model_source={model_source}"
    )]
    UnsupportedConfiguration {
        use_remote_model: bool,
        model_source: String,
    },

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Model backend error: {0}")]
    Backend(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Io(e.to_string())
    }
}

impl ChatError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Configuration problems need an edit and a restart
            ChatError::ConfigNotFound { .. } => false,
            ChatError::ConfigParse { .. } => false,
            ChatError::ConfigValidation(_) => false,
            ChatError::MissingSection(_) => false,
            ChatError::UnsupportedConfiguration { .. } => false,
            // A bad template only fails the turn that used it
            ChatError::Template(_) => true,
            // Network, quota and engine hiccups are usually transient
            ChatError::Backend(_) => true,
            ChatError::Speech(_) => true,
            ChatError::Channel(_) => false,
            ChatError::Io(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ChatError::ConfigNotFound { .. }
            | ChatError::ConfigParse { .. }
            | ChatError::ConfigValidation(_)
            | ChatError::MissingSection(_) => {
                "Configuration error. Please check your configuration files.".to_string()
            }
            ChatError::UnsupportedConfiguration { .. } => {
                "This model configuration is not supported.".to_string()
            }
            ChatError::Template(_) => {
                "The prompt template could not be filled in. Please check the prompt configuration."
                    .to_string()
            }
            ChatError::Backend(_) => {
                "The model failed to respond. Please try again.".to_string()
            }
            ChatError::Speech(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            ChatError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            ChatError::Io(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_fatal() {
        let err = ChatError::ConfigNotFound {
            path: "missing.json".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_backend_errors_are_recoverable() {
        let err = ChatError::Backend("quota exceeded".to_string());
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn test_unsupported_configuration_message() {
        let err = ChatError::UnsupportedConfiguration {
            use_remote_model: true,
            model_source: "Ollama".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("not yet supported"));
        assert!(text.contains("Ollama"));
    }
}
