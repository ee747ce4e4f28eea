//! Backend selection
//!
//! The `(use_remote_model, model_source)` pair from the model configuration
//! collapses into a closed set of supported backends. Every other
//! combination is rejected up front.

use crate::config::ModelConfig;
use crate::{ChatError, Result};
use std::fmt;

pub const MODEL_SOURCE_OPENAI: &str = "OpenAI";
pub const MODEL_SOURCE_OLLAMA: &str = "Ollama";

/// A supported model backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Hosted OpenAI chat completions API
    RemoteOpenAi,
    /// Ollama service running on this machine
    LocalOllama,
}

impl BackendKind {
    /// Resolve the backend for a flag/source pair
    pub fn resolve(use_remote_model: bool, model_source: &str) -> Result<Self> {
        match (use_remote_model, model_source) {
            (true, MODEL_SOURCE_OPENAI) => Ok(BackendKind::RemoteOpenAi),
            (false, MODEL_SOURCE_OLLAMA) => Ok(BackendKind::LocalOllama),
            _ => Err(ChatError::UnsupportedConfiguration {
                use_remote_model,
                model_source: model_source.to_string(),
            }),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, BackendKind::RemoteOpenAi)
    }
}

impl TryFrom<&ModelConfig> for BackendKind {
    type Error = ChatError;

    fn try_from(config: &ModelConfig) -> Result<Self> {
        BackendKind::resolve(config.use_remote_model, &config.model_source)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::RemoteOpenAi => write!(f, "{} (remote)", MODEL_SOURCE_OPENAI),
            BackendKind::LocalOllama => write!(f, "{} (local)", MODEL_SOURCE_OLLAMA),
        }
    }
}
