//! Language model backends
//!
//! Loading picks one of two HTTP backends from the model configuration;
//! dispatching turns a user message plus history into backend input and
//! returns the model's text.

pub mod backend;
pub mod dispatcher;
pub mod loader;
pub mod ollama;
pub mod openai;
pub mod template;

pub use backend::{BackendKind, MODEL_SOURCE_OLLAMA, MODEL_SOURCE_OPENAI};
pub use dispatcher::{build_remote_messages, compose_local_input, respond, HISTORY_HEADER};
pub use loader::{load_model, ModelHandle};
pub use ollama::OllamaClient;
pub use openai::{ChatMessage, OpenAiClient};
pub use template::{PromptTemplate, QUESTION_VARIABLE};

use crate::{ChatError, Result};
use std::time::Duration;

/// Build the shared HTTP client, with a request timeout when configured
pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ChatError::Backend(format!("Failed to build HTTP client: {}", e)))
}

/// Pick the endpoint: explicit config, then environment, then default
pub(crate) fn resolve_base_url(configured: Option<&str>, env_var: &str, default: &str) -> String {
    let raw = configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    normalize_base_url(&raw)
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        // OLLAMA_HOST is commonly given as host:port
        format!("http://{}", trimmed)
    }
}

/// Turn a non-success status into a backend error carrying the body
pub(crate) async fn check_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::Backend(format!(
        "{} API error {}: {}",
        service, status, body
    )))
}
