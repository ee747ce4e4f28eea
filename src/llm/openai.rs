//! Remote backend: OpenAI chat completions over HTTP

use crate::config::ModelConfig;
use crate::llm::{build_http_client, check_status, resolve_base_url};
use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// A role-tagged chat message
///
/// Human turns travel with the `user` role and AI turns with `assistant`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum ChatMessage {
    #[serde(rename = "user")]
    Human { content: String },
    #[serde(rename = "assistant")]
    Ai { content: String },
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        ChatMessage::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        ChatMessage::Ai {
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the hosted chat completions API
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    parameters: Map<String, Value>,
}

impl OpenAiClient {
    /// Create a client using `OPENAI_API_KEY` from the environment
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(crate::config::validator::OPENAI_API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ChatError::Backend("OPENAI_API_KEY environment variable is not set".to_string())
            })?;
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        let base_url = resolve_base_url(
            config.base_url.as_deref(),
            OPENAI_BASE_URL_VAR,
            DEFAULT_OPENAI_BASE_URL,
        );

        Ok(Self {
            http: build_http_client(config.request_timeout())?,
            base_url,
            api_key: api_key.into(),
            model: config.model_name.clone(),
            parameters: config.model_parameters.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request body: hyperparameters plus model and messages
    fn request_body(&self, messages: &[ChatMessage]) -> Result<Value> {
        let mut body = self.parameters.clone();
        body.insert("model".to_string(), Value::String(self.model.clone()));
        body.insert(
            "messages".to_string(),
            serde_json::to_value(messages)
                .map_err(|e| ChatError::Backend(format!("Failed to encode messages: {}", e)))?,
        );
        Ok(Value::Object(body))
    }

    /// Send the ordered messages and return the text of the last choice
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = self.request_body(messages)?;
        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("Failed to reach OpenAI: {}", e)))?;

        let response = check_status("OpenAI", response).await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("Malformed OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .last()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Backend("OpenAI response contained no message text".into()))
    }
}
