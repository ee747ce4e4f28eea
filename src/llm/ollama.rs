//! Local backend: Ollama service over HTTP

use crate::config::ModelConfig;
use crate::llm::{build_http_client, check_status, resolve_base_url};
use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const OLLAMA_HOST_VAR: &str = "OLLAMA_HOST";

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a locally running Ollama service
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    options: Map<String, Value>,
}

impl OllamaClient {
    /// Create a client for the configured model and GPU count
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let base_url = resolve_base_url(
            config.base_url.as_deref(),
            OLLAMA_HOST_VAR,
            DEFAULT_OLLAMA_BASE_URL,
        );

        let mut options = config.model_parameters.clone();
        options.insert("num_gpu".to_string(), Value::from(config.gpu_count()));

        Ok(Self {
            http: build_http_client(config.request_timeout())?,
            base_url,
            model: config.model_name.clone(),
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generation options sent with every request
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Make sure the model is available locally
    ///
    /// Blocks until the download finishes. The service skips models it
    /// already has, so calling this repeatedly is cheap.
    pub async fn pull(&self) -> Result<()> {
        info!("Pulling Ollama model {} (skipped if present)", self.model);

        let response = self
            .http
            .post(format!("{}/api/pull", self.base_url))
            .json(&PullRequest {
                model: &self.model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("Failed to reach Ollama: {}", e)))?;

        let response = check_status("Ollama", response).await?;

        let status: PullResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("Malformed Ollama pull response: {}", e)))?;
        debug!("Pull finished with status '{}'", status.status);

        Ok(())
    }

    /// Run a completion over a fully formatted prompt
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending {} prompt bytes to {}", prompt.len(), self.model);

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: &self.options,
            })
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("Failed to reach Ollama: {}", e)))?;

        let response = check_status("Ollama", response).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(format!("Malformed Ollama response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(use_gpu: bool, num_gpu: Option<u64>) -> ModelConfig {
        ModelConfig {
            use_remote_model: false,
            model_source: "Ollama".to_string(),
            model_name: "llama3.1".to_string(),
            model_parameters: json!({"temperature": 0.8, "top_k": 40})
                .as_object()
                .cloned()
                .unwrap(),
            use_gpu,
            num_gpu,
            send_chat_history: true,
            base_url: Some("http://127.0.0.1:11500".to_string()),
            request_timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_options_carry_gpu_count() {
        let client = OllamaClient::from_config(&config(true, Some(2))).unwrap();
        assert_eq!(client.options()["num_gpu"], json!(2));
        assert_eq!(client.options()["top_k"], json!(40));

        let client = OllamaClient::from_config(&config(false, Some(2))).unwrap();
        assert_eq!(client.options()["num_gpu"], json!(0));
    }

    #[test]
    fn test_generate_request_shape() {
        let options = config(true, None).model_parameters;
        let body = serde_json::to_value(GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: &options,
        })
        .unwrap();
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["options"]["temperature"], json!(0.8));
    }
}
