//! Model loading

use crate::config::ModelConfig;
use crate::llm::{BackendKind, OllamaClient, OpenAiClient};
use crate::Result;
use tracing::info;

/// A ready-to-use client for the configured backend
#[derive(Clone, Debug)]
pub enum ModelHandle {
    OpenAi(OpenAiClient),
    Ollama(OllamaClient),
}

impl ModelHandle {
    pub fn kind(&self) -> BackendKind {
        match self {
            ModelHandle::OpenAi(_) => BackendKind::RemoteOpenAi,
            ModelHandle::Ollama(_) => BackendKind::LocalOllama,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            ModelHandle::OpenAi(client) => client.model(),
            ModelHandle::Ollama(client) => client.model(),
        }
    }
}

/// Construct the client selected by `(use_remote_model, model_source)`
///
/// The local backend pulls the model first and waits for the download.
pub async fn load_model(config: &ModelConfig) -> Result<ModelHandle> {
    let kind = BackendKind::try_from(config)?;
    info!("Loading {} model '{}'", kind, config.model_name);

    match kind {
        BackendKind::RemoteOpenAi => Ok(ModelHandle::OpenAi(OpenAiClient::from_config(config)?)),
        BackendKind::LocalOllama => {
            let client = OllamaClient::from_config(config)?;
            client.pull().await?;
            info!(
                "Model '{}' ready at {} with {} GPU(s)",
                client.model(),
                client.base_url(),
                config.gpu_count()
            );
            Ok(ModelHandle::Ollama(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatError;
    use serde_json::Map;

    #[tokio::test]
    async fn test_unsupported_pair_is_rejected() {
        let config = ModelConfig {
            use_remote_model: true,
            model_source: "Ollama".to_string(),
            model_name: "m".to_string(),
            model_parameters: Map::new(),
            use_gpu: false,
            num_gpu: None,
            send_chat_history: true,
            base_url: None,
            request_timeout_secs: None,
        };

        let err = load_model(&config).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::UnsupportedConfiguration { use_remote_model: true, .. }
        ));
    }
}
