//! One chat session's state and the per-turn flow

use crate::config::{ModelConfig, ResponseSettings};
use crate::integration::streamer::{stream_response, wait_response_delay, StreamTiming};
use crate::llm::{respond, ModelHandle, PromptTemplate};
use crate::messages::ChatHistory;
use crate::speech::SpeechQueue;
use crate::Result;
use tracing::{debug, info};

/// Everything a turn needs, passed explicitly instead of living in globals
pub struct ChatSession {
    model_config: ModelConfig,
    response: ResponseSettings,
    model: ModelHandle,
    template: PromptTemplate,
    history: ChatHistory,
    speech: Option<SpeechQueue>,
    timing: StreamTiming,
}

impl ChatSession {
    pub fn new(
        model_config: ModelConfig,
        response: ResponseSettings,
        model: ModelHandle,
        template: PromptTemplate,
    ) -> Self {
        let timing = StreamTiming::from_settings(&response);
        Self {
            model_config,
            response,
            model,
            template,
            history: ChatHistory::new(),
            speech: None,
            timing,
        }
    }

    /// Speak responses through this queue
    pub fn with_speech(mut self, speech: SpeechQueue) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Override the streaming delays
    pub fn with_timing(mut self, timing: StreamTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn speaks_responses(&self) -> bool {
        self.response.speak_responses && self.speech.is_some()
    }

    /// Answer one user message
    ///
    /// `on_chunk` receives progressively longer prefixes of the reply and
    /// returns false to stop the reveal early. The assistant turn is recorded
    /// as soon as the backend answers. Speech and the reveal both start once
    /// the response delay has passed. When the backend fails the user turn
    /// stays in the history and the error is returned.
    pub async fn handle_turn<F>(&mut self, message: &str, on_chunk: F) -> Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        let prior = self.history.turns().to_vec();
        self.history.push_user(message);
        debug!("User: {}", message);

        let response = respond(
            message,
            &prior,
            &self.model_config,
            &self.model,
            &self.template,
        )
        .await?;
        debug!("Assistant: {}", response);

        self.history.push_assistant(response.clone());
        info!(
            "Turn complete ({} chars, {} turns in history)",
            response.chars().count(),
            self.history.len()
        );

        wait_response_delay(self.timing).await;

        if self.response.speak_responses {
            if let Some(speech) = &self.speech {
                speech.enqueue(response.clone());
            }
        }

        if !stream_response(&response, self.timing, on_chunk).await {
            info!("Display went away mid-response; stopped revealing");
        }
        Ok(response)
    }
}
