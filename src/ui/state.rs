//! Application state management
//!
//! Holds the transcript the window shows and talks to the chat worker.

use crate::integration::{OrchestratorEvent, OrchestratorHandle};
use crate::messages::{Message, MessageMetadata, MessageStorage};
use tracing::{debug, info, warn};

/// The response currently being revealed
#[derive(Debug, Clone, Default)]
pub struct StreamingResponse {
    /// Text revealed so far
    pub text: String,
    /// Whether a turn is in flight
    pub is_generating: bool,
    /// Time the last completed turn took
    pub total_ms: Option<u64>,
}

/// Central application state
pub struct AppState {
    /// Message storage (thread-safe)
    pub messages: MessageStorage,

    /// Current text input
    pub input_text: String,

    pub streaming_response: StreamingResponse,

    /// Friendly text of the last failed turn
    pub last_error: Option<String>,

    /// Whether spoken output is on, shown in the header
    pub speech_enabled: bool,

    orchestrator: Option<OrchestratorHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            messages: MessageStorage::new(),
            input_text: String::new(),
            streaming_response: StreamingResponse::default(),
            last_error: None,
            speech_enabled: false,
            orchestrator: None,
        }
    }

    /// Connect the state to a running chat worker
    pub fn with_orchestrator(mut self, handle: OrchestratorHandle) -> Self {
        self.orchestrator = Some(handle);
        self
    }

    pub fn with_speech_enabled(mut self, enabled: bool) -> Self {
        self.speech_enabled = enabled;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// Whether the input box would send something right now
    pub fn can_send(&self) -> bool {
        !self.input_text.trim().is_empty() && !self.streaming_response.is_generating
    }

    /// Submit the current input as a user message
    pub fn send_message(&mut self) {
        if !self.can_send() {
            return;
        }
        let text = self.input_text.trim().to_string();

        self.messages.add(Message::user(text.clone()));
        self.input_text.clear();
        self.last_error = None;

        match &self.orchestrator {
            Some(handle) => match handle.submit(text) {
                Ok(()) => {
                    self.streaming_response = StreamingResponse {
                        is_generating: true,
                        ..Default::default()
                    };
                }
                Err(e) => {
                    warn!("Could not submit message: {}", e);
                    self.last_error = Some(e.user_message());
                }
            },
            None => debug!("No chat worker connected; message kept locally"),
        }
    }

    /// Drain pending worker events
    pub fn poll_events(&mut self) {
        let events: Vec<OrchestratorEvent> = match &self.orchestrator {
            Some(handle) => std::iter::from_fn(|| handle.try_recv_event()).collect(),
            None => return,
        };

        for event in events {
            self.apply_event(event);
        }
    }

    /// Update the state for one worker event
    pub fn apply_event(&mut self, event: OrchestratorEvent) {
        match event {
            OrchestratorEvent::TurnStarted(message) => {
                debug!("Turn started for {} chars", message.len());
                self.streaming_response.is_generating = true;
            }
            OrchestratorEvent::Partial(prefix) => {
                self.streaming_response.text = prefix;
            }
            OrchestratorEvent::Complete { response, total_ms } => {
                self.messages.add(Message::assistant(response).with_metadata(
                    MessageMetadata {
                        is_spoken: self.speech_enabled,
                        processing_time_ms: Some(total_ms),
                    },
                ));
                self.streaming_response = StreamingResponse {
                    total_ms: Some(total_ms),
                    ..Default::default()
                };
            }
            OrchestratorEvent::Error { message, detail } => {
                warn!("Turn failed: {}", detail);
                self.last_error = Some(message);
                self.streaming_response.is_generating = false;
                self.streaming_response.text.clear();
            }
            OrchestratorEvent::Shutdown => {
                info!("Chat worker shut down");
                self.orchestrator = None;
                self.streaming_response.is_generating = false;
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Ask the worker to stop
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.orchestrator.take() {
            let _ = handle.send_command(crate::integration::OrchestratorCommand::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::OrchestratorCommand;
    use crate::messages::Role;
    use crossbeam_channel::unbounded;

    fn connected() -> (
        AppState,
        crossbeam_channel::Receiver<OrchestratorCommand>,
        crossbeam_channel::Sender<OrchestratorEvent>,
    ) {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let state =
            AppState::new().with_orchestrator(OrchestratorHandle::from_channels(command_tx, event_rx));
        (state, command_rx, event_tx)
    }

    #[test]
    fn test_send_submits_trimmed_text() {
        let (mut state, commands, _events) = connected();
        state.input_text = "  hello  ".to_string();
        state.send_message();

        assert!(state.input_text.is_empty());
        assert!(state.streaming_response.is_generating);
        assert_eq!(state.messages.get_all()[0].text, "hello");
        assert!(matches!(commands.try_recv(), Ok(OrchestratorCommand::Submit(t)) if t == "hello"));
    }

    #[test]
    fn test_blank_input_ignored() {
        let (mut state, commands, _events) = connected();
        state.input_text = "   ".to_string();
        state.send_message();
        assert!(state.messages.is_empty());
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn test_no_second_send_while_generating() {
        let (mut state, commands, _events) = connected();
        state.input_text = "one".to_string();
        state.send_message();
        state.input_text = "two".to_string();
        state.send_message();

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.input_text, "two");
        assert_eq!(commands.try_iter().count(), 1);
    }

    #[test]
    fn test_stream_then_complete() {
        let (mut state, _commands, events) = connected();
        state.input_text = "hi".to_string();
        state.send_message();

        events.send(OrchestratorEvent::TurnStarted("hi".into())).unwrap();
        events.send(OrchestratorEvent::Partial("H".into())).unwrap();
        events.send(OrchestratorEvent::Partial("He".into())).unwrap();
        state.poll_events();
        assert_eq!(state.streaming_response.text, "He");
        assert!(state.streaming_response.is_generating);

        events
            .send(OrchestratorEvent::Complete {
                response: "Hey".into(),
                total_ms: 42,
            })
            .unwrap();
        state.poll_events();

        let messages = state.messages.get_all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].metadata.processing_time_ms, Some(42));
        assert!(!state.streaming_response.is_generating);
        assert_eq!(state.streaming_response.total_ms, Some(42));
    }

    #[test]
    fn test_error_keeps_user_message() {
        let (mut state, _commands, _events) = connected();
        state.input_text = "hi".to_string();
        state.send_message();
        state.apply_event(OrchestratorEvent::Error {
            message: "The model failed to respond. Please try again.".into(),
            detail: "Model backend error: 500".into(),
        });

        assert_eq!(state.messages.len(), 1);
        assert!(state.last_error.as_deref().unwrap().contains("try again"));
        assert!(!state.streaming_response.is_generating);
    }
}
