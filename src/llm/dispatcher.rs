//! Response dispatch
//!
//! Shapes the user's message and the prior turns into the input each
//! backend expects, calls it once and hands back the text. Backend errors
//! are returned as-is; nothing is retried.

use crate::config::ModelConfig;
use crate::llm::{BackendKind, ChatMessage, ModelHandle, PromptTemplate};
use crate::messages::{ChatTurn, Role};
use crate::{ChatError, Result};
use tracing::debug;

/// Fixed header in front of the flattened transcript sent to the local backend
pub const HISTORY_HEADER: &str = "Previous conversation:\n";

/// Role-tagged messages for the remote backend
///
/// History turns keep their order and the formatted prompt goes last.
pub fn build_remote_messages(
    prompt: String,
    history: &[ChatTurn],
    send_history: bool,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if send_history {
        messages.extend(history.iter().map(|turn| match turn.role {
            Role::User => ChatMessage::human(turn.content.clone()),
            Role::Assistant => ChatMessage::ai(turn.content.clone()),
        }));
    }
    messages.push(ChatMessage::human(prompt));
    messages
}

/// Transcript block plus raw message for the local backend
pub fn compose_local_input(message: &str, history: &[ChatTurn], send_history: bool) -> String {
    if !send_history || history.is_empty() {
        return message.to_string();
    }

    let transcript = history
        .iter()
        .map(|turn| match turn.role {
            Role::User => format!("User: {}", turn.content),
            Role::Assistant => format!("Assistant: {}", turn.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}\n\n{}", HISTORY_HEADER, transcript, message)
}

/// Produce the model's reply to `message`
pub async fn respond(
    message: &str,
    history: &[ChatTurn],
    model_config: &ModelConfig,
    handle: &ModelHandle,
    template: &PromptTemplate,
) -> Result<String> {
    let kind = BackendKind::try_from(model_config)?;
    debug!("Dispatching to {} with {} prior turns", kind, history.len());

    match (kind, handle) {
        (BackendKind::RemoteOpenAi, ModelHandle::OpenAi(client)) => {
            let prompt = template.format_question(message)?;
            let messages =
                build_remote_messages(prompt, history, model_config.send_chat_history);
            client.invoke(&messages).await
        }
        (BackendKind::LocalOllama, ModelHandle::Ollama(client)) => {
            let combined = compose_local_input(message, history, model_config.send_chat_history);
            let prompt = template.format_question(&combined)?;
            client.generate(&prompt).await
        }
        _ => Err(ChatError::UnsupportedConfiguration {
            use_remote_model: model_config.use_remote_model,
            model_source: model_config.model_source.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ChatTurn> {
        vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")]
    }

    #[test]
    fn test_local_transcript_prefix() {
        let combined = compose_local_input("how are you?", &history(), true);
        assert_eq!(
            combined,
            "Previous conversation:\nUser: hi\nAssistant: hello\n\nhow are you?"
        );
    }

    #[test]
    fn test_local_without_history() {
        assert_eq!(compose_local_input("q", &[], true), "q");
        assert_eq!(compose_local_input("q", &history(), false), "q");
    }

    #[test]
    fn test_remote_messages_keep_order() {
        let messages = build_remote_messages("Q: next".to_string(), &history(), true);
        assert_eq!(
            messages,
            vec![
                ChatMessage::human("hi"),
                ChatMessage::ai("hello"),
                ChatMessage::human("Q: next"),
            ]
        );
    }

    #[test]
    fn test_remote_messages_history_disabled() {
        let messages = build_remote_messages("only".to_string(), &history(), false);
        assert_eq!(messages, vec![ChatMessage::human("only")]);
    }
}
