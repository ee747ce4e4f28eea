//! Display streaming of a finished response
//!
//! The model answers in one piece; the UI reveals it a character at a time.

use crate::config::ResponseSettings;
use std::time::Duration;
use tracing::debug;

/// Delays applied while revealing a response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamTiming {
    /// Pause before the first character
    pub delay: Duration,
    /// Pause before each character
    pub lag: Duration,
}

impl StreamTiming {
    pub fn from_settings(settings: &ResponseSettings) -> Self {
        Self {
            delay: settings.response_delay(),
            lag: settings.stream_lag(),
        }
    }

    /// No pauses at all
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            lag: Duration::ZERO,
        }
    }
}

/// Every prefix of `text` ending on a character boundary, shortest first
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .map(move |(start, c)| &text[..start + c.len_utf8()])
}

/// Wait out the pause before a response is revealed or spoken
pub async fn wait_response_delay(timing: StreamTiming) {
    if !timing.delay.is_zero() {
        tokio::time::sleep(timing.delay).await;
    }
}

/// Reveal `text` through `on_chunk`, one character per lag interval
///
/// `on_chunk` returns false when nobody is listening any more; streaming
/// stops there. Returns whether every prefix was delivered.
pub async fn stream_response<F>(text: &str, timing: StreamTiming, mut on_chunk: F) -> bool
where
    F: FnMut(&str) -> bool,
{
    for prefix in prefixes(text) {
        if !timing.lag.is_zero() {
            tokio::time::sleep(timing.lag).await;
        }
        if !on_chunk(prefix) {
            debug!("Stream receiver gone after {} bytes", prefix.len());
            return false;
        }
    }
    true
}
