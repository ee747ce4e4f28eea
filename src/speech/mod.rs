//! Spoken responses
//!
//! Platform detection picks the default voice and speech command, the
//! engine guards the playback loop and the queue keeps utterances from
//! overlapping.

pub mod driver;
pub mod engine;
#[cfg(feature = "neural-voice")]
pub mod neural;
pub mod normalize;
pub mod platform;
pub mod queue;

pub use driver::{resolve_voice_id, CommandDriver, SpeechDriver, SystemCommand, VoiceInfo};
pub use engine::{
    initialize, initialize_for, initialize_with_driver, normalize_config, EngineState,
    SpeechEngine,
};
pub use normalize::normalize_text;
pub use platform::Platform;
pub use queue::{SpeechCommand, SpeechQueue, SPEECH_QUEUE_CAPACITY};
