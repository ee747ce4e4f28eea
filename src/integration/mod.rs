//! Chat turn handling between the UI and the backends

pub mod orchestrator;
pub mod session;
pub mod streamer;

pub use orchestrator::{Orchestrator, OrchestratorCommand, OrchestratorEvent, OrchestratorHandle};
pub use session::ChatSession;
pub use streamer::{prefixes, stream_response, wait_response_delay, StreamTiming};
