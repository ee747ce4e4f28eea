pub mod history;
pub mod storage;
pub mod types;

pub use history::{ChatHistory, ChatTurn, Role};
pub use storage::MessageStorage;
pub use types::{Message, MessageMetadata};
