pub mod citation;
pub mod events;
pub mod message;

pub use citation::Citation;
pub use events::{SessionState, StreamEvent};
pub use message::{AssistantMessage, ChatMessage, Role};
