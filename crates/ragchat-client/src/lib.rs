//! Client side of a RAG chat: builds generate requests, streams the answer
//! through `ragchat-stream`, and keeps the conversation history.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod request;
pub mod traits;

pub use client::RagClient;
pub use config::{RagClientConfig, DEFAULT_GENERATE_PATH, DEFAULT_SERVER_URL};
pub use controller::ChatController;
pub use error::{has_embedded_error, ClientError, FailureKind, EMBEDDED_ERROR_MARKER};
pub use events::event_stream;
pub use request::{GenerateOptions, GenerateRequest};
pub use traits::{FragmentStream, GenerationClient};
