//! # Ragchat - streaming chat client for RAG servers
//!
//! Ragchat talks to a retrieval-augmented generation server that answers with
//! newline-delimited `data: <json>` events, and turns that stream into text
//! updates, a citation list and one final assistant message.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut chat = ChatBuilder::new()
//!         .server_url("http://localhost:8081")
//!         .collection("default")
//!         .build()?;
//!
//!     let observer = FnObserver::new(
//!         |text: &str| println!("{}", text),
//!         |message: &AssistantMessage| println!("{} sources", message.citations().len()),
//!     );
//!     let outcome = chat.send("When are office hours?", observer).await?;
//!     println!("{:?}", outcome.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **ragchat-types**: message, citation and event types
//! - **ragchat-stream**: the ingestion pipeline (`StreamSession` and friends)
//! - **ragchat-client**: HTTP client, request model and `ChatController`
//!
//! The pipeline has no I/O of its own, so it can be fed from any transport:
//!
//! ```rust
//! use ragchat::prelude::*;
//!
//! let mut session = StreamSession::new(NoopObserver);
//! session.start();
//! session.feed("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n");
//! session.feed("data: {\"done\":true}\n");
//! assert_eq!(session.outcome().message.unwrap().content, "Hi");
//! ```

pub use ragchat_client as client;
pub use ragchat_stream as stream;
pub use ragchat_types as types;

pub use ragchat_client::{ChatController, ClientError, GenerateOptions, RagClient, RagClientConfig};
pub use ragchat_stream::{drive, StreamOutcome, StreamSession};
pub use ragchat_types::{AssistantMessage, ChatMessage, Citation, StreamEvent};

/// High-level builder for a ready-to-use chat
pub mod builder;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::ChatBuilder;
    pub use crate::client::{ChatController, ClientError, FailureKind, GenerateOptions};
    pub use crate::stream::{
        ChannelObserver, FnObserver, NoopObserver, SessionState, StreamObserver, StreamOutcome,
        StreamSession,
    };
    pub use crate::types::{AssistantMessage, ChatMessage, Citation, StreamEvent};
    pub use anyhow::Result;
}
