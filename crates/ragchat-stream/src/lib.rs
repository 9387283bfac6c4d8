//! Streaming-response ingestion for RAG chat backends
//!
//! Consumes a newline-delimited `data: <json>` response in arbitrary fragments
//! and assembles the answer text, its citations and the end-of-stream signal.
//! [`StreamSession`] is the entry point; [`drive`] runs it over any fragment
//! stream with cooperative cancellation.

pub mod accumulator;
pub mod citations;
pub mod completion;
pub mod driver;
pub mod error;
pub mod flight;
pub mod frame_buffer;
pub mod observer;
pub mod payload;
pub mod session;

pub use accumulator::{ContentShape, MessageAccumulator, TextChange};
pub use citations::{CitationAggregator, CitationShape};
pub use completion::{CompletionDetector, TerminalSignal};
pub use driver::drive;
pub use error::{BoxError, Result, StreamError};
pub use flight::{SessionHandle, SingleFlight};
pub use frame_buffer::FrameBuffer;
pub use observer::{ChannelObserver, FnObserver, NoopObserver, StreamObserver};
pub use payload::{ParsedLine, Payload, PayloadParser, SkipReason, DEFAULT_EVENT_MARKER};
pub use session::{StreamOutcome, StreamSession, Termination};

pub use ragchat_types::{AssistantMessage, Citation, SessionState, StreamEvent};
