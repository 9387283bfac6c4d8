//! High-level builder API for creating a chat

use std::sync::Arc;

use crate::client::{ChatController, ClientError, GenerateOptions, RagClient, RagClientConfig};
use crate::stream::PayloadParser;

/// Builds a `ChatController` backed by `RagClient`
///
/// # Example
///
/// ```rust,no_run
/// use ragchat::prelude::*;
///
/// # fn main() -> Result<()> {
/// let chat = ChatBuilder::new()
///     .server_url("http://rag-server:8081")
///     .knowledge_base(true)
///     .collection("cs101")
///     .system_prompt("You are a teaching assistant.")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ChatBuilder {
    config: RagClientConfig,
    options: GenerateOptions,
    parser: PayloadParser,
}

impl Default for ChatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatBuilder {
    pub fn new() -> Self {
        Self {
            config: RagClientConfig::default(),
            options: GenerateOptions::default(),
            parser: PayloadParser::default(),
        }
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn generate_path(mut self, path: impl Into<String>) -> Self {
        self.config.generate_path = path.into();
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = Some(secs);
        self
    }

    pub fn knowledge_base(mut self, enabled: bool) -> Self {
        self.options.use_knowledge_base = enabled;
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.options.collection_name = name.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.options.system_prompt = Some(prompt.into());
        self
    }

    /// Replace all generation settings at once
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Also accept `data: [DONE]` as end of stream
    pub fn done_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.parser = self.parser.with_done_sentinel(sentinel);
        self
    }

    pub fn build(self) -> Result<ChatController, ClientError> {
        let client = RagClient::new(self.config)?;
        Ok(ChatController::new(Arc::new(client), self.options).with_parser(self.parser))
    }
}
