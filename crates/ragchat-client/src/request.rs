use ragchat_types::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub messages: Vec<ChatMessage>,
    pub use_knowledge_base: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub reranker_top_k: u32,
    pub vdb_top_k: u32,
    pub vdb_endpoint: String,
    pub collection_name: String,
    pub enable_query_rewriting: bool,
    pub enable_reranker: bool,
    pub enable_citations: bool,
    pub enable_guardrails: bool,
    /// Empty lets the server pick its configured model
    pub model: String,
    pub stop: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl GenerateRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self::with_options(messages, &GenerateOptions::default())
    }

    /// Build a request from the conversation so far
    ///
    /// The configured system prompt, if any, is sent as the first message.
    pub fn with_options(messages: Vec<ChatMessage>, options: &GenerateOptions) -> Self {
        let mut all = Vec::with_capacity(messages.len() + 1);
        if let Some(prompt) = options.system_prompt.as_deref().filter(|p| !p.is_empty()) {
            all.push(ChatMessage::system(prompt));
        }
        all.extend(messages);

        Self {
            messages: all,
            use_knowledge_base: options.use_knowledge_base,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            reranker_top_k: options.reranker_top_k,
            vdb_top_k: options.vdb_top_k,
            vdb_endpoint: options.vdb_endpoint.clone(),
            collection_name: options.collection_name.clone(),
            enable_query_rewriting: options.enable_query_rewriting,
            enable_reranker: options.enable_reranker,
            enable_citations: options.enable_citations,
            enable_guardrails: options.enable_guardrails,
            model: options.model.clone(),
            stop: options.stop.clone(),
            persona: options.persona.clone(),
        }
    }
}

/// Generation settings applied to every request of a conversation
///
/// Deserializes with defaults for any missing field, so a partial
/// `[generation]` config table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub use_knowledge_base: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub reranker_top_k: u32,
    pub vdb_top_k: u32,
    pub vdb_endpoint: String,
    pub collection_name: String,
    pub enable_query_rewriting: bool,
    pub enable_reranker: bool,
    pub enable_citations: bool,
    pub enable_guardrails: bool,
    pub model: String,
    pub stop: Vec<String>,
    pub persona: Option<String>,
    pub system_prompt: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            use_knowledge_base: true,
            temperature: 0.7,
            top_p: 0.8,
            max_tokens: 1024,
            reranker_top_k: 2,
            vdb_top_k: 10,
            vdb_endpoint: "http://milvus:19530".to_string(),
            collection_name: "default".to_string(),
            enable_query_rewriting: true,
            enable_reranker: true,
            enable_citations: true,
            enable_guardrails: false,
            model: String::new(),
            stop: Vec::new(),
            persona: None,
            system_prompt: None,
        }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_knowledge_base(mut self, enabled: bool) -> Self {
        self.use_knowledge_base = enabled;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn reranker_top_k(mut self, k: u32) -> Self {
        self.reranker_top_k = k;
        self
    }

    pub fn vdb_top_k(mut self, k: u32) -> Self {
        self.vdb_top_k = k;
        self
    }

    pub fn vdb_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.vdb_endpoint = endpoint.into();
        self
    }

    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn query_rewriting(mut self, enabled: bool) -> Self {
        self.enable_query_rewriting = enabled;
        self
    }

    pub fn reranker(mut self, enabled: bool) -> Self {
        self.enable_reranker = enabled;
        self
    }

    pub fn citations(mut self, enabled: bool) -> Self {
        self.enable_citations = enabled;
        self
    }

    pub fn guardrails(mut self, enabled: bool) -> Self {
        self.enable_guardrails = enabled;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}
