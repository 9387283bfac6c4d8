use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use ragchat_stream::BoxError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::RagClientConfig;
use crate::error::ClientError;
use crate::request::GenerateRequest;
use crate::traits::{FragmentStream, GenerationClient};

/// HTTP client for a RAG generation server
#[derive(Debug, Clone)]
pub struct RagClient {
    http_client: reqwest::Client,
    config: RagClientConfig,
}

impl RagClient {
    pub fn new(config: RagClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        let http_client = builder.build().map_err(|e| {
            ClientError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &RagClientConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationClient for RagClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<FragmentStream, ClientError> {
        let url = self.config.generate_url();
        tracing::debug!(
            "POST {} ({} messages, knowledge base: {})",
            url,
            request.messages.len(),
            request.use_knowledge_base
        );

        let response = self.http_client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Generate request rejected with {}: {}", status, body);
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let fragments = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Box::new(e) as BoxError));
        Ok(Box::pin(fragments))
    }
}
