use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8081";
pub const DEFAULT_GENERATE_PATH: &str = "/v1/generate";

/// Where and how to reach the generation server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagClientConfig {
    pub server_url: String,
    #[serde(default = "default_generate_path")]
    pub generate_path: String,
    /// Applies to establishing the connection only; a streamed answer may run longer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

fn default_generate_path() -> String {
    DEFAULT_GENERATE_PATH.to_string()
}

impl Default for RagClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl RagClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            generate_path: default_generate_path(),
            connect_timeout_secs: None,
        }
    }

    pub fn with_generate_path(mut self, path: impl Into<String>) -> Self {
        self.generate_path = path.into();
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    /// Full URL of the generate endpoint
    pub fn generate_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = self.generate_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(ClientError::Configuration(
                "server_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "server_url must start with http:// or https://, got '{}'",
                url
            )));
        }
        Ok(())
    }
}
