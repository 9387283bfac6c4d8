use config::{Config as ConfigLoader, ConfigError, Environment, File};
use ragchat_client::{GenerateOptions, RagClientConfig, DEFAULT_GENERATE_PATH, DEFAULT_SERVER_URL};
use ragchat_stream::{PayloadParser, DEFAULT_EVENT_MARKER};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerateOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_generate_path")]
    pub generate_path: String,
    /// Deadline for a whole answer; the turn is cancelled when it passes
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            generate_path: default_generate_path(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_event_marker")]
    pub event_marker: String,
    /// Extra end-of-stream line such as `[DONE]`; unset by default
    #[serde(default)]
    pub done_sentinel: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            event_marker: default_event_marker(),
            done_sentinel: None,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_generate_path() -> String {
    DEFAULT_GENERATE_PATH.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_event_marker() -> String {
    DEFAULT_EVENT_MARKER.to_string()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{RAGCHAT_ENV}.toml
    /// 3. `path`, when given
    /// 4. `RAGCHAT_*` environment variables, `__` between nested keys
    ///    (e.g. `RAGCHAT_SERVER__URL`)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var("RAGCHAT_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("RAGCHAT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load config from a specific file only (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn client_config(&self) -> RagClientConfig {
        let mut client = RagClientConfig::new(self.server.url.clone())
            .with_generate_path(self.server.generate_path.clone());
        if let Some(secs) = self.server.connect_timeout_secs {
            client = client.with_connect_timeout(secs);
        }
        client
    }

    pub fn parser(&self) -> PayloadParser {
        let parser = PayloadParser::new().with_event_marker(self.stream.event_marker.clone());
        match &self.stream.done_sentinel {
            Some(sentinel) => parser.with_done_sentinel(sentinel.clone()),
            None => parser,
        }
    }
}
