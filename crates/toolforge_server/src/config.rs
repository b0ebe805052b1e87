//! Server configuration.

use crate::error::ServerError;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default request body limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for hosting one tool
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Static API key; `None` disables authentication
    pub api_key: Option<SecretString>,
    /// Maximum accepted request body
    pub max_body_bytes: usize,
    /// Handler timeout
    pub timeout: Option<Duration>,
    /// Config merged under every request's config
    pub base_config: Map<String, Value>,
    /// Allow cross-origin requests from any origin
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            api_key: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            timeout: None,
            base_config: Map::new(),
            permissive_cors: false,
        }
    }
}

impl ServerConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen address
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Require this API key on `/execute` and `/schema`
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the request body limit
    #[must_use]
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Set the handler timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the base tool config
    #[must_use]
    pub fn with_base_config(mut self, config: Map<String, Value>) -> Self {
        self.base_config = config;
        self
    }

    /// Allow cross-origin requests
    #[must_use]
    pub fn with_permissive_cors(mut self, enabled: bool) -> Self {
        self.permissive_cors = enabled;
        self
    }
}

/// Parse a base tool config from JSON text; it must be an object
///
/// # Errors
///
/// Returns [`ServerError::Config`] for malformed JSON or a non-object value
pub fn parse_base_config(text: &str) -> Result<Map<String, Value>, ServerError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ServerError::Config(
            "base config must be a JSON object".to_string(),
        )),
        Err(e) => Err(ServerError::Config(format!(
            "base config is not valid JSON (line {}, column {})",
            e.line(),
            e.column()
        ))),
    }
}

/// Read a base tool config from a JSON file
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the file cannot be read, or
/// [`ServerError::Config`] if it is not a JSON object
pub fn load_base_config(path: &Path) -> Result<Map<String, Value>, ServerError> {
    let text = std::fs::read_to_string(path).map_err(|source| ServerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_base_config(&text)
}
