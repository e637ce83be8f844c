//! Configuration from environment variables and command-line overrides.
//!
//! **Environment variables:**
//! - `PORT`: server port (default: 8787)
//! - `OLLAMA_URL`: base URL of the Ollama server (default: http://localhost:11434)
//! - `DEFAULT_MODEL`: model used when a request omits one (default: codestral:latest)
//! - `REQUEST_TIMEOUT_SECS`: upstream request timeout (default: 300)
//!
//! Command-line flags take precedence over the environment (see [`crate::cli`]).

use std::env;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "codestral:latest";

// Local models can take a long time to load before the first token.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub ollama_url: String,
    pub default_model: String,
    /// Enabled provider names. `None` enables every registered provider.
    pub providers: Option<Vec<String>>,
    pub request_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            ollama_url: env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            default_model: env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            providers: None,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ProxyConfig {
    /// Configuration pointing at `ollama_url`, with every other field at its
    /// built-in default. Ignores the environment.
    pub fn for_backend(ollama_url: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            ollama_url: ollama_url.into(),
            default_model: DEFAULT_MODEL.to_string(),
            providers: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn ollama_url_trimmed(&self) -> String {
        self.ollama_url.trim_end_matches('/').to_string()
    }

    /// Full URL of Ollama's `/api/generate` endpoint.
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.ollama_url_trimmed())
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
