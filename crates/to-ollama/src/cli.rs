//! Command-line interface.

use crate::{config::ProxyConfig, providers};
use clap::Parser;

const AFTER_HELP: &str = "\
ENVIRONMENT VARIABLES:
  PORT                   Same as --port
  OLLAMA_URL             Same as --ollama-url
  DEFAULT_MODEL          Same as --model
  REQUEST_TIMEOUT_SECS   Idle timeout for Ollama reads (default: 300)
  RUST_LOG               Log filter (default: info)

EXAMPLES:
  to-ollama --port 8080 --model qwen2.5-coder:7b
  to-ollama --providers codestral
  to-ollama -d";

#[derive(Debug, Default, Parser)]
#[command(
    name = "to-ollama",
    version,
    about = "Proxy various LLM API formats to Ollama",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Port to listen on [default: 8787]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Ollama server URL [default: http://localhost:11434]
    #[arg(short, long)]
    pub ollama_url: Option<String>,

    /// Default model to use [default: codestral:latest]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Comma-separated providers to enable [default: all]
    #[arg(long, value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Run in background
    #[arg(short, long)]
    pub daemon: bool,
}

impl Cli {
    /// Requested provider names, trimmed, with blanks removed.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        providers::validate_providers(self.provider_names().as_slice())
    }

    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = &self.ollama_url {
            config.ollama_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.default_model = model.clone();
        }
        let names = self.provider_names();
        if !names.is_empty() {
            config.providers = Some(names);
        }
        config
    }
}

/// Arguments for the background child: the original ones minus the daemon flag.
pub fn without_daemon_flag<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .filter(|a| a != "-d" && a != "--daemon")
        .collect()
}
