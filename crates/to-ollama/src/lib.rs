//! to-ollama - HTTP proxy that lets Codestral API clients use a local Ollama.
//!
//! Editors and plugins that speak Mistral's Codestral FIM API
//! (`/v1/fim/completions`) can point at this proxy instead. Requests are
//! rewritten into Ollama `/api/generate` calls, and responses (including
//! NDJSON streams) are rewritten back into Codestral's shape.
//!
//! Design goals:
//! - Accept Codestral traffic unchanged.
//! - Forward to a local Ollama server.
//! - Translate streaming output to SSE on the fly, one frame per Ollama record.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod provider;
pub mod providers;
pub mod server;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use provider::ProviderContext;
pub use server::{build_app, serve};
