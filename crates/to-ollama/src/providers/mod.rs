//! Provider registry.
//!
//! Each provider is an API dialect the proxy can speak to clients. Providers
//! are a closed set of variants, each contributing its own routes; the server
//! only sees [`Provider::configure`].

pub mod codestral;

use actix_web::web;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Codestral,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[Provider::Codestral];

    pub fn name(self) -> &'static str {
        match self {
            Provider::Codestral => codestral::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Register this provider's routes.
    pub fn configure(self, cfg: &mut web::ServiceConfig) {
        match self {
            Provider::Codestral => codestral::configure(cfg),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn provider_names() -> Vec<&'static str> {
    Provider::ALL.iter().map(|p| p.name()).collect()
}

/// Check that every requested name is a known provider.
pub fn validate_providers<S: AsRef<str>>(names: &[S]) -> Result<(), String> {
    for name in names {
        let name = name.as_ref();
        if Provider::from_name(name).is_none() {
            return Err(format!(
                "Unknown provider: {}. Available: {}",
                name,
                provider_names().join(", ")
            ));
        }
    }
    Ok(())
}

/// Resolve enabled providers. `None` or an empty list enables all of them;
/// unknown names are skipped.
pub fn enabled_providers(names: Option<&[String]>) -> Vec<Provider> {
    match names {
        Some(names) if !names.is_empty() => {
            let mut out = Vec::new();
            for p in names.iter().filter_map(|n| Provider::from_name(n)) {
                if !out.contains(&p) {
                    out.push(p);
                }
            }
            out
        }
        _ => Provider::ALL.to_vec(),
    }
}
