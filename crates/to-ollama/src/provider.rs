//! Shared services handed to every provider's handlers.

use crate::config::ProxyConfig;
use std::sync::Arc;

/// Source of response ids.
///
/// Ids must be unique across processes, not just within one run, and the
/// generator is shared by every in-flight request.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 rendered as 32 lowercase hex characters without separators.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Wall clock used for `created` timestamps.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Everything a provider needs besides the incoming request.
#[derive(Clone)]
pub struct ProviderContext {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
}

impl ProviderContext {
    pub fn new(config: ProxyConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    pub fn generate_id(&self) -> String {
        self.ids.generate()
    }

    pub fn now_secs(&self) -> i64 {
        self.clock.now_secs()
    }
}
