//! Engine settings, deserialized from the `engine` section of the CLI config.

use crate::rates::{RateSettings, DEFAULT_CRYPTO_URL, DEFAULT_CURRENCY_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub currency_endpoint: String,
    /// Base URL; coin ids and the quote currency are appended per request.
    pub crypto_endpoint: String,
    pub currency_cache_secs: u64,
    pub crypto_cache_secs: u64,
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
    /// Reject catalog codes missing from the rate table instead of treating
    /// their rate as 1.
    pub strict_rate_codes: bool,
    /// Categories to expose, in order. Empty exposes the whole catalog.
    pub categories: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_endpoint: DEFAULT_CURRENCY_URL.to_string(),
            crypto_endpoint: DEFAULT_CRYPTO_URL.to_string(),
            currency_cache_secs: 300,
            crypto_cache_secs: 300,
            fetch_timeout_ms: 8_000,
            user_agent: concat!("unitconv/", env!("CARGO_PKG_VERSION")).to_string(),
            strict_rate_codes: true,
            categories: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn rate_settings(&self) -> RateSettings {
        RateSettings {
            currency_url: self.currency_endpoint.clone(),
            crypto_url: self.crypto_endpoint.clone(),
            currency_ttl: Duration::from_secs(self.currency_cache_secs),
            crypto_ttl: Duration::from_secs(self.crypto_cache_secs),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }
}
