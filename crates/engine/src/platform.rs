//! Real implementations of the engine's capability traits.
//!
//! - [`SystemClock`]: wall clock via `std::time::SystemTime`
//! - [`ReqwestTransport`]: real HTTP via reqwest
//! - [`OfflineTransport`]: always fails, so every rate lookup degrades to fallback data

use crate::traits::*;
use std::sync::Once;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ===========================================================================
// Clock
// ===========================================================================

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// ===========================================================================
// Transport – wraps reqwest
// ===========================================================================

static INSTALL_CRYPTO_PROVIDER: Once = Once::new();

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> FetchResult<Self> {
        // reqwest is built with `rustls-no-provider`; a provider must be installed
        // before the first client is built. A second install attempt is harmless.
        INSTALL_CRYPTO_PROVIDER.call_once(|| {
            let _ = rustls::crypto::ring::default_provider().install_default();
        });

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl RateTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> FetchResult<(u16, String)> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(timeout)
                } else {
                    FetchError::Network(format!("GET {}: {}", url, e))
                }
            })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("reading body: {}", e)))?;
        Ok((status, body))
    }
}

// ===========================================================================
// Offline transport – never touches the network
// ===========================================================================

pub struct OfflineTransport;

#[async_trait::async_trait]
impl RateTransport for OfflineTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> FetchResult<(u16, String)> {
        Err(FetchError::Offline(format!("network disabled, skipped {}", url)))
    }
}
