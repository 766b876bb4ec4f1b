use std::time::Duration;

/// Result type for capability operations (clock, transport).
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a rate fetch did not produce a usable table.
///
/// Never escapes the rate cache: every variant is masked by fallback data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("offline: {0}")]
    Offline(String),
}

// ---------------------------------------------------------------------------
// Time source
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

// ---------------------------------------------------------------------------
// Rate transport
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
pub trait RateTransport: Send + Sync {
    /// Perform an HTTP GET and return (status_code, body).
    async fn get(&self, url: &str, timeout: Duration) -> FetchResult<(u16, String)>;
}
