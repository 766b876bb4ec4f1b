//! Rate cache – currency and crypto tables with a freshness window.
//!
//! Each table lives in its own slot. Reads inside the window never touch the
//! network. A stale read triggers one fetch; concurrent stale readers queue on
//! the slot's refresh lock and reuse whatever that fetch produced. A failed
//! fetch never mutates the slot, so the next call retries.

use crate::traits::{Clock, FetchError, FetchResult, RateTransport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Currency,
    Crypto,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKind::Currency => "currency",
            RateKind::Crypto => "crypto",
        }
    }
}

impl std::fmt::Display for RateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "currency" => Ok(RateKind::Currency),
            "crypto" => Ok(RateKind::Crypto),
            other => Err(format!("unknown rate table: {} (expected currency or crypto)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Result of a successful fetch.
    Live,
    /// Hardcoded snapshot, served when a fetch fails.
    Fallback,
}

/// Units per one US dollar, keyed by currency code or coin ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub kind: RateKind,
    pub values: HashMap<String, f64>,
    /// 0 for the hardcoded snapshot.
    pub fetched_at_ms: u64,
    pub source: RateSource,
}

impl RateTable {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }

    pub fn fallback(kind: RateKind) -> Self {
        let rows = match kind {
            RateKind::Currency => FALLBACK_CURRENCY_RATES,
            RateKind::Crypto => FALLBACK_CRYPTO_RATES,
        };
        Self {
            kind,
            values: rows.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
            fetched_at_ms: 0,
            source: RateSource::Fallback,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RateSettings {
    pub currency_url: String,
    /// Base URL; the coin id list and quote currency are appended.
    pub crypto_url: String,
    pub currency_ttl: Duration,
    pub crypto_ttl: Duration,
    pub fetch_timeout: Duration,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            currency_url: DEFAULT_CURRENCY_URL.to_string(),
            crypto_url: DEFAULT_CRYPTO_URL.to_string(),
            currency_ttl: Duration::from_secs(5 * 60),
            crypto_ttl: Duration::from_secs(5 * 60),
            fetch_timeout: Duration::from_secs(8),
        }
    }
}

pub const DEFAULT_CURRENCY_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
pub const DEFAULT_CRYPTO_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Full crypto quote URL for every coin in [`COIN_TICKERS`].
pub fn crypto_quote_url(base: &str) -> String {
    let ids: Vec<&str> = COIN_TICKERS.iter().map(|&(id, _)| id).collect();
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}ids={}&vs_currencies=usd", base, sep, ids.join(","))
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct Slot {
    kind: RateKind,
    url: String,
    ttl_ms: u64,
    table: RwLock<Option<Arc<RateTable>>>,
    refresh: Mutex<()>,
    attempts: AtomicU64,
    fallback: Arc<RateTable>,
}

impl Slot {
    fn new(kind: RateKind, url: String, ttl: Duration) -> Self {
        Self {
            kind,
            url,
            ttl_ms: ttl.as_millis() as u64,
            table: RwLock::new(None),
            refresh: Mutex::new(()),
            attempts: AtomicU64::new(0),
            fallback: Arc::new(RateTable::fallback(kind)),
        }
    }

    fn current(&self) -> Option<Arc<RateTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fresh(&self, now_ms: u64) -> Option<Arc<RateTable>> {
        self.current()
            .filter(|t| now_ms.saturating_sub(t.fetched_at_ms) < self.ttl_ms)
    }

    fn replace(&self, table: Arc<RateTable>) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(table);
    }
}

pub struct RateCache {
    transport: Box<dyn RateTransport>,
    clock: Box<dyn Clock>,
    fetch_timeout: Duration,
    currency: Slot,
    crypto: Slot,
}

impl RateCache {
    pub fn new(
        transport: Box<dyn RateTransport>,
        clock: Box<dyn Clock>,
        settings: RateSettings,
    ) -> Self {
        Self {
            transport,
            clock,
            fetch_timeout: settings.fetch_timeout,
            currency: Slot::new(
                RateKind::Currency,
                settings.currency_url,
                settings.currency_ttl,
            ),
            crypto: Slot::new(
                RateKind::Crypto,
                crypto_quote_url(&settings.crypto_url),
                settings.crypto_ttl,
            ),
        }
    }

    pub async fn currency_rates(&self) -> Arc<RateTable> {
        self.get(RateKind::Currency).await
    }

    pub async fn crypto_rates(&self) -> Arc<RateTable> {
        self.get(RateKind::Crypto).await
    }

    /// Cached table for `kind`, if any fetch has succeeded. Never fetches.
    pub fn snapshot(&self, kind: RateKind) -> Option<Arc<RateTable>> {
        self.slot(kind).current()
    }

    /// A usable table for `kind`: cached, refreshed, or the fallback snapshot.
    pub async fn get(&self, kind: RateKind) -> Arc<RateTable> {
        let slot = self.slot(kind);

        if let Some(table) = slot.fresh(self.clock.now_ms()) {
            tracing::debug!(kind = %kind, "rate cache hit");
            return table;
        }

        let seen = slot.attempts.load(Ordering::Acquire);
        let before = slot.current();
        let _refresh = slot.refresh.lock().await;

        // Someone else refreshed while we waited for the lock.
        if let Some(table) = slot.fresh(self.clock.now_ms()) {
            return table;
        }
        if slot.attempts.load(Ordering::Acquire) != seen {
            // The fetch we waited on is our answer; never retry within one wave.
            return match (slot.current(), before) {
                (Some(now), Some(prev)) if Arc::ptr_eq(&now, &prev) => slot.fallback.clone(),
                (Some(now), _) => now,
                (None, _) => slot.fallback.clone(),
            };
        }

        let outcome = self.fetch(slot).await;
        slot.attempts.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(values) => {
                let table = Arc::new(RateTable {
                    kind,
                    values,
                    fetched_at_ms: self.clock.now_ms(),
                    source: RateSource::Live,
                });
                tracing::info!(kind = %kind, entries = table.values.len(), "rate table refreshed");
                slot.replace(table.clone());
                table
            }
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "rate fetch failed, serving fallback");
                slot.fallback.clone()
            }
        }
    }

    fn slot(&self, kind: RateKind) -> &Slot {
        match kind {
            RateKind::Currency => &self.currency,
            RateKind::Crypto => &self.crypto,
        }
    }

    async fn fetch(&self, slot: &Slot) -> FetchResult<HashMap<String, f64>> {
        let (status, body) = tokio::time::timeout(
            self.fetch_timeout,
            self.transport.get(&slot.url, self.fetch_timeout),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;

        if !(200..300).contains(&status) {
            return Err(FetchError::Status(status));
        }

        match slot.kind {
            RateKind::Currency => parse_currency_payload(&body),
            RateKind::Crypto => parse_crypto_payload(&body),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CurrencyPayload {
    rates: HashMap<String, serde_json::Value>,
}

/// `{ "rates": { "EUR": 0.92, ... } }`
pub(crate) fn parse_currency_payload(body: &str) -> FetchResult<HashMap<String, f64>> {
    let payload: CurrencyPayload =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut rates: HashMap<String, f64> = payload
        .rates
        .into_iter()
        .filter_map(|(code, v)| usable_rate(&v).map(|r| (code, r)))
        .collect();
    if rates.is_empty() {
        return Err(FetchError::Malformed("no usable currency rates".into()));
    }
    rates.entry(BASE_CURRENCY.to_string()).or_insert(1.0);
    Ok(rates)
}

/// `{ "bitcoin": { "usd": 64000.0 }, ... }`, re-keyed by ticker.
pub(crate) fn parse_crypto_payload(body: &str) -> FetchResult<HashMap<String, f64>> {
    let payload: HashMap<String, serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let rates: HashMap<String, f64> = payload
        .iter()
        .filter_map(|(id, quote)| {
            let ticker = ticker_for_coin(id)?;
            let usd = quote.get("usd").and_then(usable_rate)?;
            Some((ticker.to_string(), usd))
        })
        .collect();
    if rates.is_empty() {
        return Err(FetchError::Malformed("no known coins in payload".into()));
    }
    Ok(rates)
}

fn usable_rate(v: &serde_json::Value) -> Option<f64> {
    v.as_f64().filter(|r| r.is_finite() && *r > 0.0)
}

pub fn ticker_for_coin(coin_id: &str) -> Option<&'static str> {
    COIN_TICKERS
        .iter()
        .find(|&&(id, _)| id == coin_id)
        .map(|&(_, ticker)| ticker)
}

// ---------------------------------------------------------------------------
// Static data
// ---------------------------------------------------------------------------

const BASE_CURRENCY: &str = "USD";

/// Remote coin id → catalog ticker.
pub const COIN_TICKERS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("binancecoin", "BNB"),
    ("cardano", "ADA"),
    ("solana", "SOL"),
    ("ripple", "XRP"),
    ("polkadot", "DOT"),
    ("dogecoin", "DOGE"),
    ("avalanche-2", "AVAX"),
    ("shiba-inu", "SHIB"),
    ("matic-network", "MATIC"),
    ("litecoin", "LTC"),
    ("uniswap", "UNI"),
    ("chainlink", "LINK"),
    ("cosmos", "ATOM"),
    ("fantom", "FTM"),
    ("near", "NEAR"),
    ("algorand", "ALGO"),
    ("vechain", "VET"),
    ("internet-computer", "ICP"),
    ("filecoin", "FIL"),
    ("tron", "TRX"),
    ("ethereum-classic", "ETC"),
    ("stellar", "XLM"),
    ("decentraland", "MANA"),
    ("the-sandbox", "SAND"),
    ("axie-infinity", "AXS"),
    ("chiliz", "CHZ"),
    ("enjincoin", "ENJ"),
    ("gala", "GALA"),
];

const FALLBACK_CURRENCY_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.85),
    ("GBP", 0.73),
    ("JPY", 110.0),
    ("CNY", 6.45),
    ("INR", 75.0),
    ("AUD", 1.35),
    ("CAD", 1.25),
    ("CHF", 0.92),
    ("SEK", 8.5),
    ("NOK", 8.7),
    ("DKK", 6.3),
    ("PLN", 3.9),
    ("CZK", 21.5),
    ("HUF", 300.0),
    ("RUB", 75.0),
    ("BRL", 5.2),
    ("MXN", 20.0),
    ("ZAR", 15.0),
    ("KRW", 1180.0),
    ("SGD", 1.35),
    ("HKD", 7.8),
    ("NZD", 1.4),
    ("TRY", 8.5),
];

// USD price per coin. Conversions apply the same formula as currencies.
const FALLBACK_CRYPTO_RATES: &[(&str, f64)] = &[
    ("BTC", 45000.0),
    ("ETH", 3000.0),
    ("BNB", 300.0),
    ("ADA", 0.5),
    ("SOL", 100.0),
    ("XRP", 0.8),
    ("DOT", 20.0),
    ("DOGE", 0.08),
    ("AVAX", 25.0),
    ("SHIB", 0.00001),
    ("MATIC", 1.5),
    ("LTC", 150.0),
    ("UNI", 20.0),
    ("LINK", 15.0),
    ("ATOM", 10.0),
    ("FTM", 2.0),
    ("NEAR", 5.0),
    ("ALGO", 0.3),
    ("VET", 0.05),
    ("ICP", 10.0),
    ("FIL", 5.0),
    ("TRX", 0.1),
    ("ETC", 30.0),
    ("XLM", 0.2),
    ("MANA", 0.5),
    ("SAND", 0.8),
    ("AXS", 15.0),
    ("CHZ", 0.2),
    ("ENJ", 0.3),
    ("GALA", 0.1),
];

// ===========================================================================
// Tests
// ===========================================================================


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[tokio::test]
    async fn fresh_table_is_served_without_refetch() {
        let transport = FakeTransport::replying(200, CURRENCY_BODY);
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        let first = rates.currency_rates().await;
        clock.advance(Duration::from_secs(4 * 60 + 59));
        let second = rates.currency_rates().await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(first.source, RateSource::Live);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.rate("EUR"), Some(0.5));
    }

    #[tokio::test]
    async fn expired_table_is_refetched() {
        let transport = FakeTransport::replying(200, CURRENCY_BODY);
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        rates.currency_rates().await;
        clock.advance(Duration::from_secs(5 * 60));
        let table = rates.currency_rates().await;

        assert_eq!(transport.call_count(), 2);
        assert_eq!(table.fetched_at_ms, NOW + 5 * 60 * 1000);
    }

    #[tokio::test]
    async fn failure_serves_fallback_and_retries_next_call() {
        let transport = FakeTransport::failing(FetchError::Network("down".into()));
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        let table = rates.currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);
        assert_eq!(table.rate("USD"), Some(1.0));
        assert!(rates.snapshot(RateKind::Currency).is_none());

        rates.currency_rates().await;
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn failure_after_success_keeps_last_table_for_retry() {
        let transport = FakeTransport::replying(200, CURRENCY_BODY);
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);
        rates.currency_rates().await;

        transport.set_reply(Err(FetchError::Network("down".into())));
        clock.advance(Duration::from_secs(600));
        let table = rates.currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);
        assert_eq!(table.rate("EUR"), Some(0.85));

        // The failed refresh left the cached table and its timestamp alone.
        let cached = rates.snapshot(RateKind::Currency).unwrap();
        assert_eq!(cached.fetched_at_ms, NOW);
        assert_eq!(cached.rate("JPY"), Some(150.0));

        transport.set_reply(Ok((200, CURRENCY_BODY.to_string())));
        let table = rates.currency_rates().await;
        assert_eq!(table.source, RateSource::Live);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn non_success_status_and_bad_json_fall_back() {
        let clock = FakeClock::at(NOW);

        let t = FakeTransport::replying(503, CURRENCY_BODY);
        let table = cache(&t, &clock).currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);

        let t = FakeTransport::replying(200, "<html>oops</html>");
        let table = cache(&t, &clock).currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);

        let t = FakeTransport::replying(200, r#"{"rates":{}}"#);
        let table = cache(&t, &clock).currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn crypto_ids_are_mapped_to_tickers() {
        let transport = FakeTransport::replying(200, CRYPTO_BODY);
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        let table = rates.crypto_rates().await;
        assert_eq!(table.source, RateSource::Live);
        assert_eq!(table.rate("BTC"), Some(50000.0));
        assert_eq!(table.rate("ETH"), Some(2500.0));
        assert_eq!(table.values.len(), 2);

        let url = transport.urls.lock().unwrap()[0].clone();
        assert!(url.starts_with(DEFAULT_CRYPTO_URL));
        assert!(url.contains("avalanche-2"));
        assert!(url.ends_with("&vs_currencies=usd"));
    }

    #[tokio::test]
    async fn tables_are_cached_independently() {
        let transport = FakeTransport::replying(200, CURRENCY_BODY);
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        rates.currency_rates().await;
        // The currency body has no coin ids, so crypto falls back.
        let crypto = rates.crypto_rates().await;
        assert_eq!(crypto.source, RateSource::Fallback);
        assert_eq!(crypto.rate("BTC"), Some(45000.0));
        assert_eq!(transport.call_count(), 2);
        assert!(rates.snapshot(RateKind::Currency).is_some());
        assert!(rates.snapshot(RateKind::Crypto).is_none());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let transport =
            FakeTransport::replying(200, CURRENCY_BODY).with_delay(Duration::from_millis(30));
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        let (a, b, c) = tokio::join!(
            rates.currency_rates(),
            rates.currency_rates(),
            rates.currency_rates()
        );

        assert_eq!(transport.call_count(), 1);
        assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_failure() {
        let transport = FakeTransport::failing(FetchError::Status(500))
            .with_delay(Duration::from_millis(30));
        let clock = FakeClock::at(NOW);
        let rates = cache(&transport, &clock);

        let (a, b) = tokio::join!(rates.currency_rates(), rates.currency_rates());
        assert_eq!(transport.call_count(), 1);
        assert_eq!(a.source, RateSource::Fallback);
        assert_eq!(b.source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn slow_fetch_times_out_to_fallback() {
        let transport =
            FakeTransport::replying(200, CURRENCY_BODY).with_delay(Duration::from_millis(500));
        let clock = FakeClock::at(NOW);
        let rates = RateCache::new(
            Box::new(transport.clone()),
            Box::new(clock.clone()),
            RateSettings {
                fetch_timeout: Duration::from_millis(20),
                ..RateSettings::default()
            },
        );

        let table = rates.currency_rates().await;
        assert_eq!(table.source, RateSource::Fallback);
    }

    #[test]
    fn currency_payload_gets_base_and_drops_garbage() {
        let rates =
            parse_currency_payload(r#"{"rates":{"EUR":0.9,"BAD":"x","NEG":-1,"ZERO":0}}"#)
                .unwrap();
        assert_eq!(rates.get("USD"), Some(&1.0));
        assert_eq!(rates.get("EUR"), Some(&0.9));
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn crypto_payload_without_known_coins_is_malformed() {
        let err = parse_crypto_payload(r#"{"mystery":{"usd":1}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn every_fallback_code_is_in_the_catalog() {
        let catalog = crate::catalog::Catalog::builtin();
        for kind in [RateKind::Currency, RateKind::Crypto] {
            for code in RateTable::fallback(kind).values.keys() {
                assert!(
                    catalog.unit(kind.as_str(), code).is_some(),
                    "{} missing from {}",
                    code,
                    kind
                );
            }
        }
        for &(_, ticker) in COIN_TICKERS {
            assert!(catalog.unit("crypto", ticker).is_some());
        }
    }

    #[test]
    fn rate_kind_parses_case_insensitively() {
        assert_eq!("Crypto".parse::<RateKind>(), Ok(RateKind::Crypto));
        assert!("gold".parse::<RateKind>().is_err());
    }
}
