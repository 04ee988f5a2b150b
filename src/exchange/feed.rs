//! Fetch boundary between venue adapters and their HTTP feeds.
//!
//! A [`MarketFeed`] is the only part of the system that knows a venue's
//! endpoints and payload shapes. Feeds return plain records; fields that
//! fail to parse arrive as `None` and become skip counts in the adapter,
//! so transport quirks never reach the matching engine.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::domain::{FeeSchedule, MarketKind};
use crate::error::{Error, Result};

/// One instrument from a venue's catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub venue_symbol: String,
    pub base: String,
    pub quote: String,
}

impl CatalogEntry {
    pub fn new(
        venue_symbol: impl Into<String>,
        base: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            venue_symbol: venue_symbol.into(),
            base: base.into(),
            quote: quote.into(),
        }
    }
}

/// One instrument from a venue's bulk ticker feed.
#[derive(Debug, Clone, Default)]
pub struct TickerRecord {
    pub venue_symbol: String,
    pub ask: Option<Decimal>,
    pub bid: Option<Decimal>,
    /// Funding rate as a signed fraction; futures tickers only.
    pub funding_rate: Option<Decimal>,
    /// Raw epoch ms, before the reference timezone shift.
    pub next_settlement_ms: Option<i64>,
}

/// Why one instrument entry was dropped during load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Ticker symbol absent from the venue's catalog.
    UnknownInstrument,
    /// Best ask or bid missing or non-positive.
    MissingQuote,
}

/// Counters published with each snapshot so partial loads are observable.
#[derive(Debug, Default, Clone)]
pub struct LoadStats {
    pub futures_instruments: usize,
    pub spot_instruments: usize,
    pub futures_quotes: usize,
    pub spot_quotes: usize,
    pub funding_rates: usize,
    pub unknown_instrument: usize,
    pub missing_quote: usize,
    /// Venue-symbol collisions resolved last-write-wins.
    pub collisions: usize,
    /// A venue-wide fetch failed and the snapshot was left empty.
    pub degraded: bool,
}

impl LoadStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnknownInstrument => self.unknown_instrument += 1,
            SkipReason::MissingQuote => self.missing_quote += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.unknown_instrument + self.missing_quote
    }
}

/// One venue's raw feed: catalogs, bulk tickers, and optional per-symbol
/// settlement lookups.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Venue name used in reports and deny rules.
    fn name(&self) -> &'static str;

    /// The venue's fractional fee schedule.
    fn fees(&self) -> FeeSchedule;

    /// Instrument catalog for one market.
    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>>;

    /// Bulk ticker feed for one market. Futures records may carry funding
    /// rate and settlement; spot records carry prices only.
    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>>;

    /// Per-symbol settlement lookup, for venues whose bulk ticker omits the
    /// time. Raw epoch ms, before the reference shift.
    async fn settlement_time(&self, venue_symbol: &str) -> Result<i64> {
        Err(Error::Payload(format!(
            "{} has no per-symbol settlement endpoint ({venue_symbol})",
            self.name()
        )))
    }

    /// Shared fallback settlement for symbols the venue never reports,
    /// already in the shifted convention. `None` leaves them absent.
    fn fallback_settlement(&self, _now_epoch_ms: i64) -> Option<i64> {
        None
    }
}

/// Fetch a URL and decode its JSON body. Single attempt: failed fetches are
/// skipped by the caller, not retried.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T> {
    Ok(http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await?)
}

/// Deserialize a decimal that venues send as either a JSON string or a
/// number, mapping anything unparsable to `None`.
pub(crate) fn de_decimal_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Deserialize an epoch-milliseconds field that venues send as string,
/// integer, or float.
pub(crate) fn de_epoch_ms_opt<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(epoch_ms_from_value))
}

fn decimal_from_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Decimal::from_str(s).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn epoch_ms_from_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}
