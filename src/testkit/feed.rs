//! A scripted in-memory feed for adapter tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::domain::{FeeSchedule, MarketKind};
use crate::error::{Error, Result};
use crate::exchange::feed::{CatalogEntry, MarketFeed, TickerRecord};

/// Shared call counters, cloned out of the feed before it is boxed so tests
/// can observe fetch behavior after the adapter takes ownership.
#[derive(Debug, Clone, Default)]
pub struct CallCounters {
    pub catalogs: Arc<AtomicUsize>,
    pub tickers: Arc<AtomicUsize>,
    pub settlements: Arc<AtomicUsize>,
}

impl CallCounters {
    pub fn catalog_calls(&self) -> usize {
        self.catalogs.load(Ordering::SeqCst)
    }

    pub fn ticker_calls(&self) -> usize {
        self.tickers.load(Ordering::SeqCst)
    }

    pub fn settlement_calls(&self) -> usize {
        self.settlements.load(Ordering::SeqCst)
    }
}

/// A [`MarketFeed`] that replays scripted responses.
pub struct ScriptedFeed {
    name: &'static str,
    fees: FeeSchedule,
    futures_catalog: Vec<CatalogEntry>,
    spot_catalog: Vec<CatalogEntry>,
    futures_tickers: Vec<TickerRecord>,
    spot_tickers: Vec<TickerRecord>,
    settlement_times: HashMap<String, i64>,
    fallback: Option<i64>,
    fail: bool,
    counters: CallCounters,
}

impl ScriptedFeed {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fees: FeeSchedule::new(dec!(0.001), dec!(0.0002)),
            futures_catalog: Vec::new(),
            spot_catalog: Vec::new(),
            futures_tickers: Vec::new(),
            spot_tickers: Vec::new(),
            settlement_times: HashMap::new(),
            fallback: None,
            fail: false,
            counters: CallCounters::default(),
        }
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_instrument(mut self, market: MarketKind, venue_symbol: &str, base: &str, quote: &str) -> Self {
        let entry = CatalogEntry::new(venue_symbol, base, quote);
        match market {
            MarketKind::Futures => self.futures_catalog.push(entry),
            MarketKind::Spot => self.spot_catalog.push(entry),
        }
        self
    }

    pub fn with_ticker(mut self, market: MarketKind, record: TickerRecord) -> Self {
        match market {
            MarketKind::Futures => self.futures_tickers.push(record),
            MarketKind::Spot => self.spot_tickers.push(record),
        }
        self
    }

    pub fn with_settlement_time(mut self, venue_symbol: &str, epoch_ms: i64) -> Self {
        self.settlement_times.insert(venue_symbol.to_string(), epoch_ms);
        self
    }

    pub fn with_fallback(mut self, shifted_epoch_ms: i64) -> Self {
        self.fallback = Some(shifted_epoch_ms);
        self
    }

    /// Make every fetch fail, simulating a venue-wide outage.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn counters(&self) -> CallCounters {
        self.counters.clone()
    }

    fn check_outage(&self) -> Result<()> {
        if self.fail {
            Err(Error::Payload(format!("{} is scripted to fail", self.name)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MarketFeed for ScriptedFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>> {
        self.counters.catalogs.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;
        Ok(match market {
            MarketKind::Futures => self.futures_catalog.clone(),
            MarketKind::Spot => self.spot_catalog.clone(),
        })
    }

    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>> {
        self.counters.tickers.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;
        Ok(match market {
            MarketKind::Futures => self.futures_tickers.clone(),
            MarketKind::Spot => self.spot_tickers.clone(),
        })
    }

    async fn settlement_time(&self, venue_symbol: &str) -> Result<i64> {
        self.counters.settlements.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;
        self.settlement_times
            .get(venue_symbol)
            .copied()
            .ok_or_else(|| Error::Payload(format!("no scripted settlement for {venue_symbol}")))
    }

    fn fallback_settlement(&self, _now_epoch_ms: i64) -> Option<i64> {
        self.fallback
    }
}
