//! Venue adapters.
//!
//! Each venue is one [`ExchangeAdapter`] wrapping a [`MarketFeed`]. `load`
//! builds an immutable [`ExchangeSnapshot`] of the venue's symbol tables,
//! quotes, funding rates, and settlement times; after the load barrier the
//! engine only reads snapshots. There is no shared mutable state between
//! adapters.

pub mod bingx;
pub mod bybit;
pub mod feed;
pub mod kucoin;
pub mod mexc;

use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::settlement::REFERENCE_TZ_OFFSET_MS;
use crate::domain::{FeeSchedule, MarketKind, Quote, Rate, Symbol};
use crate::error::Result;
use feed::{CatalogEntry, LoadStats, MarketFeed, SkipReason, TickerRecord};

/// Venue-symbol reconciliation and quotes for one of a venue's markets.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    to_canonical: HashMap<String, Symbol>,
    to_venue: HashMap<Symbol, String>,
    quotes: HashMap<Symbol, Quote>,
}

impl SymbolTable {
    /// Register one catalog instrument. Returns true when the canonical
    /// symbol was already mapped (collision, last write wins).
    fn insert_instrument(&mut self, venue_symbol: String, symbol: Symbol) -> bool {
        let collided = self.to_venue.contains_key(&symbol);
        self.to_canonical.insert(venue_symbol.clone(), symbol.clone());
        self.to_venue.insert(symbol, venue_symbol);
        collided
    }

    fn insert_quote(&mut self, symbol: Symbol, quote: Quote) {
        self.quotes.insert(symbol, quote);
    }

    fn lookup(&self, venue_symbol: &str) -> Option<&Symbol> {
        self.to_canonical.get(venue_symbol)
    }

    /// Venue symbol -> canonical symbol, with identity fallback: unknown
    /// symbols pass through so unmapped instruments are excluded later by
    /// absence from the quote tables, not by an error here.
    pub fn normalize(&self, venue_symbol: &str) -> Symbol {
        self.to_canonical
            .get(venue_symbol)
            .cloned()
            .unwrap_or_else(|| Symbol::new(venue_symbol))
    }

    /// Canonical symbol -> venue symbol, with the same identity fallback.
    pub fn denormalize(&self, symbol: &Symbol) -> String {
        self.to_venue
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.as_str().to_string())
    }

    pub fn quote(&self, symbol: &Symbol) -> Option<Quote> {
        self.quotes.get(symbol).copied()
    }

    pub fn quotes(&self) -> impl Iterator<Item = (&Symbol, &Quote)> {
        self.quotes.iter()
    }
}

/// One venue's published tables, immutable after load.
#[derive(Debug, Clone)]
pub struct ExchangeSnapshot {
    pub name: &'static str,
    pub fees: FeeSchedule,
    pub futures: SymbolTable,
    pub spot: SymbolTable,
    /// Funding rates as signed fractions, futures symbols only. Every key
    /// also has a futures quote.
    pub funding: HashMap<Symbol, Rate>,
    /// Next settlement per symbol, shifted epoch ms. Absence means the
    /// settlement time is unknown.
    pub settlements: HashMap<Symbol, i64>,
    pub stats: LoadStats,
}

impl ExchangeSnapshot {
    pub fn empty(name: &'static str, fees: FeeSchedule) -> Self {
        Self {
            name,
            fees,
            futures: SymbolTable::default(),
            spot: SymbolTable::default(),
            funding: HashMap::new(),
            settlements: HashMap::new(),
            stats: LoadStats::default(),
        }
    }

    fn table(&self, market: MarketKind) -> &SymbolTable {
        match market {
            MarketKind::Futures => &self.futures,
            MarketKind::Spot => &self.spot,
        }
    }

    fn table_mut(&mut self, market: MarketKind) -> &mut SymbolTable {
        match market {
            MarketKind::Futures => &mut self.futures,
            MarketKind::Spot => &mut self.spot,
        }
    }

    pub fn normalize(&self, market: MarketKind, venue_symbol: &str) -> Symbol {
        self.table(market).normalize(venue_symbol)
    }

    pub fn denormalize(&self, market: MarketKind, symbol: &Symbol) -> String {
        self.table(market).denormalize(symbol)
    }

    pub fn quote(&self, market: MarketKind, symbol: &Symbol) -> Option<Quote> {
        self.table(market).quote(symbol)
    }

    pub fn funding_rate(&self, symbol: &Symbol) -> Option<Rate> {
        self.funding.get(symbol).copied()
    }

    pub fn settlement(&self, symbol: &Symbol) -> Option<i64> {
        self.settlements.get(symbol).copied()
    }

    fn ingest_catalog(&mut self, market: MarketKind, entries: Vec<CatalogEntry>) {
        let mut collisions = 0;
        let mut accepted = 0;
        for entry in entries {
            let symbol = Symbol::from_parts(&entry.base, &entry.quote);
            if self.table_mut(market).insert_instrument(entry.venue_symbol, symbol) {
                collisions += 1;
            }
            accepted += 1;
        }
        match market {
            MarketKind::Futures => self.stats.futures_instruments = accepted,
            MarketKind::Spot => self.stats.spot_instruments = accepted,
        }
        self.stats.collisions += collisions;
        if collisions > 0 {
            debug!(
                venue = self.name,
                %market,
                collisions,
                "venue symbols collided on a canonical symbol, last write wins"
            );
        }
    }

    fn ingest_ticker(
        &mut self,
        market: MarketKind,
        record: TickerRecord,
    ) -> std::result::Result<(), SkipReason> {
        let symbol = self
            .table(market)
            .lookup(&record.venue_symbol)
            .cloned()
            .ok_or(SkipReason::UnknownInstrument)?;

        let quote = match (record.ask, record.bid) {
            (Some(ask), Some(bid)) if ask > Decimal::ZERO && bid > Decimal::ZERO => {
                Quote::new(ask, bid)
            }
            _ => return Err(SkipReason::MissingQuote),
        };
        self.table_mut(market).insert_quote(symbol.clone(), quote);

        if market == MarketKind::Futures {
            // A funding rate is only recorded alongside a quote, so every
            // funded symbol is quotable.
            if let Some(rate) = record.funding_rate {
                self.funding.insert(symbol.clone(), rate);
            }
            if let Some(ms) = record.next_settlement_ms {
                self.settlements.insert(symbol, ms + REFERENCE_TZ_OFFSET_MS);
            }
        }
        Ok(())
    }
}

/// One venue: a feed plus the snapshot built from it.
pub struct ExchangeAdapter {
    feed: Box<dyn MarketFeed>,
    /// Only symbols above this |rate| get a secondary settlement request.
    prefetch_min_rate: Decimal,
    snapshot: Option<ExchangeSnapshot>,
}

impl ExchangeAdapter {
    pub fn new(feed: Box<dyn MarketFeed>, prefetch_min_rate: Decimal) -> Self {
        Self {
            feed,
            prefetch_min_rate,
            snapshot: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.feed.name()
    }

    pub fn fees(&self) -> FeeSchedule {
        self.feed.fees()
    }

    /// The snapshot, once [`Self::load`] has run.
    pub fn snapshot(&self) -> Option<&ExchangeSnapshot> {
        self.snapshot.as_ref()
    }

    /// Populate the snapshot from the feed.
    ///
    /// Idempotent: a second call with a built snapshot returns without
    /// touching the feed. A venue-wide fetch failure degrades to an empty
    /// snapshot, which contributes no opportunities.
    pub async fn load(&mut self) {
        if self.snapshot.is_some() {
            debug!(venue = self.name(), "already loaded, skipping re-fetch");
            return;
        }

        let snapshot = match self.build_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(venue = self.name(), error = %err, "venue load failed, continuing without it");
                let mut empty = ExchangeSnapshot::empty(self.feed.name(), self.feed.fees());
                empty.stats.degraded = true;
                empty
            }
        };

        info!(
            venue = snapshot.name,
            futures_quotes = snapshot.stats.futures_quotes,
            spot_quotes = snapshot.stats.spot_quotes,
            funding_rates = snapshot.stats.funding_rates,
            skipped = snapshot.stats.skipped(),
            "venue loaded"
        );
        self.snapshot = Some(snapshot);
    }

    async fn build_snapshot(&self) -> Result<ExchangeSnapshot> {
        let mut snapshot = ExchangeSnapshot::empty(self.feed.name(), self.feed.fees());

        snapshot.ingest_catalog(MarketKind::Futures, self.feed.catalog(MarketKind::Futures).await?);
        snapshot.ingest_catalog(MarketKind::Spot, self.feed.catalog(MarketKind::Spot).await?);

        for record in self.feed.tickers(MarketKind::Futures).await? {
            if let Err(reason) = snapshot.ingest_ticker(MarketKind::Futures, record) {
                snapshot.stats.record_skip(reason);
            }
        }
        for record in self.feed.tickers(MarketKind::Spot).await? {
            if let Err(reason) = snapshot.ingest_ticker(MarketKind::Spot, record) {
                snapshot.stats.record_skip(reason);
            }
        }
        snapshot.stats.futures_quotes = snapshot.futures.quotes.len();
        snapshot.stats.spot_quotes = snapshot.spot.quotes.len();
        snapshot.stats.funding_rates = snapshot.funding.len();

        self.fill_settlements(&mut snapshot).await;
        Ok(snapshot)
    }

    /// Secondary settlement lookups for symbols the bulk feed left without
    /// a time, fanned out concurrently and joined. Only instruments above
    /// the prefetch threshold are worth a request; the rest fall back to
    /// the venue's shared schedule when it has one.
    async fn fill_settlements(&self, snapshot: &mut ExchangeSnapshot) {
        let pending: Vec<(Symbol, String)> = snapshot
            .funding
            .iter()
            .filter(|(symbol, rate)| {
                rate.abs() > self.prefetch_min_rate
                    && !snapshot.settlements.contains_key(*symbol)
            })
            .map(|(symbol, _)| (symbol.clone(), snapshot.futures.denormalize(symbol)))
            .collect();

        if !pending.is_empty() {
            let lookups = pending
                .iter()
                .map(|(_, venue_symbol)| self.feed.settlement_time(venue_symbol));
            for ((symbol, venue_symbol), result) in
                pending.iter().zip(join_all(lookups).await)
            {
                match result {
                    Ok(ms) => {
                        snapshot
                            .settlements
                            .insert(symbol.clone(), ms + REFERENCE_TZ_OFFSET_MS);
                    }
                    Err(err) => {
                        // Absent settlement is a valid state; the pairing
                        // just bypasses the alignment check.
                        debug!(
                            venue = snapshot.name,
                            symbol = venue_symbol.as_str(),
                            error = %err,
                            "settlement lookup failed, leaving time unknown"
                        );
                    }
                }
            }
        }

        let now_ms = chrono::Utc::now().timestamp_millis();
        if let Some(fallback) = self.feed.fallback_settlement(now_ms) {
            for symbol in snapshot.funding.keys() {
                if !snapshot.settlements.contains_key(symbol) {
                    snapshot.settlements.insert(symbol.clone(), fallback);
                }
            }
        }
    }
}

/// Load every adapter concurrently and wait for all of them. The engine
/// must not read any table before this join completes.
pub async fn load_all(adapters: &mut [ExchangeAdapter]) {
    join_all(adapters.iter_mut().map(|adapter| adapter.load())).await;
}

/// Snapshots of every loaded adapter.
pub fn snapshots(adapters: &[ExchangeAdapter]) -> Vec<&ExchangeSnapshot> {
    adapters.iter().filter_map(|adapter| adapter.snapshot()).collect()
}

/// The four built-in venues, configured from `config.toml` overrides.
pub fn default_adapters(config: &Config) -> Result<Vec<ExchangeAdapter>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http.timeout_ms))
        .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
        .build()?;

    let prefetch = config.scan.settlement_prefetch_min_rate;
    Ok(vec![
        ExchangeAdapter::new(
            Box::new(bybit::BybitFeed::new(http.clone(), config.venue("bybit"))),
            prefetch,
        ),
        ExchangeAdapter::new(
            Box::new(kucoin::KucoinFeed::new(http.clone(), config.venue("kucoin"))),
            prefetch,
        ),
        ExchangeAdapter::new(
            Box::new(mexc::MexcFeed::new(http.clone(), config.venue("mexc"))),
            prefetch,
        ),
        ExchangeAdapter::new(
            Box::new(bingx::BingxFeed::new(http, config.venue("bingx"))),
            prefetch,
        ),
    ])
}

/// Mutation mix-ins for the testkit snapshot builder.
#[cfg(any(test, feature = "testkit"))]
impl ExchangeSnapshot {
    pub fn insert_instrument(&mut self, market: MarketKind, venue_symbol: &str, symbol: Symbol) {
        self.table_mut(market)
            .insert_instrument(venue_symbol.to_string(), symbol);
    }

    pub fn insert_quote(&mut self, market: MarketKind, symbol: Symbol, quote: Quote) {
        self.table_mut(market).insert_quote(symbol, quote);
    }

    pub fn insert_funding(&mut self, symbol: Symbol, rate: Rate) {
        self.funding.insert(symbol, rate);
    }

    pub fn insert_settlement(&mut self, symbol: Symbol, shifted_epoch_ms: i64) {
        self.settlements.insert(symbol, shifted_epoch_ms);
    }
}
