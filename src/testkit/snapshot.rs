//! Hand-built snapshots for engine tests, skipping the adapter entirely.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{FeeSchedule, MarketKind, Quote, Symbol};
use crate::exchange::ExchangeSnapshot;

pub struct SnapshotBuilder {
    snapshot: ExchangeSnapshot,
}

impl SnapshotBuilder {
    pub fn new(name: &'static str) -> Self {
        Self {
            snapshot: ExchangeSnapshot::empty(name, FeeSchedule::new(dec!(0.001), dec!(0.0002))),
        }
    }

    pub fn fees(mut self, taker: Decimal, maker: Decimal) -> Self {
        self.snapshot.fees = FeeSchedule::new(taker, maker);
        self
    }

    /// Register a futures instrument with a quote and a funding rate
    /// (fraction). The venue symbol is the canonical one.
    pub fn perp(mut self, symbol: &str, ask: Decimal, bid: Decimal, rate: Decimal) -> Self {
        let symbol = Symbol::new(symbol);
        self.snapshot.insert_instrument(
            MarketKind::Futures,
            symbol.as_str(),
            symbol.clone(),
        );
        self.snapshot
            .insert_quote(MarketKind::Futures, symbol.clone(), Quote::new(ask, bid));
        self.snapshot.insert_funding(symbol, rate);
        self
    }

    /// Register a spot instrument with a quote.
    pub fn spot(mut self, symbol: &str, ask: Decimal, bid: Decimal) -> Self {
        let symbol = Symbol::new(symbol);
        self.snapshot.insert_instrument(
            MarketKind::Spot,
            symbol.as_str(),
            symbol.clone(),
        );
        self.snapshot
            .insert_quote(MarketKind::Spot, symbol, Quote::new(ask, bid));
        self
    }

    /// Attach a settlement time (already shifted) to a symbol.
    pub fn settles(mut self, symbol: &str, shifted_epoch_ms: i64) -> Self {
        self.snapshot
            .insert_settlement(Symbol::new(symbol), shifted_epoch_ms);
        self
    }

    pub fn build(self) -> ExchangeSnapshot {
        self.snapshot
    }
}
