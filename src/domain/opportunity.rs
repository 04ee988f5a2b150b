//! Opportunity records produced by the matchers.
//!
//! Both record types are ephemeral report rows: recomputed fully on every
//! run, never persisted. Percentage fields are percentages (already scaled
//! by 100), everything else is raw.

use rust_decimal::Decimal;

use super::ids::Symbol;
use super::market::Side;
use super::money::Price;

/// One perpetual-perpetual pairing: the same symbol funded on two venues,
/// long one leg and short the other.
#[derive(Debug, Clone)]
pub struct FundingArb {
    pub symbol: Symbol,
    pub main_venue: &'static str,
    pub main_side: Side,
    pub hedge_venue: &'static str,
    pub hedge_side: Side,
    /// Funding rate of the main leg, percent.
    pub main_rate_pct: Decimal,
    /// Funding rate of the hedge leg, percent.
    pub hedge_rate_pct: Decimal,
    /// Entry price of the main leg (crossing price for its side).
    pub main_price: Price,
    /// Entry price of the hedge leg.
    pub hedge_price: Price,
    /// Price spread between the legs, percent.
    pub spread_pct: Decimal,
    /// Round-trip taker fees across both legs, percent.
    pub fee_pct: Decimal,
    /// Next settlement of the main leg, shifted epoch ms.
    pub main_settlement: Option<i64>,
    /// Next settlement of the hedge leg, shifted epoch ms.
    pub hedge_settlement: Option<i64>,
    /// Funding contribution plus spread minus fees, percent.
    pub expected_return_pct: Decimal,
}

impl FundingArb {
    /// Whether the pairing is worth acting on after fees.
    pub fn actionable(&self) -> bool {
        self.expected_return_pct > Decimal::ZERO
    }
}

/// One futures-spot pairing: a venue's perpetual sold against any venue's
/// spot market for the same symbol.
#[derive(Debug, Clone)]
pub struct BasisArb {
    pub symbol: Symbol,
    pub futures_venue: &'static str,
    /// Best bid on the futures leg (the side being sold).
    pub futures_bid: Price,
    /// Funding rate collected while short the futures leg, percent.
    pub funding_rate_pct: Decimal,
    pub spot_venue: &'static str,
    /// Best ask on the spot leg (the side being bought).
    pub spot_ask: Price,
    /// Premium of the futures leg over spot, percent.
    pub spread_pct: Decimal,
    /// Round-trip taker fees across both legs, percent. Informational:
    /// not subtracted from `total_pct`.
    pub fee_pct: Decimal,
    /// Funding plus spread, percent.
    pub total_pct: Decimal,
}
