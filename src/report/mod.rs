//! Tabular rendering of opportunity rows.
//!
//! Rows are formatted copies of the engine's records: percentages rounded
//! to four places, settlement times rendered as wall-clock instants in the
//! reference timezone, absent values shown as `-`.

use chrono::DateTime;
use rust_decimal::Decimal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::{BasisArb, FundingArb};

#[derive(Tabled)]
struct PerpPerpRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "Side")]
    main_side: String,
    #[tabled(rename = "Rate %")]
    main_rate: String,
    #[tabled(rename = "Price")]
    main_price: String,
    #[tabled(rename = "Settles")]
    main_settlement: String,
    #[tabled(rename = "Hedge")]
    hedge: String,
    #[tabled(rename = "Side")]
    hedge_side: String,
    #[tabled(rename = "Rate %")]
    hedge_rate: String,
    #[tabled(rename = "Price")]
    hedge_price: String,
    #[tabled(rename = "Settles")]
    hedge_settlement: String,
    #[tabled(rename = "Spread %")]
    spread: String,
    #[tabled(rename = "Fee %")]
    fee: String,
    #[tabled(rename = "Return %")]
    expected_return: String,
}

impl From<&FundingArb> for PerpPerpRow {
    fn from(arb: &FundingArb) -> Self {
        Self {
            symbol: arb.symbol.to_string(),
            main: arb.main_venue.to_string(),
            main_side: arb.main_side.to_string(),
            main_rate: fmt_pct(arb.main_rate_pct),
            main_price: arb.main_price.normalize().to_string(),
            main_settlement: fmt_settlement(arb.main_settlement),
            hedge: arb.hedge_venue.to_string(),
            hedge_side: arb.hedge_side.to_string(),
            hedge_rate: fmt_pct(arb.hedge_rate_pct),
            hedge_price: arb.hedge_price.normalize().to_string(),
            hedge_settlement: fmt_settlement(arb.hedge_settlement),
            spread: fmt_pct(arb.spread_pct),
            fee: fmt_pct(arb.fee_pct),
            expected_return: fmt_pct(arb.expected_return_pct),
        }
    }
}

#[derive(Tabled)]
struct PerpSpotRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Futures")]
    futures_venue: String,
    #[tabled(rename = "Fut Bid")]
    futures_bid: String,
    #[tabled(rename = "Funding %")]
    funding: String,
    #[tabled(rename = "Spot")]
    spot_venue: String,
    #[tabled(rename = "Spot Ask")]
    spot_ask: String,
    #[tabled(rename = "Spread %")]
    spread: String,
    #[tabled(rename = "Fee %")]
    fee: String,
    #[tabled(rename = "Total %")]
    total: String,
}

impl From<&BasisArb> for PerpSpotRow {
    fn from(arb: &BasisArb) -> Self {
        Self {
            symbol: arb.symbol.to_string(),
            futures_venue: arb.futures_venue.to_string(),
            futures_bid: arb.futures_bid.normalize().to_string(),
            funding: fmt_pct(arb.funding_rate_pct),
            spot_venue: arb.spot_venue.to_string(),
            spot_ask: arb.spot_ask.normalize().to_string(),
            spread: fmt_pct(arb.spread_pct),
            fee: fmt_pct(arb.fee_pct),
            total: fmt_pct(arb.total_pct),
        }
    }
}

pub fn perp_perp_table(rows: &[FundingArb]) -> String {
    let mut table = Table::new(rows.iter().map(PerpPerpRow::from));
    table.with(Style::sharp());
    table.to_string()
}

pub fn perp_spot_table(rows: &[BasisArb]) -> String {
    let mut table = Table::new(rows.iter().map(PerpSpotRow::from));
    table.with(Style::sharp());
    table.to_string()
}

fn fmt_pct(value: Decimal) -> String {
    value.round_dp(4).normalize().to_string()
}

/// Settlement instants are stored already shifted into the reference
/// timezone, so they format as naive wall-clock times.
fn fmt_settlement(shifted_epoch_ms: Option<i64>) -> String {
    shifted_epoch_ms
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
