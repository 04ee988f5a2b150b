//! Futures-spot matcher.
//!
//! Symbols with a material funding rate on some venue's perpetual are sold
//! against any venue's spot market, the same venue included. The short
//! futures leg collects funding while the spot leg carries the asset, so
//! the row total is funding plus the entry spread. Fees are reported but
//! not netted out of the total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::ScanConfig;
use crate::domain::money::to_pct;
use crate::domain::{BasisArb, MarketKind, Quote, Rate, Symbol};
use crate::exchange::ExchangeSnapshot;

use super::filter::material_rates;
use super::scoring::combined_fee;

struct FuturesLeg<'a> {
    snapshot: &'a ExchangeSnapshot,
    quote: Quote,
    rate: Rate,
}

struct SpotLeg<'a> {
    snapshot: &'a ExchangeSnapshot,
    quote: Quote,
}

/// One full futures-spot scan over loaded snapshots. Rows are sorted by
/// funding rate descending.
pub fn scan(snapshots: &[&ExchangeSnapshot], config: &ScanConfig) -> Vec<BasisArb> {
    // BTreeMaps keep symbol iteration stable across runs.
    let mut futures_legs: BTreeMap<Symbol, Vec<FuturesLeg>> = BTreeMap::new();
    let mut spot_legs: BTreeMap<Symbol, Vec<SpotLeg>> = BTreeMap::new();

    for &snapshot in snapshots {
        for (symbol, rate) in material_rates(snapshot, config.min_rate) {
            if let Some(quote) = snapshot.quote(MarketKind::Futures, &symbol) {
                futures_legs.entry(symbol).or_default().push(FuturesLeg {
                    snapshot,
                    quote,
                    rate,
                });
            }
        }
        for (symbol, quote) in snapshot.spot.quotes() {
            spot_legs.entry(symbol.clone()).or_default().push(SpotLeg {
                snapshot,
                quote: *quote,
            });
        }
    }

    let mut rows = Vec::new();
    for (symbol, futures) in &futures_legs {
        let Some(spots) = spot_legs.get(symbol) else {
            continue;
        };
        for futures_leg in futures {
            for spot_leg in spots {
                if let Some(row) = pair(symbol, futures_leg, spot_leg, config) {
                    rows.push(row);
                }
            }
        }
    }

    rows.sort_by(|a, b| {
        b.funding_rate_pct
            .cmp(&a.funding_rate_pct)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    rows
}

fn pair(
    symbol: &Symbol,
    futures_leg: &FuturesLeg,
    spot_leg: &SpotLeg,
    config: &ScanConfig,
) -> Option<BasisArb> {
    let futures_venue = futures_leg.snapshot.name;
    let spot_venue = spot_leg.snapshot.name;
    if config
        .deny
        .iter()
        .any(|rule| rule.matches(futures_venue, spot_venue, symbol.as_str()))
    {
        return None;
    }

    let hundred = Decimal::ONE_HUNDRED;
    // Sell the futures bid, buy the spot ask.
    let spread_pct = hundred - spot_leg.quote.ask / futures_leg.quote.bid * hundred;
    if spread_pct < config.min_spread_pct || spread_pct.abs() > config.max_abs_spread_pct {
        return None;
    }

    let funding_rate_pct = to_pct(futures_leg.rate);
    Some(BasisArb {
        symbol: symbol.clone(),
        futures_venue,
        futures_bid: futures_leg.quote.bid,
        funding_rate_pct,
        spot_venue,
        spot_ask: spot_leg.quote.ask,
        spread_pct,
        fee_pct: to_pct(combined_fee(
            futures_leg.snapshot.fees,
            spot_leg.snapshot.fees,
        )),
        total_pct: funding_rate_pct + spread_pct,
    })
}
