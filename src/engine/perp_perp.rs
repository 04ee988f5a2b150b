//! Cross-venue perpetual-perpetual matcher.
//!
//! Every venue takes a turn as the main leg: its material funding symbols
//! are paired against every other venue that funds and quotes the same
//! symbol. A symbol material on both venues therefore appears in both
//! orderings, scored independently.

use rust_decimal::Decimal;

use crate::config::ScanConfig;
use crate::domain::{FeeSchedule, FundingArb, MarketKind, Quote, Symbol};
use crate::exchange::ExchangeSnapshot;

use super::filter::material_rates;
use super::scoring;

/// One unscored (main, hedge) pairing. Rates are fractions.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub symbol: Symbol,
    pub main_venue: &'static str,
    pub main_rate: Decimal,
    pub main_quote: Quote,
    pub main_settlement: Option<i64>,
    pub main_fees: FeeSchedule,
    pub hedge_venue: &'static str,
    pub hedge_rate: Decimal,
    pub hedge_quote: Quote,
    pub hedge_settlement: Option<i64>,
    pub hedge_fees: FeeSchedule,
}

/// Scored pairings in the two orders operators read them in.
#[derive(Debug, Clone)]
pub struct PerpPerpReport {
    /// Descending by expected return.
    pub ranked: Vec<FundingArb>,
    /// Descending by main-leg funding magnitude.
    pub by_rate: Vec<FundingArb>,
}

/// All (main, hedge) pairings across the snapshots. The main leg must pass
/// the materiality cut; the hedge leg only needs a funding rate and a
/// futures quote.
pub fn pair_candidates(
    snapshots: &[&ExchangeSnapshot],
    min_main_rate: Decimal,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (main_idx, main) in snapshots.iter().enumerate() {
        for (symbol, main_rate) in material_rates(main, min_main_rate) {
            let Some(main_quote) = main.quote(MarketKind::Futures, &symbol) else {
                continue;
            };

            for (hedge_idx, hedge) in snapshots.iter().enumerate() {
                if hedge_idx == main_idx {
                    continue;
                }
                let Some(hedge_rate) = hedge.funding_rate(&symbol) else {
                    continue;
                };
                let Some(hedge_quote) = hedge.quote(MarketKind::Futures, &symbol) else {
                    continue;
                };

                candidates.push(Candidate {
                    symbol: symbol.clone(),
                    main_venue: main.name,
                    main_rate,
                    main_quote,
                    main_settlement: main.settlement(&symbol),
                    main_fees: main.fees,
                    hedge_venue: hedge.name,
                    hedge_rate,
                    hedge_quote,
                    hedge_settlement: hedge.settlement(&symbol),
                    hedge_fees: hedge.fees,
                });
            }
        }
    }

    candidates
}

/// One full perpetual-perpetual scan over loaded snapshots.
pub fn scan(snapshots: &[&ExchangeSnapshot], config: &ScanConfig) -> PerpPerpReport {
    let scored: Vec<FundingArb> = pair_candidates(snapshots, config.perp_perp_min_rate)
        .iter()
        .filter_map(scoring::score)
        .collect();

    let mut by_rate = scored.clone();
    by_rate.sort_by(|a, b| {
        b.main_rate_pct
            .abs()
            .cmp(&a.main_rate_pct.abs())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    PerpPerpReport {
        ranked: scoring::rank(scored),
        by_rate,
    }
}
