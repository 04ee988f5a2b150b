//! Scoring for perpetual-perpetual candidates.
//!
//! A candidate survives the settlement alignment check, gets a direction
//! from the sign of its main rate, and is scored as funding contribution
//! plus price spread minus round-trip fees. All arithmetic is Decimal; the
//! sign rules for the funding contribution are scale-invariant, so they run
//! on fractions and the result is converted to percent once.

use rust_decimal::Decimal;

use crate::domain::money::to_pct;
use crate::domain::settlement::aligned;
use crate::domain::{FeeSchedule, FundingArb, Side};

use super::perp_perp::Candidate;

/// Round-trip taker fees across both legs, as a fraction. Each leg is
/// opened and closed, so both takers count twice.
pub fn combined_fee(main: FeeSchedule, hedge: FeeSchedule) -> Decimal {
    let two = Decimal::TWO;
    two * main.taker + two * hedge.taker
}

/// Funding contribution of a pairing, as a fraction.
///
/// When both settlements are known and differ, only the main leg's funding
/// is banked before the hedge settles, so the hedge contributes nothing.
/// Otherwise the contribution follows the sign combination of the rates.
pub fn base_contribution(
    main_rate: Decimal,
    hedge_rate: Decimal,
    main_settlement: Option<i64>,
    hedge_settlement: Option<i64>,
) -> Decimal {
    if let (Some(main), Some(hedge)) = (main_settlement, hedge_settlement) {
        if main != hedge {
            return main_rate.abs();
        }
    }

    if main_rate.is_zero() || hedge_rate.is_zero() {
        main_rate.abs()
    } else if main_rate > Decimal::ZERO && hedge_rate > Decimal::ZERO {
        main_rate - hedge_rate
    } else if main_rate < Decimal::ZERO && hedge_rate < Decimal::ZERO {
        main_rate.abs() - hedge_rate.abs()
    } else {
        main_rate.abs() + hedge_rate.abs()
    }
}

/// Score one candidate. `None` means the pairing was discarded because the
/// main leg settles strictly after the hedge leg.
pub fn score(candidate: &Candidate) -> Option<FundingArb> {
    if !aligned(candidate.main_settlement, candidate.hedge_settlement) {
        return None;
    }

    let hundred = Decimal::ONE_HUNDRED;
    // A negative main rate pays longs, so the main leg goes long and the
    // hedge sells into its bid; a positive rate is collected short.
    let (main_side, main_price, hedge_price, spread_pct) =
        if candidate.main_rate < Decimal::ZERO {
            let spread =
                hundred - candidate.main_quote.ask / candidate.hedge_quote.bid * hundred;
            (
                Side::Long,
                candidate.main_quote.ask,
                candidate.hedge_quote.bid,
                spread,
            )
        } else {
            let spread =
                hundred - candidate.hedge_quote.ask / candidate.main_quote.bid * hundred;
            (
                Side::Short,
                candidate.main_quote.bid,
                candidate.hedge_quote.ask,
                spread,
            )
        };

    let base = base_contribution(
        candidate.main_rate,
        candidate.hedge_rate,
        candidate.main_settlement,
        candidate.hedge_settlement,
    );
    let fee_pct = to_pct(combined_fee(candidate.main_fees, candidate.hedge_fees));
    let expected_return_pct = to_pct(base) + spread_pct - fee_pct;

    Some(FundingArb {
        symbol: candidate.symbol.clone(),
        main_venue: candidate.main_venue,
        main_side,
        hedge_venue: candidate.hedge_venue,
        hedge_side: main_side.opposite(),
        main_rate_pct: to_pct(candidate.main_rate),
        hedge_rate_pct: to_pct(candidate.hedge_rate),
        main_price,
        hedge_price,
        spread_pct,
        fee_pct,
        main_settlement: candidate.main_settlement,
        hedge_settlement: candidate.hedge_settlement,
        expected_return_pct,
    })
}

/// Sort scored pairings best-first.
pub fn rank(mut rows: Vec<FundingArb>) -> Vec<FundingArb> {
    rows.sort_by(|a, b| {
        b.expected_return_pct
            .cmp(&a.expected_return_pct)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    rows
}
