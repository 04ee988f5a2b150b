//! Funding-rate materiality filter.

use rust_decimal::Decimal;

use crate::domain::{Rate, Symbol};
use crate::exchange::ExchangeSnapshot;

/// Symbols whose funding rate is material: `|rate| > threshold`, strictly.
/// A rate exactly on the threshold is excluded.
///
/// Sorted by |rate| descending, then symbol, so runs over the same snapshot
/// are deterministic.
pub fn material_rates(snapshot: &ExchangeSnapshot, threshold: Decimal) -> Vec<(Symbol, Rate)> {
    let mut material: Vec<(Symbol, Rate)> = snapshot
        .funding
        .iter()
        .filter(|(_, rate)| rate.abs() > threshold)
        .map(|(symbol, rate)| (symbol.clone(), *rate))
        .collect();
    material.sort_by(|(a_sym, a_rate), (b_sym, b_rate)| {
        b_rate
            .abs()
            .cmp(&a_rate.abs())
            .then_with(|| a_sym.cmp(b_sym))
    });
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeeSchedule, Symbol};
    use rust_decimal_macros::dec;

    fn snapshot_with_rates(rates: &[(&str, Decimal)]) -> ExchangeSnapshot {
        let mut snapshot =
            ExchangeSnapshot::empty("Bybit", FeeSchedule::new(dec!(0.0011), dec!(0.00036)));
        for (symbol, rate) in rates {
            snapshot.insert_funding(Symbol::new(*symbol), *rate);
        }
        snapshot
    }

    #[test]
    fn boundary_rate_is_excluded() {
        let snapshot = snapshot_with_rates(&[
            ("AT/USDT", dec!(0.0001)),
            ("ABOVE/USDT", dec!(0.00011)),
            ("NEG/USDT", dec!(-0.0001)),
        ]);

        let material = material_rates(&snapshot, dec!(0.0001));
        assert_eq!(material.len(), 1);
        assert_eq!(material[0].0.as_str(), "ABOVE/USDT");
    }

    #[test]
    fn negative_rates_are_material_by_magnitude() {
        let snapshot = snapshot_with_rates(&[
            ("POS/USDT", dec!(0.002)),
            ("NEG/USDT", dec!(-0.005)),
        ]);

        let material = material_rates(&snapshot, dec!(0.001));
        assert_eq!(material[0].0.as_str(), "NEG/USDT");
        assert_eq!(material[1].0.as_str(), "POS/USDT");
    }

    #[test]
    fn ties_break_on_symbol_for_determinism() {
        let snapshot = snapshot_with_rates(&[
            ("B/USDT", dec!(0.002)),
            ("A/USDT", dec!(-0.002)),
        ]);

        let material = material_rates(&snapshot, dec!(0.001));
        assert_eq!(material[0].0.as_str(), "A/USDT");
        assert_eq!(material[1].0.as_str(), "B/USDT");
    }
}
