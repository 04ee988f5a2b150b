//! Market kinds, quotes, position sides, and fee schedules.

use std::fmt;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::money::Price;

/// Which of a venue's markets a table or fetch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    Futures,
    Spot,
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Futures => write!(f, "futures"),
            Self::Spot => write!(f, "spot"),
        }
    }
}

/// Best ask and bid for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub ask: Price,
    pub bid: Price,
}

impl Quote {
    pub fn new(ask: Price, bid: Price) -> Self {
        Self { ask, bid }
    }
}

/// Direction of one leg of a hedged position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The side the hedge leg takes opposite this one.
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Per-venue fractional fee rates. One schedule per venue, not per
/// instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeeSchedule {
    pub taker: Decimal,
    pub maker: Decimal,
}

impl FeeSchedule {
    pub const fn new(taker: Decimal, maker: Decimal) -> Self {
        Self { taker, maker }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_opposite_flips_direction() {
        assert_eq!(Side::Long.opposite(), Side::Short);
        assert_eq!(Side::Short.opposite(), Side::Long);
    }

    #[test]
    fn side_display_matches_report_labels() {
        assert_eq!(Side::Long.to_string(), "LONG");
        assert_eq!(Side::Short.to_string(), "SHORT");
    }

    #[test]
    fn quote_holds_best_prices() {
        let quote = Quote::new(dec!(65000), dec!(64990));
        assert_eq!(quote.ask, dec!(65000));
        assert_eq!(quote.bid, dec!(64990));
    }
}
