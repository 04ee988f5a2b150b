//! Venue-independent domain types.

pub mod ids;
pub mod market;
pub mod money;
pub mod opportunity;
pub mod settlement;

pub use ids::Symbol;
pub use market::{FeeSchedule, MarketKind, Quote, Side};
pub use money::{Price, Rate};
pub use opportunity::{BasisArb, FundingArb};
