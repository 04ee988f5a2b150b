//! Carryscan - cross-exchange funding-rate arbitrage scanner.
//!
//! This crate scans derivatives and spot exchanges for funding rates and
//! best quotes, reconciles every venue's instrument identifiers into one
//! canonical `BASE/QUOTE` symbol space, and reports hedged positions whose
//! funding income and price spread beat the round-trip fees.
//!
//! # Architecture
//!
//! Each venue owns an [`exchange::ExchangeAdapter`] that loads an immutable
//! snapshot of its symbol tables, quotes, funding rates, and settlement
//! times. Once every adapter has loaded, the engine runs one of two pure
//! matchers over the snapshots:
//!
//! - **`engine::perp_perp`** - same symbol across two venues' perpetual
//!   markets, long one leg and short the other
//! - **`engine::perp_spot`** - a venue's perpetual against any venue's spot
//!   market, including the same venue
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with scan thresholds and fee overrides
//! - [`domain`] - Venue-independent types: symbols, quotes, opportunities
//! - [`engine`] - Matching, scoring, and ranking over loaded snapshots
//! - [`error`] - Error types for the crate
//! - [`exchange`] - Venue adapters and the fetch boundary trait
//! - [`report`] - Tabular rendering of opportunity rows
//!
//! # Example
//!
//! ```no_run
//! use carryscan::config::Config;
//! use carryscan::exchange;
//!
//! # async fn scan() -> carryscan::error::Result<()> {
//! let config = Config::load_or_default("config.toml")?;
//! let mut adapters = exchange::default_adapters(&config)?;
//! exchange::load_all(&mut adapters).await;
//! let pairings = carryscan::engine::perp_perp::scan(
//!     &exchange::snapshots(&adapters),
//!     &config.scan,
//! );
//! println!("{} ranked pairings", pairings.ranked.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod report;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
