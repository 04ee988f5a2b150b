//! Configuration loading from TOML files.
//!
//! Every section is optional; defaults reproduce the thresholds and fee
//! schedules the scanner ships with. Per-venue overrides let operators
//! adjust fee tiers or point a venue at a mirror URL without code changes.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub scan: ScanConfig,
    /// Per-venue overrides keyed by lowercase venue name (`bybit`, `mexc`,
    /// `bingx`, `kucoin`).
    pub venues: HashMap<String, VenueOverrides>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    ///
    /// A snapshot scan is useful out of the box, so a missing file is not
    /// an error; a malformed file still is.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scan.min_rate < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "scan.min_rate",
                reason: "must be non-negative".into(),
            }
            .into());
        }
        if self.scan.perp_perp_min_rate < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "scan.perp_perp_min_rate",
                reason: "must be non-negative".into(),
            }
            .into());
        }
        if self.scan.max_abs_spread_pct < self.scan.min_spread_pct {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_abs_spread_pct",
                reason: "must be at least scan.min_spread_pct".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Overrides for one venue, if configured.
    pub fn venue(&self, name: &str) -> Option<&VenueOverrides> {
        self.venues.get(&name.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Thresholds and exclusions for the matching engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Funding rates with absolute value at or below this fraction are
    /// dropped before matching (strict comparison: the boundary value is
    /// excluded).
    pub min_rate: Decimal,

    /// Stricter cut for the main leg of a perpetual-perpetual pairing.
    pub perp_perp_min_rate: Decimal,

    /// Only instruments above this fraction get a secondary per-symbol
    /// settlement-time request during load.
    pub settlement_prefetch_min_rate: Decimal,

    /// Futures/spot rows below this spread percentage are discarded.
    pub min_spread_pct: Decimal,

    /// Futures/spot rows beyond this absolute spread percentage are treated
    /// as bad symbol mappings and discarded.
    pub max_abs_spread_pct: Decimal,

    /// Known-bad futures/spot venue-symbol combinations.
    pub deny: Vec<DenyRule>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_rate: dec!(0.0001),
            perp_perp_min_rate: dec!(0.001),
            settlement_prefetch_min_rate: dec!(0.0005),
            min_spread_pct: dec!(0.5),
            max_abs_spread_pct: dec!(60),
            deny: vec![
                // Symbols that collide across venues' naming but are not
                // the same asset.
                DenyRule::new("Bybit", "Mexc", "QI/USDT"),
                DenyRule::new("Bybit", "Bybit", "FB/USDT"),
                DenyRule::new("Mexc", "Mexc", "QI/USDT"),
                DenyRule::new("Mexc", "Bybit", "FB/USDT"),
            ],
        }
    }
}

/// One excluded (futures venue, spot venue, symbol) combination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DenyRule {
    pub futures_venue: String,
    pub spot_venue: String,
    pub symbol: String,
}

impl DenyRule {
    pub fn new(
        futures_venue: impl Into<String>,
        spot_venue: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            futures_venue: futures_venue.into(),
            spot_venue: spot_venue.into(),
            symbol: symbol.into(),
        }
    }

    pub fn matches(&self, futures_venue: &str, spot_venue: &str, symbol: &str) -> bool {
        self.futures_venue == futures_venue
            && self.spot_venue == spot_venue
            && self.symbol == symbol
    }
}

/// Optional per-venue settings.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct VenueOverrides {
    pub taker_fee: Option<Decimal>,
    pub maker_fee: Option<Decimal>,
    pub futures_url: Option<String>,
    pub spot_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.min_rate, dec!(0.0001));
        assert_eq!(config.scan.perp_perp_min_rate, dec!(0.001));
    }

    #[test]
    fn parses_scan_section() {
        let config: Config = toml::from_str(
            r#"
            [scan]
            min_rate = 0.0002
            min_spread_pct = 1.0

            [[scan.deny]]
            futures_venue = "Bybit"
            spot_venue = "Kucoin"
            symbol = "ABC/USDT"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.min_rate, dec!(0.0002));
        assert_eq!(config.scan.deny.len(), 1);
        assert!(config.scan.deny[0].matches("Bybit", "Kucoin", "ABC/USDT"));
    }

    #[test]
    fn parses_venue_overrides() {
        let config: Config = toml::from_str(
            r#"
            [venues.bybit]
            taker_fee = 0.001
            "#,
        )
        .unwrap();

        let bybit = config.venue("Bybit").unwrap();
        assert_eq!(bybit.taker_fee, Some(dec!(0.001)));
        assert!(bybit.futures_url.is_none());
    }

    #[test]
    fn rejects_negative_min_rate() {
        let config: Config = toml::from_str(
            r#"
            [scan]
            min_rate = -0.1
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn deny_rule_requires_all_three_fields_to_match() {
        let rule = DenyRule::new("Bybit", "Mexc", "QI/USDT");
        assert!(rule.matches("Bybit", "Mexc", "QI/USDT"));
        assert!(!rule.matches("Mexc", "Mexc", "QI/USDT"));
        assert!(!rule.matches("Bybit", "Mexc", "BTC/USDT"));
    }
}
