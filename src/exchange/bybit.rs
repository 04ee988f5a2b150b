//! Bybit v5 REST feed.
//!
//! One host serves both markets; the `category` query selects linear
//! perpetuals or spot. The bulk linear ticker already carries funding rate
//! and next funding time, so no per-symbol settlement lookups are needed.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::config::VenueOverrides;
use crate::domain::{FeeSchedule, MarketKind};
use crate::error::Result;

use super::feed::{de_decimal_opt, de_epoch_ms_opt, get_json, CatalogEntry, MarketFeed, TickerRecord};

const DEFAULT_URL: &str = "https://api.bybit.com";
const DEFAULT_TAKER: Decimal = dec!(0.0011);
const DEFAULT_MAKER: Decimal = dec!(0.00036);

pub struct BybitFeed {
    http: reqwest::Client,
    base_url: String,
    fees: FeeSchedule,
}

impl BybitFeed {
    pub fn new(http: reqwest::Client, overrides: Option<&VenueOverrides>) -> Self {
        let mut feed = Self {
            http,
            base_url: DEFAULT_URL.into(),
            fees: FeeSchedule::new(DEFAULT_TAKER, DEFAULT_MAKER),
        };
        if let Some(overrides) = overrides {
            if let Some(url) = &overrides.futures_url {
                feed.base_url = url.clone();
            }
            if let Some(taker) = overrides.taker_fee {
                feed.fees.taker = taker;
            }
            if let Some(maker) = overrides.maker_fee {
                feed.fees.maker = maker;
            }
        }
        feed
    }

    fn category(market: MarketKind) -> &'static str {
        match market {
            MarketKind::Futures => "linear",
            MarketKind::Spot => "spot",
        }
    }
}

#[async_trait]
impl MarketFeed for BybitFeed {
    fn name(&self) -> &'static str {
        "Bybit"
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>> {
        let url = format!(
            "{}/v5/market/instruments-info?category={}",
            self.base_url,
            Self::category(market)
        );
        let response: Envelope<Instrument> = get_json(&self.http, &url).await?;
        Ok(response
            .result
            .list
            .into_iter()
            .map(|entry| CatalogEntry::new(entry.symbol, entry.base_coin, entry.quote_coin))
            .collect())
    }

    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>> {
        let url = format!(
            "{}/v5/market/tickers?category={}",
            self.base_url,
            Self::category(market)
        );
        let response: Envelope<Ticker> = get_json(&self.http, &url).await?;
        Ok(response
            .result
            .list
            .into_iter()
            .map(|ticker| TickerRecord {
                venue_symbol: ticker.symbol,
                ask: ticker.ask1_price,
                bid: ticker.bid1_price,
                funding_rate: match market {
                    MarketKind::Futures => ticker.funding_rate,
                    MarketKind::Spot => None,
                },
                next_settlement_ms: match market {
                    MarketKind::Futures => ticker.next_funding_time,
                    MarketKind::Spot => None,
                },
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: ResultList<T>,
}

#[derive(Debug, Deserialize)]
struct ResultList<T> {
    list: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    base_coin: String,
    quote_coin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    ask1_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    bid1_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    funding_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "de_epoch_ms_opt")]
    next_funding_time: Option<i64>,
}
