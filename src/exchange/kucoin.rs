//! Kucoin REST feed.
//!
//! Futures and spot live on separate hosts. The active-contracts catalog is
//! also the source of funding rates and settlement countdowns; the
//! countdowns are relative milliseconds, converted to absolute instants at
//! fetch time and floored to the venue's 10-second granularity.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::config::VenueOverrides;
use crate::domain::settlement::floor_to_ten_seconds;
use crate::domain::{FeeSchedule, MarketKind};
use crate::error::Result;

use super::feed::{de_decimal_opt, de_epoch_ms_opt, get_json, CatalogEntry, MarketFeed, TickerRecord};

const DEFAULT_FUTURES_URL: &str = "https://api-futures.kucoin.com";
const DEFAULT_SPOT_URL: &str = "https://api.kucoin.com";
const DEFAULT_TAKER: Decimal = dec!(0.0006);
const DEFAULT_MAKER: Decimal = dec!(0.0002);

pub struct KucoinFeed {
    http: reqwest::Client,
    futures_url: String,
    spot_url: String,
    fees: FeeSchedule,
}

impl KucoinFeed {
    pub fn new(http: reqwest::Client, overrides: Option<&VenueOverrides>) -> Self {
        let mut feed = Self {
            http,
            futures_url: DEFAULT_FUTURES_URL.into(),
            spot_url: DEFAULT_SPOT_URL.into(),
            fees: FeeSchedule::new(DEFAULT_TAKER, DEFAULT_MAKER),
        };
        if let Some(overrides) = overrides {
            if let Some(url) = &overrides.futures_url {
                feed.futures_url = url.clone();
            }
            if let Some(url) = &overrides.spot_url {
                feed.spot_url = url.clone();
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

    async fn active_contracts(&self) -> Result<Vec<Contract>> {
        let url = format!("{}/api/v1/contracts/active", self.futures_url);
        let response: Envelope<Vec<Contract>> = get_json(&self.http, &url).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl MarketFeed for KucoinFeed {
    fn name(&self) -> &'static str {
        "Kucoin"
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>> {
        match market {
            MarketKind::Futures => Ok(self
                .active_contracts()
                .await?
                .into_iter()
                .map(|entry| {
                    CatalogEntry::new(entry.symbol, entry.base_currency, entry.quote_currency)
                })
                .collect()),
            MarketKind::Spot => {
                let url = format!("{}/api/v2/symbols", self.spot_url);
                let response: Envelope<Vec<SpotSymbol>> = get_json(&self.http, &url).await?;
                Ok(response
                    .data
                    .into_iter()
                    .filter(|entry| entry.enable_trading)
                    .map(|entry| {
                        CatalogEntry::new(entry.symbol, entry.base_currency, entry.quote_currency)
                    })
                    .collect())
            }
        }
    }

    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>> {
        match market {
            MarketKind::Futures => {
                let url = format!("{}/api/v1/allTickers", self.futures_url);
                let prices: Envelope<Vec<FuturesTicker>> = get_json(&self.http, &url).await?;

                let now_ms = chrono::Utc::now().timestamp_millis();
                let mut funding: HashMap<String, (Option<Decimal>, Option<i64>)> = self
                    .active_contracts()
                    .await?
                    .into_iter()
                    .map(|entry| {
                        let settlement = entry
                            .next_funding_rate_time
                            .map(|relative_ms| floor_to_ten_seconds(now_ms + relative_ms));
                        (entry.symbol, (entry.funding_fee_rate, settlement))
                    })
                    .collect();

                Ok(prices
                    .data
                    .into_iter()
                    .map(|ticker| {
                        let (funding_rate, next_settlement_ms) =
                            funding.remove(&ticker.symbol).unwrap_or((None, None));
                        TickerRecord {
                            venue_symbol: ticker.symbol,
                            ask: ticker.best_ask_price,
                            bid: ticker.best_bid_price,
                            funding_rate,
                            next_settlement_ms,
                        }
                    })
                    .collect())
            }
            MarketKind::Spot => {
                let url = format!("{}/api/v1/market/allTickers", self.spot_url);
                let response: Envelope<SpotTickers> = get_json(&self.http, &url).await?;
                Ok(response
                    .data
                    .ticker
                    .into_iter()
                    .map(|ticker| TickerRecord {
                        venue_symbol: ticker.symbol,
                        // The venue publishes taker-facing prices: `buy` is
                        // what a buyer pays, `sell` what a seller receives.
                        ask: ticker.buy,
                        bid: ticker.sell,
                        ..TickerRecord::default()
                    })
                    .collect())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contract {
    symbol: String,
    base_currency: String,
    quote_currency: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    funding_fee_rate: Option<Decimal>,
    /// Relative milliseconds until the next funding settlement.
    #[serde(default, deserialize_with = "de_epoch_ms_opt")]
    next_funding_rate_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotSymbol {
    symbol: String,
    base_currency: String,
    quote_currency: String,
    #[serde(default)]
    enable_trading: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesTicker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    best_ask_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    best_bid_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct SpotTickers {
    ticker: Vec<SpotTicker>,
}

#[derive(Debug, Deserialize)]
struct SpotTicker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    buy: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    sell: Option<Decimal>,
}
