//! Bingx REST feed.
//!
//! Venue symbols are `BASE-QUOTE` on both markets. Futures prices and
//! funding data come from two bulk endpoints that are merged here, keyed on
//! the venue symbol; funding fields only attach to symbols the price ticker
//! actually returned.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::config::VenueOverrides;
use crate::domain::{FeeSchedule, MarketKind};
use crate::error::Result;

use super::feed::{de_decimal_opt, de_epoch_ms_opt, get_json, CatalogEntry, MarketFeed, TickerRecord};

const DEFAULT_URL: &str = "https://open-api.bingx.com";
const DEFAULT_TAKER: Decimal = dec!(0.0005);
const DEFAULT_MAKER: Decimal = dec!(0.0002);

pub struct BingxFeed {
    http: reqwest::Client,
    base_url: String,
    fees: FeeSchedule,
}

impl BingxFeed {
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
}

fn split_dashed(venue_symbol: &str) -> Option<(&str, &str)> {
    match venue_symbol.split_once('-') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Some((base, quote)),
        _ => None,
    }
}

#[async_trait]
impl MarketFeed for BingxFeed {
    fn name(&self) -> &'static str {
        "Bingx"
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>> {
        let symbols: Vec<String> = match market {
            MarketKind::Futures => {
                let url = format!("{}/openApi/swap/v2/quote/contracts", self.base_url);
                let response: Envelope<Vec<Contract>> = get_json(&self.http, &url).await?;
                response.data.into_iter().map(|entry| entry.symbol).collect()
            }
            MarketKind::Spot => {
                let url = format!("{}/openApi/spot/v1/common/symbols", self.base_url);
                let response: Envelope<SpotSymbols> = get_json(&self.http, &url).await?;
                response
                    .data
                    .symbols
                    .into_iter()
                    .map(|entry| entry.symbol)
                    .collect()
            }
        };
        Ok(symbols
            .into_iter()
            .filter_map(|venue_symbol| {
                split_dashed(&venue_symbol)
                    .map(|(base, quote)| CatalogEntry::new(venue_symbol.clone(), base, quote))
            })
            .collect())
    }

    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>> {
        match market {
            MarketKind::Futures => {
                let ticker_url = format!("{}/openApi/swap/v2/quote/ticker", self.base_url);
                let premium_url = format!("{}/openApi/swap/v2/quote/premiumIndex", self.base_url);
                let prices: Envelope<Vec<SwapTicker>> = get_json(&self.http, &ticker_url).await?;
                let premiums: Envelope<Vec<PremiumIndex>> =
                    get_json(&self.http, &premium_url).await?;

                let mut funding: HashMap<String, (Option<Decimal>, Option<i64>)> = premiums
                    .data
                    .into_iter()
                    .map(|entry| {
                        (
                            entry.symbol,
                            (entry.last_funding_rate, entry.next_funding_time),
                        )
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
                            ask: ticker.ask_price,
                            bid: ticker.bid_price,
                            funding_rate,
                            next_settlement_ms,
                        }
                    })
                    .collect())
            }
            MarketKind::Spot => {
                let url = format!(
                    "{}/openApi/spot/v1/ticker/24hr?timestamp={}",
                    self.base_url,
                    chrono::Utc::now().timestamp_millis()
                );
                let response: Envelope<Vec<SwapTicker>> = get_json(&self.http, &url).await?;
                Ok(response
                    .data
                    .into_iter()
                    .map(|ticker| TickerRecord {
                        venue_symbol: ticker.symbol,
                        ask: ticker.ask_price,
                        bid: ticker.bid_price,
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
struct Contract {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct SpotSymbols {
    symbols: Vec<Contract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapTicker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    ask_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    bid_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    last_funding_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "de_epoch_ms_opt")]
    next_funding_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_dashed_venue_symbols() {
        assert_eq!(split_dashed("BTC-USDT"), Some(("BTC", "USDT")));
        assert_eq!(split_dashed("BTCUSDT"), None);
        assert_eq!(split_dashed("-USDT"), None);
    }

    #[test]
    fn parses_swap_ticker_and_premium_index() {
        let prices = json!({
            "data": [{"symbol": "BTC-USDT", "askPrice": "65000.1", "bidPrice": "64999.9"}]
        });
        let premiums = json!({
            "data": [{
                "symbol": "BTC-USDT",
                "lastFundingRate": "0.0001",
                "nextFundingTime": 1704067200000i64
            }]
        });

        let prices: Envelope<Vec<SwapTicker>> = serde_json::from_value(prices).unwrap();
        let premiums: Envelope<Vec<PremiumIndex>> = serde_json::from_value(premiums).unwrap();
        assert_eq!(prices.data[0].ask_price, Some(dec!(65000.1)));
        assert_eq!(premiums.data[0].last_funding_rate, Some(dec!(0.0001)));
        assert_eq!(premiums.data[0].next_funding_time, Some(1_704_067_200_000));
    }

    #[test]
    fn parses_spot_symbol_catalog() {
        let payload = json!({
            "data": {"symbols": [{"symbol": "BTC-USDT"}, {"symbol": "ETH-USDT"}]}
        });
        let envelope: Envelope<SpotSymbols> = serde_json::from_value(payload).unwrap();
        assert_eq!(envelope.data.symbols.len(), 2);
    }
}
