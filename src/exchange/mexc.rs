//! Mexc REST feed.
//!
//! Futures and spot live on separate hosts with unrelated payload shapes.
//! The bulk contract ticker omits settlement times, so material symbols get
//! a per-symbol funding-rate lookup and the rest fall back to the venue's
//! fixed daily schedule.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::config::VenueOverrides;
use crate::domain::settlement::next_scheduled;
use crate::domain::{FeeSchedule, MarketKind};
use crate::error::{Error, Result};

use super::feed::{de_decimal_opt, de_epoch_ms_opt, get_json, CatalogEntry, MarketFeed, TickerRecord};

const DEFAULT_FUTURES_URL: &str = "https://contract.mexc.com";
const DEFAULT_SPOT_URL: &str = "https://api.mexc.com";
const DEFAULT_TAKER: Decimal = dec!(0.0002);
const DEFAULT_MAKER: Decimal = Decimal::ZERO;

/// Hours of the venue's funding schedule in the reference timezone.
const SETTLEMENT_HOURS: &[i64] = &[3, 11, 19];

pub struct MexcFeed {
    http: reqwest::Client,
    futures_url: String,
    spot_url: String,
    fees: FeeSchedule,
}

impl MexcFeed {
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
}

#[async_trait]
impl MarketFeed for MexcFeed {
    fn name(&self) -> &'static str {
        "Mexc"
    }

    fn fees(&self) -> FeeSchedule {
        self.fees
    }

    async fn catalog(&self, market: MarketKind) -> Result<Vec<CatalogEntry>> {
        match market {
            MarketKind::Futures => {
                let url = format!("{}/api/v1/contract/detail", self.futures_url);
                let response: ContractEnvelope<ContractDetail> =
                    get_json(&self.http, &url).await?;
                Ok(response
                    .data
                    .into_iter()
                    .map(|entry| CatalogEntry::new(entry.symbol, entry.base_coin, entry.quote_coin))
                    .collect())
            }
            MarketKind::Spot => {
                let url = format!("{}/api/v3/exchangeInfo", self.spot_url);
                let response: ExchangeInfo = get_json(&self.http, &url).await?;
                Ok(response
                    .symbols
                    .into_iter()
                    .filter(|entry| entry.is_spot_trading_allowed)
                    .map(|entry| {
                        CatalogEntry::new(entry.symbol, entry.base_asset, entry.quote_asset)
                    })
                    .collect())
            }
        }
    }

    async fn tickers(&self, market: MarketKind) -> Result<Vec<TickerRecord>> {
        match market {
            MarketKind::Futures => {
                let url = format!("{}/api/v1/contract/ticker", self.futures_url);
                let response: ContractEnvelope<ContractTicker> =
                    get_json(&self.http, &url).await?;
                Ok(response
                    .data
                    .into_iter()
                    .map(|ticker| TickerRecord {
                        venue_symbol: ticker.symbol,
                        ask: ticker.ask1,
                        bid: ticker.bid1,
                        funding_rate: ticker.funding_rate,
                        next_settlement_ms: None,
                    })
                    .collect())
            }
            MarketKind::Spot => {
                let url = format!("{}/api/v3/ticker/bookTicker", self.spot_url);
                let response: Vec<BookTicker> = get_json(&self.http, &url).await?;
                Ok(response
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

    async fn settlement_time(&self, venue_symbol: &str) -> Result<i64> {
        let url = format!(
            "{}/api/v1/contract/funding_rate/{}",
            self.futures_url, venue_symbol
        );
        let response: FundingRateEnvelope = get_json(&self.http, &url).await?;
        response
            .data
            .and_then(|data| data.next_settle_time)
            .ok_or_else(|| {
                Error::Payload(format!("Mexc funding_rate/{venue_symbol}: no nextSettleTime"))
            })
    }

    fn fallback_settlement(&self, now_epoch_ms: i64) -> Option<i64> {
        Some(next_scheduled(now_epoch_ms, SETTLEMENT_HOURS))
    }
}

#[derive(Debug, Deserialize)]
struct ContractEnvelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractDetail {
    symbol: String,
    base_coin: String,
    quote_coin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractTicker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    ask1: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    bid1: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    funding_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SpotSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotSymbol {
    symbol: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    is_spot_trading_allowed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookTicker {
    symbol: String,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    ask_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_decimal_opt")]
    bid_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct FundingRateEnvelope {
    data: Option<FundingRateData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingRateData {
    #[serde(default, deserialize_with = "de_epoch_ms_opt")]
    next_settle_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_contract_ticker_with_numeric_fields() {
        let payload = json!({
            "data": [{
                "symbol": "BTC_USDT",
                "ask1": 65000.1,
                "bid1": 64999.9,
                "fundingRate": 0.0001
            }]
        });

        let envelope: ContractEnvelope<ContractTicker> =
            serde_json::from_value(payload).unwrap();
        let ticker = &envelope.data[0];
        assert_eq!(ticker.symbol, "BTC_USDT");
        assert_eq!(ticker.funding_rate, Some(dec!(0.0001)));
    }

    #[test]
    fn spot_catalog_keeps_only_tradable_symbols() {
        let payload = json!({
            "symbols": [
                {"symbol": "BTCUSDT", "baseAsset": "BTC", "quoteAsset": "USDT", "isSpotTradingAllowed": true},
                {"symbol": "OLDUSDT", "baseAsset": "OLD", "quoteAsset": "USDT", "isSpotTradingAllowed": false}
            ]
        });

        let info: ExchangeInfo = serde_json::from_value(payload).unwrap();
        let tradable: Vec<_> = info
            .symbols
            .into_iter()
            .filter(|entry| entry.is_spot_trading_allowed)
            .collect();
        assert_eq!(tradable.len(), 1);
        assert_eq!(tradable[0].symbol, "BTCUSDT");
    }

    #[test]
    fn parses_next_settle_time() {
        let payload = json!({"data": {"nextSettleTime": 1704067200000i64}});
        let envelope: FundingRateEnvelope = serde_json::from_value(payload).unwrap();
        assert_eq!(
            envelope.data.and_then(|d| d.next_settle_time),
            Some(1_704_067_200_000)
        );
    }

    #[test]
    fn missing_settle_time_is_none() {
        let payload = json!({"data": {}});
        let envelope: FundingRateEnvelope = serde_json::from_value(payload).unwrap();
        assert_eq!(envelope.data.and_then(|d| d.next_settle_time), None);
    }
}
