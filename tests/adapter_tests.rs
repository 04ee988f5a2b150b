//! Adapter load behavior over scripted feeds.

use carryscan::domain::settlement::REFERENCE_TZ_OFFSET_MS;
use carryscan::domain::{MarketKind, Symbol};
use carryscan::exchange::feed::TickerRecord;
use carryscan::exchange::{load_all, snapshots, ExchangeAdapter};
use carryscan::testkit::ScriptedFeed;
use rust_decimal_macros::dec;

fn quoted_feed(name: &'static str) -> ScriptedFeed {
    ScriptedFeed::new(name)
        .with_instrument(MarketKind::Futures, "BTCUSDT", "BTC", "USDT")
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "BTCUSDT".into(),
                ask: Some(dec!(65010)),
                bid: Some(dec!(64990)),
                funding_rate: Some(dec!(0.003)),
                next_settlement_ms: Some(1_704_067_200_000),
            },
        )
}

#[tokio::test]
async fn load_builds_tables_and_shifts_settlements() {
    let mut adapter = ExchangeAdapter::new(Box::new(quoted_feed("Bybit")), dec!(0.0005));
    adapter.load().await;

    let snapshot = adapter.snapshot().unwrap();
    let symbol = Symbol::new("BTC/USDT");
    assert_eq!(snapshot.normalize(MarketKind::Futures, "BTCUSDT"), symbol);
    assert_eq!(snapshot.denormalize(MarketKind::Futures, &symbol), "BTCUSDT");
    assert_eq!(
        snapshot.quote(MarketKind::Futures, &symbol).unwrap().ask,
        dec!(65010)
    );
    assert_eq!(snapshot.funding_rate(&symbol), Some(dec!(0.003)));
    assert_eq!(
        snapshot.settlement(&symbol),
        Some(1_704_067_200_000 + REFERENCE_TZ_OFFSET_MS)
    );
}

#[tokio::test]
async fn second_load_does_not_touch_the_feed() {
    let feed = quoted_feed("Bybit");
    let counters = feed.counters();
    let mut adapter = ExchangeAdapter::new(Box::new(feed), dec!(0.0005));

    adapter.load().await;
    let catalogs_after_first = counters.catalog_calls();
    let tickers_after_first = counters.ticker_calls();
    assert!(catalogs_after_first > 0);

    adapter.load().await;
    assert_eq!(counters.catalog_calls(), catalogs_after_first);
    assert_eq!(counters.ticker_calls(), tickers_after_first);
}

#[tokio::test]
async fn venue_outage_degrades_to_an_empty_snapshot() {
    let mut adapter =
        ExchangeAdapter::new(Box::new(quoted_feed("Bybit").failing()), dec!(0.0005));
    adapter.load().await;

    let snapshot = adapter.snapshot().unwrap();
    assert!(snapshot.stats.degraded);
    assert!(snapshot.funding.is_empty());
    assert_eq!(snapshot.stats.futures_quotes, 0);
}

#[tokio::test]
async fn unknown_and_unquoted_instruments_are_counted_not_fatal() {
    let feed = quoted_feed("Bybit")
        // Ticker for a symbol no catalog mentioned.
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "GHOSTUSDT".into(),
                ask: Some(dec!(1)),
                bid: Some(dec!(1)),
                ..TickerRecord::default()
            },
        )
        // Known instrument with a missing bid.
        .with_instrument(MarketKind::Futures, "ETHUSDT", "ETH", "USDT")
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "ETHUSDT".into(),
                ask: Some(dec!(3000)),
                bid: None,
                ..TickerRecord::default()
            },
        )
        // Known instrument with a non-positive price.
        .with_instrument(MarketKind::Futures, "DUSTUSDT", "DUST", "USDT")
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "DUSTUSDT".into(),
                ask: Some(dec!(0)),
                bid: Some(dec!(0)),
                ..TickerRecord::default()
            },
        );

    let mut adapter = ExchangeAdapter::new(Box::new(feed), dec!(0.0005));
    adapter.load().await;

    let snapshot = adapter.snapshot().unwrap();
    assert!(!snapshot.stats.degraded);
    assert_eq!(snapshot.stats.unknown_instrument, 1);
    assert_eq!(snapshot.stats.missing_quote, 2);
    assert_eq!(snapshot.stats.futures_quotes, 1);
    assert!(snapshot
        .quote(MarketKind::Futures, &Symbol::new("ETH/USDT"))
        .is_none());
}

#[tokio::test]
async fn settlement_lookups_only_cover_material_rates() {
    let feed = ScriptedFeed::new("Mexc")
        .with_instrument(MarketKind::Futures, "BTC_USDT", "BTC", "USDT")
        .with_instrument(MarketKind::Futures, "ETH_USDT", "ETH", "USDT")
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "BTC_USDT".into(),
                ask: Some(dec!(65010)),
                bid: Some(dec!(64990)),
                funding_rate: Some(dec!(0.003)),
                next_settlement_ms: None,
            },
        )
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "ETH_USDT".into(),
                ask: Some(dec!(3001)),
                bid: Some(dec!(2999)),
                funding_rate: Some(dec!(0.0001)),
                next_settlement_ms: None,
            },
        )
        .with_settlement_time("BTC_USDT", 1_704_067_200_000)
        .with_fallback(1_704_100_000_000);
    let counters = feed.counters();

    let mut adapter = ExchangeAdapter::new(Box::new(feed), dec!(0.0005));
    adapter.load().await;

    // Only the material symbol got a per-symbol request.
    assert_eq!(counters.settlement_calls(), 1);

    let snapshot = adapter.snapshot().unwrap();
    assert_eq!(
        snapshot.settlement(&Symbol::new("BTC/USDT")),
        Some(1_704_067_200_000 + REFERENCE_TZ_OFFSET_MS)
    );
    // The immaterial symbol got the venue's shared fallback.
    assert_eq!(
        snapshot.settlement(&Symbol::new("ETH/USDT")),
        Some(1_704_100_000_000)
    );
}

#[tokio::test]
async fn failed_settlement_lookup_leaves_the_time_unknown() {
    let feed = ScriptedFeed::new("Mexc")
        .with_instrument(MarketKind::Futures, "BTC_USDT", "BTC", "USDT")
        .with_ticker(
            MarketKind::Futures,
            TickerRecord {
                venue_symbol: "BTC_USDT".into(),
                ask: Some(dec!(65010)),
                bid: Some(dec!(64990)),
                funding_rate: Some(dec!(0.003)),
                next_settlement_ms: None,
            },
        );
    // No scripted settlement time and no fallback.

    let mut adapter = ExchangeAdapter::new(Box::new(feed), dec!(0.0005));
    adapter.load().await;

    let snapshot = adapter.snapshot().unwrap();
    assert!(!snapshot.stats.degraded);
    assert_eq!(snapshot.settlement(&Symbol::new("BTC/USDT")), None);
    assert_eq!(snapshot.funding_rate(&Symbol::new("BTC/USDT")), Some(dec!(0.003)));
}

#[tokio::test]
async fn load_all_loads_every_adapter() {
    let mut adapters = vec![
        ExchangeAdapter::new(Box::new(quoted_feed("Bybit")), dec!(0.0005)),
        ExchangeAdapter::new(Box::new(quoted_feed("Mexc").failing()), dec!(0.0005)),
    ];
    load_all(&mut adapters).await;

    let snaps = snapshots(&adapters);
    assert_eq!(snaps.len(), 2);
    assert!(!snaps[0].stats.degraded);
    assert!(snaps[1].stats.degraded);
}
