//! Perpetual-perpetual matching over hand-built snapshots.

use carryscan::config::ScanConfig;
use carryscan::domain::Side;
use carryscan::engine::perp_perp;
use carryscan::testkit::SnapshotBuilder;
use rust_decimal_macros::dec;

#[test]
fn two_venue_scenario_scores_and_ranks() {
    // Venue A funds +0.3 %, venue B -0.1 %; both settle together.
    let a = SnapshotBuilder::new("Bybit")
        .fees(dec!(0.0011), dec!(0.0004))
        .perp("BTC/USDT", dec!(65000), dec!(64990), dec!(0.003))
        .settles("BTC/USDT", 1_704_078_000_000)
        .build();
    let b = SnapshotBuilder::new("Mexc")
        .fees(dec!(0.00036), dec!(0))
        .perp("BTC/USDT", dec!(65010), dec!(65000), dec!(-0.001))
        .settles("BTC/USDT", 1_704_078_000_000)
        .build();

    let report = perp_perp::scan(&[&a, &b], &ScanConfig::default());
    // Only A's rate passes the main cut, so one ordering appears.
    assert_eq!(report.ranked.len(), 1);

    let arb = &report.ranked[0];
    assert_eq!(arb.main_venue, "Bybit");
    assert_eq!(arb.main_side, Side::Short);
    assert_eq!(arb.hedge_venue, "Mexc");
    assert_eq!(arb.hedge_side, Side::Long);
    assert_eq!(arb.main_rate_pct, dec!(0.3));
    assert_eq!(arb.hedge_rate_pct, dec!(-0.1));

    // Short the main bid, long the hedge ask.
    assert_eq!(arb.main_price, dec!(64990));
    assert_eq!(arb.hedge_price, dec!(65010));

    let spread = dec!(100) - dec!(65010) / dec!(64990) * dec!(100);
    assert_eq!(arb.spread_pct, spread);
    // 2 * 0.11 % + 2 * 0.036 %.
    assert_eq!(arb.fee_pct, dec!(0.292));

    // Opposite signs: both legs collect, 0.3 + 0.1 = 0.4 %.
    assert_eq!(arb.expected_return_pct, dec!(0.4) + spread - dec!(0.292));
    assert!(arb.actionable());
}

#[test]
fn mirrored_orderings_emit_when_both_venues_lead() {
    let a = SnapshotBuilder::new("Bybit")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), dec!(0.003))
        .build();
    let b = SnapshotBuilder::new("Mexc")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), dec!(-0.002))
        .build();

    let report = perp_perp::scan(&[&a, &b], &ScanConfig::default());
    assert_eq!(report.ranked.len(), 2);

    let mains: Vec<_> = report.ranked.iter().map(|arb| arb.main_venue).collect();
    assert!(mains.contains(&"Bybit"));
    assert!(mains.contains(&"Mexc"));

    // Directions mirror: each main leg is scored from its own rate sign.
    for arb in &report.ranked {
        match arb.main_venue {
            "Bybit" => assert_eq!(arb.main_side, Side::Short),
            "Mexc" => assert_eq!(arb.main_side, Side::Long),
            other => panic!("unexpected venue {other}"),
        }
    }
}

#[test]
fn settlement_alignment_matrix() {
    let make = |main_ms: Option<i64>, hedge_ms: Option<i64>| {
        let mut a = SnapshotBuilder::new("Bybit").perp(
            "BTC/USDT",
            dec!(100.1),
            dec!(99.9),
            dec!(0.003),
        );
        if let Some(ms) = main_ms {
            a = a.settles("BTC/USDT", ms);
        }
        let mut b = SnapshotBuilder::new("Mexc").perp(
            "BTC/USDT",
            dec!(100.1),
            dec!(99.9),
            dec!(0.0005),
        );
        if let Some(ms) = hedge_ms {
            b = b.settles("BTC/USDT", ms);
        }
        perp_perp::scan(&[&a.build(), &b.build()], &ScanConfig::default())
            .ranked
            .len()
    };

    // Main earlier or simultaneous: kept.
    assert_eq!(make(Some(1_000), Some(2_000)), 1);
    assert_eq!(make(Some(1_000), Some(1_000)), 1);
    // Main strictly later: discarded.
    assert_eq!(make(Some(2_000), Some(1_000)), 0);
    // Either side unknown: kept.
    assert_eq!(make(None, Some(1_000)), 1);
    assert_eq!(make(Some(2_000), None), 1);
    assert_eq!(make(None, None), 1);
}

#[test]
fn unequal_settlements_bank_only_the_main_rate() {
    let a = SnapshotBuilder::new("Bybit")
        .fees(dec!(0), dec!(0))
        .perp("BTC/USDT", dec!(100), dec!(100), dec!(0.003))
        .settles("BTC/USDT", 1_000)
        .build();
    let b = SnapshotBuilder::new("Mexc")
        .fees(dec!(0), dec!(0))
        .perp("BTC/USDT", dec!(100), dec!(100), dec!(0.002))
        .settles("BTC/USDT", 2_000)
        .build();

    let report = perp_perp::scan(&[&a, &b], &ScanConfig::default());
    let arb = report
        .ranked
        .iter()
        .find(|arb| arb.main_venue == "Bybit")
        .unwrap();
    // Identical prices and zero fees leave the funding contribution alone,
    // and the hedge's later settlement keeps its rate out of it.
    assert_eq!(arb.expected_return_pct, dec!(0.3));
}

#[test]
fn materiality_cut_is_strict_on_the_main_leg() {
    let config = ScanConfig::default();
    let at_threshold = SnapshotBuilder::new("Bybit")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), config.perp_perp_min_rate)
        .build();
    let hedge = SnapshotBuilder::new("Mexc")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), dec!(0.0001))
        .build();

    assert!(perp_perp::scan(&[&at_threshold, &hedge], &config)
        .ranked
        .is_empty());
}

#[test]
fn by_rate_view_orders_by_funding_magnitude() {
    let a = SnapshotBuilder::new("Bybit")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), dec!(0.002))
        .perp("ETH/USDT", dec!(100.1), dec!(99.9), dec!(-0.005))
        .build();
    let b = SnapshotBuilder::new("Mexc")
        .perp("BTC/USDT", dec!(100.1), dec!(99.9), dec!(0.0002))
        .perp("ETH/USDT", dec!(100.1), dec!(99.9), dec!(0.0002))
        .build();

    let report = perp_perp::scan(&[&a, &b], &ScanConfig::default());
    assert_eq!(report.by_rate.len(), 2);
    assert_eq!(report.by_rate[0].symbol.as_str(), "ETH/USDT");
    assert_eq!(report.by_rate[1].symbol.as_str(), "BTC/USDT");
    // Same rows, different order.
    assert_eq!(report.ranked.len(), report.by_rate.len());
}
