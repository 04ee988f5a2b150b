//! Orchestration of one scan: configure, load every venue, match, render.

use crate::config::Config;
use crate::engine;
use crate::error::Result;
use crate::exchange::{default_adapters, load_all, snapshots, ExchangeSnapshot};
use crate::report;

use super::{output, ConfigPathArg, ScanArgs};

fn configure(args: &ScanArgs) -> Result<Config> {
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".into();
    }
    config.init_logging();
    Ok(config)
}

fn note_degraded(snapshots: &[&ExchangeSnapshot]) {
    for snapshot in snapshots {
        if snapshot.stats.degraded {
            output::error(&format!("{} failed to load, scanning without it", snapshot.name));
        }
    }
}

pub async fn perp_perp(args: &ScanArgs) -> Result<()> {
    let mut config = configure(args)?;
    if let Some(min_rate) = args.min_rate {
        config.scan.perp_perp_min_rate = min_rate;
    }

    let mut adapters = default_adapters(&config)?;
    load_all(&mut adapters).await;
    let snaps = snapshots(&adapters);
    note_degraded(&snaps);

    let scan = engine::perp_perp::scan(&snaps, &config.scan);
    let actionable = scan.ranked.iter().filter(|arb| arb.actionable()).count();

    let mut ranked = scan.ranked;
    let mut by_rate = scan.by_rate;
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
        by_rate.truncate(limit);
    }

    output::section("Perpetual pairings by expected return");
    if ranked.is_empty() {
        output::note("no pairings above the thresholds");
    } else {
        println!("{}", report::perp_perp_table(&ranked));
    }

    output::section("Perpetual pairings by funding magnitude");
    if by_rate.is_empty() {
        output::note("no pairings above the thresholds");
    } else {
        println!("{}", report::perp_perp_table(&by_rate));
    }

    let actionable = if actionable > 0 {
        output::positive(actionable)
    } else {
        output::negative(actionable)
    };
    output::field("actionable", actionable);
    Ok(())
}

pub async fn perp_spot(args: &ScanArgs) -> Result<()> {
    let mut config = configure(args)?;
    if let Some(min_rate) = args.min_rate {
        config.scan.min_rate = min_rate;
    }

    let mut adapters = default_adapters(&config)?;
    load_all(&mut adapters).await;
    let snaps = snapshots(&adapters);
    note_degraded(&snaps);

    let mut rows = engine::perp_spot::scan(&snaps, &config.scan);
    let total = rows.len();
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    output::section("Futures-spot pairings by funding rate");
    if rows.is_empty() {
        output::note("no pairings above the thresholds");
    } else {
        println!("{}", report::perp_spot_table(&rows));
    }
    output::field("pairings", output::highlight(total));
    Ok(())
}

pub async fn venues(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let adapters = default_adapters(&config)?;

    output::section("Venues");
    for adapter in &adapters {
        let fees = adapter.fees();
        output::field(
            adapter.name(),
            format!("taker {}  maker {}", fees.taker, fees.maker),
        );
    }
    Ok(())
}
