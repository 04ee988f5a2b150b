//! Settlement-time conventions shared by every venue.
//!
//! All settlement timestamps are epoch milliseconds shifted by one reference
//! timezone offset (+3 hours), applied uniformly so times from different
//! venues compare against each other. A missing settlement time is a valid
//! state: pairings against such a symbol bypass the alignment check.

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Reference timezone offset applied to every settlement timestamp.
pub const REFERENCE_TZ_OFFSET_MS: i64 = 3 * MS_PER_HOUR;

/// Whether a (main, hedge) pairing is settlement-aligned.
///
/// The hedge leg must settle no later than the main leg settles after it;
/// concretely, the pairing survives unless the main leg's settlement is
/// strictly later than the hedge leg's. Missing timestamps on either side
/// count as aligned.
pub fn aligned(main: Option<i64>, hedge: Option<i64>) -> bool {
    match (main, hedge) {
        (Some(main), Some(hedge)) => main <= hedge,
        _ => true,
    }
}

/// Next settlement instant from a fixed daily schedule of hours in the
/// reference timezone, as a shifted timestamp (see module docs).
///
/// `hours` must be sorted ascending. An instant exactly on a scheduled hour
/// rolls to the next one.
pub fn next_scheduled(now_epoch_ms: i64, hours: &[i64]) -> i64 {
    let shifted = now_epoch_ms + REFERENCE_TZ_OFFSET_MS;
    let time_of_day = shifted.rem_euclid(MS_PER_DAY);
    let midnight = shifted - time_of_day;

    for &hour in hours {
        let target = hour * MS_PER_HOUR;
        if target > time_of_day {
            return midnight + target;
        }
    }
    // Past the last slot for today; first slot tomorrow.
    midnight + MS_PER_DAY + hours[0] * MS_PER_HOUR
}

/// Floor a timestamp to 10-second granularity, matching venues that quote
/// settlement countdowns coarsely.
pub fn floor_to_ten_seconds(epoch_ms: i64) -> i64 {
    epoch_ms.div_euclid(10_000) * 10_000
}
