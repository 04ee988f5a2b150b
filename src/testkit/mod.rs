//! Test fixtures: scripted feeds and snapshot builders.
//!
//! Available to integration tests through the `testkit` feature.

mod feed;
mod snapshot;

pub use feed::{CallCounters, ScriptedFeed};
pub use snapshot::SnapshotBuilder;
