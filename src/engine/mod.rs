//! Pure matching and scoring over loaded snapshots.
//!
//! Nothing in here performs I/O or returns an error: given well-formed
//! snapshots the engine is total, and an empty snapshot simply contributes
//! no pairings.

pub mod filter;
pub mod perp_perp;
pub mod perp_spot;
pub mod scoring;
