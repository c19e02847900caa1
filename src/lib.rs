//! Daily drought severity classification for a fixed geographic point.
//!
//! Raw series → derived features → per-day point score → temporal context
//! pass → basic and advanced category per day.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod inference;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod verify;
