//! Aggregation of simulation log records into time-series statistics.
//!
//! This module transforms decoded log records into:
//! - Cumulative per-run and averaged event timelines
//! - Corruption/loss event streams via ledger replay
//! - End-of-run summary metrics and the output report

pub mod metrics;
pub mod replay;
pub mod timeline;

// Re-export main types and functions
pub use metrics::{calculate_summary, to_report};
pub use replay::{analyze_log, replay_test, LedgerTimelines};
pub use timeline::{RunId, TimelineAggregator};
