//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// Top-level analysis report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file the report was computed from
    pub source_log: String,

    /// Number of independent test runs averaged together
    pub run_count: usize,

    /// Rounds per test run
    pub round_count: u64,

    /// Peers in the network (if the log recorded it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_count: Option<u64>,

    /// Wallets in the network (if the log recorded it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_count: Option<u64>,

    /// End-of-run summary statistics
    pub summary: SummaryStats,

    /// Averaged cumulative series, one per metric
    pub series: Vec<SeriesData>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// End-of-run summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Transactions submitted (averaged across runs)
    pub transactions_started: f64,

    /// Transactions confirmed by a validator quorum
    pub transactions_confirmed: f64,

    /// Confirmed / started
    pub confirmation_rate: f64,

    /// Confirmed transactions per simulated round
    pub throughput_per_round: f64,

    /// Total messages exchanged
    pub messages_sent: f64,

    /// Messages per peer (0 when the log has no peer count)
    pub messages_per_peer: f64,

    /// Wallets with inconsistent custody history at the end of the run
    pub corrupt_wallets: f64,

    /// Corrupt wallets as a fraction of all wallets
    /// (0 when the log has no wallet count)
    pub corrupt_wallet_fraction: f64,

    /// Coins without a legitimate owner at the end of the run
    pub coins_lost: f64,
}

/// One averaged cumulative series
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    /// Metric name (e.g. "transactions_confirmed")
    pub metric: String,

    /// Whether values were divided by the metric's normalization factor
    pub normalized: bool,

    /// Ordered round -> value points covering the full round range
    pub points: Vec<SeriesPoint>,
}

/// A single point of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub round: u64,
    pub value: f64,
}
