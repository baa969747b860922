//! Log parsing and schema definitions.
//!
//! This module handles:
//! - Parsing raw simulation log JSON from the experiment harness
//! - Validating log structure
//! - Defining the output report schema

pub mod log;
pub mod schema;

// Re-export main types
pub use self::log::{
    parse_log, parse_log_value, read_log, CoinId, MessageRecord, MessageScope, RoundInfo,
    SimulationLog, TestRecord, TransactionRecord, ValidationRecord, WalletId,
};
pub use schema::{AnalysisReport, SeriesData, SeriesPoint, SummaryStats};
