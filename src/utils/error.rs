//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur during log parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read log file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid log format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur inside a timeline aggregator
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Empty round range: min {min} must be below max {max}")]
    EmptyRange { min: u64, max: u64 },

    #[error("Round {round} outside configured range [{min}, {max})")]
    RoundOutOfRange { round: u64, min: u64, max: u64 },

    #[error("Normalization factor must be positive, got {0}")]
    InvalidNormalization(f64),

    #[error("No runs recorded; average is undefined")]
    NoRuns,
}

/// Errors that can occur during corruption replay
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Log contains no test runs")]
    NoTests,

    #[error("Validation references unknown sequence number {seq_num}")]
    UnknownSequence { seq_num: u64 },

    #[error("No transaction recorded for sequence number {seq_num}")]
    MissingProposal { seq_num: u64 },

    #[error("Corruption records present but no byzantine round in log")]
    MissingByzantineRound,

    #[error("Timeline rejected replay event: {0}")]
    Timeline(#[from] TimelineError),
}

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No series data to render")]
    EmptySeries,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
