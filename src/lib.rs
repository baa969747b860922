//! Simlog Studio
//!
//! Timeline aggregation and corruption analysis for distributed-ledger
//! simulation logs.
//!
//! This crate provides the core implementation for the `simlog` CLI tool:
//! it decodes experiment-harness logs, replays each test run's
//! transaction, validation and corruption records into cumulative event
//! timelines, and writes averaged series, summary metrics, charts and a
//! versioned JSON report.

pub mod aggregator;
pub mod chart;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
