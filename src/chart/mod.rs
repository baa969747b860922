//! Chart rendering for averaged cumulative series.
//!
//! Turns timeline data into standalone SVG line charts. Rendering takes
//! explicit configuration objects; nothing here keeps process-wide state.

pub mod generator;

// Re-export main types and functions
pub use generator::{generate_chart, ChartConfig, ChartSeries, LineStyle};
