//! Configuration and constants for the CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Fraction of a transaction's validators that must confirm it before it
// counts as completed. Policy constant, not a structural requirement.
pub const QUORUM_FRACTION: f64 = 2.0 / 3.0;

// Default chart geometry
pub const DEFAULT_CHART_WIDTH: usize = 900;
pub const DEFAULT_CHART_HEIGHT: usize = 540;
