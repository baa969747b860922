//! CSV export of averaged series.
//!
//! One row per round, one column per metric, for spreadsheet tools and
//! external plotting pipelines.

use crate::parser::schema::SeriesData;
use crate::utils::error::OutputError;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write averaged series to a CSV file
///
/// **Public** - main entry point for CSV output
///
/// Columns are `round` followed by one column per series, named after the
/// metric (with a `_normalized` suffix where applicable). Rows cover the
/// union of rounds across series; a series without a value for a round
/// leaves the cell empty.
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_series_csv(
    series: &[SeriesData],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing series CSV to: {}", output_path.display());
    if series.is_empty() {
        warn!("No series to export; writing header only");
    }

    super::json::validate_output_path(output_path)?;
    super::json::create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    let mut header = vec!["round".to_string()];
    header.extend(series.iter().map(column_name));
    writeln!(writer, "{}", header.join(",")).map_err(OutputError::WriteFailed)?;

    let rounds = round_range(series);
    for round in rounds {
        let mut row = vec![round.to_string()];
        for entry in series {
            let cell = entry
                .points
                .iter()
                .find(|p| p.round == round)
                .map(|p| p.value.to_string())
                .unwrap_or_default();
            row.push(cell);
        }
        writeln!(writer, "{}", row.join(",")).map_err(OutputError::WriteFailed)?;
    }

    writer.flush().map_err(OutputError::WriteFailed)?;
    Ok(())
}

/// CSV column name for a series
///
/// **Private** - internal naming
fn column_name(series: &SeriesData) -> String {
    if series.normalized && !series.metric.ends_with("_fraction") && !series.metric.contains("per_")
    {
        format!("{}_normalized", series.metric)
    } else {
        series.metric.clone()
    }
}

/// Ordered union of rounds across all series
///
/// **Private** - internal utility
fn round_range(series: &[SeriesData]) -> Vec<u64> {
    let mut rounds: Vec<u64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.round))
        .collect();
    rounds.sort_unstable();
    rounds.dedup();
    rounds
}
