//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads and decodes the simulation log
//! 2. Replays every test run into timeline aggregators
//! 3. Computes summary metrics and assembles the report
//! 4. Renders charts (if requested)
//! 5. Writes output files

use crate::aggregator::timeline::TimelineAggregator;
use crate::aggregator::{analyze_log, to_report, LedgerTimelines};
use crate::chart::{generate_chart, ChartConfig, ChartSeries, LineStyle};
use crate::output::{write_report, write_series_csv, write_svg};
use crate::parser::read_log;
use crate::parser::schema::SeriesPoint;
use crate::utils::error::TimelineError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to the simulation log JSON
    pub input: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Directory for SVG charts (optional)
    pub chart_dir: Option<PathBuf>,

    /// Output path for a CSV export of the series (optional)
    pub output_csv: Option<PathBuf>,

    /// Normalize charts by peer/wallet counts
    pub normalize: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            chart_dir: None,
            output_csv: None,
            normalize: false,
            print_summary: false,
        }
    }
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Errors
/// Err with message when the input path is unusable
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input log path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input log not found: {}", args.input.display());
    }

    if args.input.is_dir() {
        anyhow::bail!("Input log is a directory: {}", args.input.display());
    }

    if args.input.extension().map_or(true, |ext| ext != "json") {
        debug!(
            "Input does not have a .json extension: {}",
            args.input.display()
        );
    }

    Ok(())
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Log parsing errors
/// * Replay errors (corrupted or mismatched logs)
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Analyzing simulation log: {}", args.input.display());

    // Step 1: Decode the log
    info!("Step 1/5: Parsing simulation log...");
    let log = read_log(&args.input).context("Failed to parse simulation log")?;

    debug!("Decoded {} test runs", log.tests.len());

    // Step 2: Replay every test run
    info!("Step 2/5: Replaying {} test runs...", log.tests.len());
    let mut timelines = analyze_log(&log).context("Failed to replay simulation log")?;

    // Step 3: Summary metrics and report assembly
    info!("Step 3/5: Computing summary metrics...");
    let source_log = args.input.display().to_string();
    let report =
        to_report(&mut timelines, &source_log).context("Failed to assemble analysis report")?;

    info!("Run summary: {}", report.summary.overview());

    // Step 4: Render charts (if requested)
    let charts = if args.chart_dir.is_some() {
        info!("Step 4/5: Rendering charts...");
        render_charts(&mut timelines, args.normalize).context("Failed to render charts")?
    } else {
        info!("Step 4/5: Skipping chart rendering (not requested)");
        Vec::new()
    };

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");

    write_report(&report, &args.output_json).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output_json.display());

    if let Some(csv_path) = &args.output_csv {
        write_series_csv(&report.series, csv_path).context("Failed to write series CSV")?;
        info!("✓ Series CSV written to: {}", csv_path.display());
    }

    if let Some(chart_dir) = &args.chart_dir {
        for (file_name, svg) in &charts {
            let path = chart_dir.join(file_name);
            write_svg(svg, &path).context("Failed to write chart SVG")?;
            info!("✓ Chart written to: {}", path.display());
        }
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("ANALYSIS SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Log:        {}", source_log);
        println!("Test runs:  {}", report.run_count);
        println!("Rounds:     {}", report.round_count);
        if let Some(peers) = report.peer_count {
            println!("Peers:      {}", peers);
        }
        if let Some(wallets) = report.wallet_count {
            println!("Wallets:    {}", wallets);
        }
        println!("\n{}", report.summary.overview());
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Render the standard chart set from aggregated timelines
///
/// **Private** - internal helper for execute_analyze
///
/// Returns (file name, SVG content) pairs; charts whose timelines saw no
/// events are skipped.
fn render_charts(
    timelines: &mut LedgerTimelines,
    normalize: bool,
) -> Result<Vec<(String, String)>> {
    let mut charts = Vec::new();

    // Transactions over time: started / honest started / confirmed
    let transaction_series: Vec<ChartSeries> = [
        chart_series(
            &mut timelines.tx_starts,
            "transactions started",
            LineStyle::Solid,
        )?,
        chart_series(
            &mut timelines.honest_tx_starts,
            "honest transactions started",
            LineStyle::Dashed,
        )?,
        chart_series(
            &mut timelines.tx_completes,
            "transactions confirmed",
            LineStyle::Dotted,
        )?,
    ]
    .into_iter()
    .flatten()
    .collect();

    if !transaction_series.is_empty() {
        let config = ChartConfig::new()
            .with_title("Transactions Over Time")
            .with_labels("rounds", "transactions");
        charts.push((
            "transactions.svg".to_string(),
            generate_chart(&transaction_series, Some(&config))?,
        ));
    }

    // Messages over time: all / local, optionally per peer
    let per_peer = normalize && timelines.peer_count.is_some();
    let message_series: Vec<ChartSeries> = [
        scaled_series(
            &mut timelines.all_messages,
            "messages for all transactions",
            LineStyle::Solid,
            per_peer,
            1.0,
        )?,
        scaled_series(
            &mut timelines.local_messages,
            "messages for local transactions",
            LineStyle::Dashed,
            per_peer,
            1.0,
        )?,
    ]
    .into_iter()
    .flatten()
    .collect();

    if !message_series.is_empty() {
        let y_label = if per_peer { "messages per peer" } else { "messages" };
        let config = ChartConfig::new()
            .with_title("Messages Over Time")
            .with_labels("rounds", y_label);
        charts.push((
            "messages.svg".to_string(),
            generate_chart(&message_series, Some(&config))?,
        ));
    }

    // Corrupt wallets over time, as a percentage when normalizable
    let as_percent = normalize && timelines.wallet_count.is_some();
    let wallet_series = scaled_series(
        &mut timelines.corrupt_wallets,
        "compromised wallets",
        LineStyle::Solid,
        as_percent,
        if as_percent { 100.0 } else { 1.0 },
    )?;

    if let Some(series) = wallet_series {
        let y_label = if as_percent {
            "compromised wallets, %"
        } else {
            "compromised wallets"
        };
        let config = ChartConfig::new()
            .with_title("Corrupt Wallets Over Time")
            .with_labels("rounds", y_label);
        charts.push((
            "wallets.svg".to_string(),
            generate_chart(&[series], Some(&config))?,
        ));
    }

    // Lost coins over time
    if let Some(series) = chart_series(&mut timelines.coins_lost, "coins lost", LineStyle::Solid)? {
        let config = ChartConfig::new()
            .with_title("Lost Coins Over Time")
            .with_labels("rounds", "coins");
        charts.push((
            "coins.svg".to_string(),
            generate_chart(&[series], Some(&config))?,
        ));
    }

    Ok(charts)
}

/// Build a chart series from a timeline, if it saw any events
///
/// **Private** - internal helper for render_charts
fn chart_series(
    timeline: &mut TimelineAggregator,
    label: &str,
    style: LineStyle,
) -> Result<Option<ChartSeries>, TimelineError> {
    scaled_series(timeline, label, style, false, 1.0)
}

/// chart_series with normalization and a display scale factor
///
/// **Private** - internal helper for render_charts
fn scaled_series(
    timeline: &mut TimelineAggregator,
    label: &str,
    style: LineStyle,
    normalize: bool,
    scale: f64,
) -> Result<Option<ChartSeries>, TimelineError> {
    if timeline.run_count() == 0 {
        debug!("Skipping chart series '{}': no events recorded", label);
        return Ok(None);
    }

    let values = timeline.average_cumulative(normalize)?;
    let points = timeline
        .rounds()
        .zip(values)
        .map(|(round, value)| SeriesPoint {
            round,
            value: value * scale,
        })
        .collect();

    Ok(Some(ChartSeries::new(label, style, points)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_empty_input() {
        let args = AnalyzeArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = AnalyzeArgs {
            input: PathBuf::from("/definitely/not/here.json"),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            input: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = AnalyzeArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_render_charts_skips_empty_timelines() {
        let mut timelines = LedgerTimelines::new(10, None, None).unwrap();
        let charts = render_charts(&mut timelines, false).unwrap();
        assert!(charts.is_empty());
    }

    #[test]
    fn test_render_charts_with_activity() {
        let mut timelines = LedgerTimelines::new(10, Some(4), Some(8)).unwrap();
        timelines.tx_starts.record_event(1, 0).unwrap();
        timelines.tx_completes.record_event(2, 0).unwrap();
        timelines.all_messages.record_weighted(1, 0, 6.0).unwrap();

        let charts = render_charts(&mut timelines, false).unwrap();
        let names: Vec<&str> = charts.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, vec!["transactions.svg", "messages.svg"]);
        assert!(charts[0].1.contains("transactions started"));
    }

    #[test]
    fn test_percent_scaling_for_wallet_chart() {
        let mut timelines = LedgerTimelines::new(4, None, Some(10)).unwrap();
        timelines.corrupt_wallets.record_event(0, 0).unwrap();

        let charts = render_charts(&mut timelines, true).unwrap();
        let (name, svg) = &charts[0];
        assert_eq!(name, "wallets.svg");
        // 1 of 10 wallets -> 10%
        assert!(svg.contains("compromised wallets, %"));
    }
}
