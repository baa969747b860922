//! Summary metrics and report assembly from aggregated timelines.
//!
//! End-of-run readouts (final averaged values, rates, fractions) are the
//! numbers experimenters compare across configurations; the full series
//! go into the report for plotting.

use crate::aggregator::replay::LedgerTimelines;
use crate::aggregator::timeline::TimelineAggregator;
use crate::parser::schema::{AnalysisReport, SeriesData, SeriesPoint, SummaryStats};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::TimelineError;
use log::debug;

/// Calculate end-of-run summary statistics
///
/// **Public** - main entry point for metrics calculation
///
/// Reads the final point of each averaged cumulative timeline. Metrics
/// whose timeline saw no events at all report zero rather than failing
/// the whole summary.
///
/// # Errors
/// * `TimelineError` variants surfaced by the averaged views
pub fn calculate_summary(timelines: &mut LedgerTimelines) -> Result<SummaryStats, TimelineError> {
    let round_count = timelines.round_count();
    let peer_count = timelines.peer_count;
    let wallet_count = timelines.wallet_count;

    let transactions_started = final_or_zero(&mut timelines.tx_starts, false)?;
    let transactions_confirmed = final_or_zero(&mut timelines.tx_completes, false)?;
    let messages_sent = final_or_zero(&mut timelines.all_messages, false)?;
    let corrupt_wallets = final_or_zero(&mut timelines.corrupt_wallets, false)?;
    let coins_lost = final_or_zero(&mut timelines.coins_lost, false)?;

    let confirmation_rate = if transactions_started > 0.0 {
        transactions_confirmed / transactions_started
    } else {
        0.0
    };

    let messages_per_peer = match peer_count {
        Some(_) => final_or_zero(&mut timelines.all_messages, true)?,
        None => 0.0,
    };
    let corrupt_wallet_fraction = match wallet_count {
        Some(_) => final_or_zero(&mut timelines.corrupt_wallets, true)?,
        None => 0.0,
    };

    Ok(SummaryStats {
        transactions_started,
        transactions_confirmed,
        confirmation_rate,
        throughput_per_round: transactions_confirmed / round_count as f64,
        messages_sent,
        messages_per_peer,
        corrupt_wallets,
        corrupt_wallet_fraction,
        coins_lost,
    })
}

impl SummaryStats {
    /// Whether any wallet ended the run compromised
    ///
    /// **Public** - quick corruption predicate
    pub fn has_corruption(&self) -> bool {
        self.corrupt_wallets > 0.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn overview(&self) -> String {
        format!(
            "Started: {:.1} | Confirmed: {:.1} ({:.1}%) | Messages: {:.1} | Corrupt wallets: {:.1} | Coins lost: {:.1}",
            self.transactions_started,
            self.transactions_confirmed,
            self.confirmation_rate * 100.0,
            self.messages_sent,
            self.corrupt_wallets,
            self.coins_lost
        )
    }
}

/// Convert aggregated timelines to the output report format
///
/// **Public** - used by commands to create final output
pub fn to_report(
    timelines: &mut LedgerTimelines,
    source_log: &str,
) -> Result<AnalysisReport, TimelineError> {
    use chrono::Utc;

    let summary = calculate_summary(timelines)?;

    let mut series = Vec::new();
    push_series(
        &mut series,
        &mut timelines.tx_starts,
        "transactions_started",
        false,
    )?;
    push_series(
        &mut series,
        &mut timelines.honest_tx_starts,
        "honest_transactions_started",
        false,
    )?;
    push_series(
        &mut series,
        &mut timelines.tx_completes,
        "transactions_confirmed",
        false,
    )?;
    push_series(
        &mut series,
        &mut timelines.local_messages,
        "local_messages",
        false,
    )?;
    push_series(&mut series, &mut timelines.all_messages, "all_messages", false)?;
    push_series(
        &mut series,
        &mut timelines.corrupt_wallets,
        "corrupt_wallets",
        false,
    )?;
    push_series(&mut series, &mut timelines.coins_lost, "coins_lost", false)?;

    // Normalized variants only where the log supplied the divisor.
    if timelines.peer_count.is_some() {
        push_series(
            &mut series,
            &mut timelines.all_messages,
            "messages_per_peer",
            true,
        )?;
    }
    if timelines.wallet_count.is_some() {
        push_series(
            &mut series,
            &mut timelines.corrupt_wallets,
            "corrupt_wallet_fraction",
            true,
        )?;
    }

    Ok(AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        source_log: source_log.to_string(),
        run_count: timelines.runs_replayed,
        round_count: timelines.round_count(),
        peer_count: timelines.peer_count,
        wallet_count: timelines.wallet_count,
        summary,
        series,
        generated_at: Utc::now().to_rfc3339(),
    })
}

/// Final averaged value, or zero for a timeline that saw no events
///
/// **Private** - internal helper for calculate_summary
fn final_or_zero(
    timeline: &mut TimelineAggregator,
    normalize: bool,
) -> Result<f64, TimelineError> {
    if timeline.run_count() == 0 {
        return Ok(0.0);
    }
    timeline.final_average(normalize)
}

/// Append one averaged series, skipping timelines with no events
///
/// **Private** - internal helper for to_report
fn push_series(
    out: &mut Vec<SeriesData>,
    timeline: &mut TimelineAggregator,
    metric: &str,
    normalized: bool,
) -> Result<(), TimelineError> {
    if timeline.run_count() == 0 {
        debug!("Skipping series '{}': no events recorded", metric);
        return Ok(());
    }

    let values = timeline.average_cumulative(normalized)?;
    let points = timeline
        .rounds()
        .zip(values)
        .map(|(round, value)| SeriesPoint { round, value })
        .collect();

    out.push(SeriesData {
        metric: metric.to_string(),
        normalized,
        points,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timelines_with_activity() -> LedgerTimelines {
        let mut timelines = LedgerTimelines::new(10, Some(5), Some(20)).unwrap();
        timelines.runs_replayed = 1;
        timelines.tx_starts.record_event(1, 0).unwrap();
        timelines.tx_starts.record_event(2, 0).unwrap();
        timelines.tx_completes.record_event(3, 0).unwrap();
        timelines.all_messages.record_weighted(1, 0, 10.0).unwrap();
        timelines.corrupt_wallets.record_event(4, 0).unwrap();
        timelines
    }

    #[test]
    fn test_calculate_summary() {
        let mut timelines = timelines_with_activity();
        let summary = calculate_summary(&mut timelines).unwrap();

        assert_eq!(summary.transactions_started, 2.0);
        assert_eq!(summary.transactions_confirmed, 1.0);
        assert_eq!(summary.confirmation_rate, 0.5);
        assert_eq!(summary.throughput_per_round, 0.1);
        assert_eq!(summary.messages_sent, 10.0);
        assert_eq!(summary.messages_per_peer, 2.0);
        assert_eq!(summary.corrupt_wallets, 1.0);
        assert_eq!(summary.corrupt_wallet_fraction, 0.05);
        assert!(summary.has_corruption());
    }

    #[test]
    fn test_empty_timelines_summarize_to_zero() {
        let mut timelines = LedgerTimelines::new(10, None, None).unwrap();
        let summary = calculate_summary(&mut timelines).unwrap();

        assert_eq!(summary.transactions_started, 0.0);
        assert_eq!(summary.confirmation_rate, 0.0);
        assert!(!summary.has_corruption());
    }

    #[test]
    fn test_to_report_skips_empty_series() {
        let mut timelines = timelines_with_activity();
        let report = to_report(&mut timelines, "test.json").unwrap();

        assert_eq!(report.run_count, 1);
        assert_eq!(report.round_count, 10);
        let metrics: Vec<&str> = report.series.iter().map(|s| s.metric.as_str()).collect();
        assert!(metrics.contains(&"transactions_started"));
        assert!(metrics.contains(&"messages_per_peer"));
        // Nothing honest was started and no coins were lost
        assert!(!metrics.contains(&"honest_transactions_started"));
        assert!(!metrics.contains(&"coins_lost"));
    }

    #[test]
    fn test_report_series_cover_the_round_range() {
        let mut timelines = timelines_with_activity();
        let report = to_report(&mut timelines, "test.json").unwrap();

        let series = &report.series[0];
        assert_eq!(series.points.len(), 10);
        assert_eq!(series.points[0].round, 0);
        assert_eq!(series.points[9].round, 9);
    }

    #[test]
    fn test_overview_mentions_the_key_numbers() {
        let mut timelines = timelines_with_activity();
        let summary = calculate_summary(&mut timelines).unwrap();
        let line = summary.overview();

        assert!(line.contains("Confirmed: 1.0"));
        assert!(line.contains("50.0%"));
    }
}
