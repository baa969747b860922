use pretty_assertions::assert_eq;
use simlog_studio::aggregator::TimelineAggregator;
use simlog_studio::utils::error::TimelineError;

#[test]
fn test_worked_scenario_from_two_runs() {
    // Range [0,5), run A events at t=1,1,3, run B events at t=2
    let mut timeline = TimelineAggregator::new(0, 5).unwrap();
    timeline.record_event(1, 0).unwrap();
    timeline.record_event(1, 0).unwrap();
    timeline.record_event(3, 0).unwrap();
    timeline.record_event(2, 1).unwrap();

    let cumulative = timeline.cumulative_by_run().clone();
    assert_eq!(cumulative[&0], vec![0.0, 2.0, 2.0, 3.0, 3.0]);
    assert_eq!(cumulative[&1], vec![0.0, 0.0, 1.0, 1.0, 1.0]);

    let average = timeline.average_cumulative(false).unwrap();
    assert_eq!(average, vec![0.0, 1.0, 1.5, 2.0, 2.0]);
}

#[test]
fn test_cumulative_is_non_decreasing_for_positive_weights() {
    let mut timeline = TimelineAggregator::new(0, 20).unwrap();
    for round in [3u64, 7, 7, 11, 4, 19, 0, 12] {
        timeline.record_event(round, 0).unwrap();
    }

    let series = &timeline.cumulative_by_run()[&0];
    for window in series.windows(2) {
        assert!(window[1] >= window[0]);
    }
    assert_eq!(series[19], 8.0);
}

#[test]
fn test_average_matches_mean_of_runs_at_every_round() {
    let mut timeline = TimelineAggregator::new(0, 8).unwrap();
    timeline.record_weighted(2, 0, 3.0).unwrap();
    timeline.record_weighted(5, 1, 1.5).unwrap();
    timeline.record_weighted(5, 2, 6.0).unwrap();

    let cumulative = timeline.cumulative_by_run().clone();
    let average = timeline.average_cumulative(false).unwrap();

    for (i, value) in average.iter().enumerate() {
        let mean = (cumulative[&0][i] + cumulative[&1][i] + cumulative[&2][i]) / 3.0;
        assert_eq!(*value, mean);
    }
}

#[test]
fn test_normalized_average_divides_pointwise() {
    let mut timeline = TimelineAggregator::with_normalization(0, 6, 25.0).unwrap();
    timeline.record_event(1, 0).unwrap();
    timeline.record_event(4, 0).unwrap();
    timeline.record_event(2, 1).unwrap();

    let raw = timeline.average_cumulative(false).unwrap();
    let normalized = timeline.average_cumulative(true).unwrap();

    assert_eq!(raw.len(), normalized.len());
    for (r, n) in raw.iter().zip(&normalized) {
        assert_eq!(*n, r / 25.0);
    }
}

#[test]
fn test_boundaries_are_half_open() {
    let mut timeline = TimelineAggregator::new(10, 20).unwrap();

    assert!(timeline.record_event(10, 0).is_ok());
    assert!(timeline.record_event(19, 0).is_ok());
    assert!(matches!(
        timeline.record_event(20, 0),
        Err(TimelineError::RoundOutOfRange { .. })
    ));
    assert!(matches!(
        timeline.record_event(9, 0),
        Err(TimelineError::RoundOutOfRange { .. })
    ));
}

#[test]
fn test_cache_idempotence_and_invalidation() {
    let mut timeline = TimelineAggregator::new(0, 6).unwrap();
    timeline.record_event(1, 0).unwrap();

    // Identical results without an intervening mutation
    let first = timeline.average_cumulative(false).unwrap();
    let second = timeline.average_cumulative(false).unwrap();
    assert_eq!(first, second);

    // A new event is reflected immediately, including a zero-weight one
    timeline.record_event(4, 0).unwrap();
    let third = timeline.average_cumulative(false).unwrap();
    assert_eq!(third[4], 2.0);

    timeline.record_weighted(5, 0, 0.0).unwrap();
    let fourth = timeline.average_cumulative(false).unwrap();
    assert_eq!(third, fourth);
}

#[test]
fn test_average_with_zero_runs_fails() {
    let mut timeline = TimelineAggregator::new(0, 5).unwrap();
    assert!(matches!(
        timeline.average_cumulative(false),
        Err(TimelineError::NoRuns)
    ));
    assert!(matches!(
        timeline.final_average(true),
        Err(TimelineError::NoRuns)
    ));
}

#[test]
fn test_partial_data_still_averages() {
    // Averaging divides by runs seen so far, not a configured run count
    let mut timeline = TimelineAggregator::new(0, 4).unwrap();
    timeline.record_event(0, 0).unwrap();
    assert_eq!(timeline.average_cumulative(false).unwrap()[3], 1.0);

    timeline.record_event(0, 1).unwrap();
    timeline.record_event(0, 2).unwrap();
    timeline.record_event(1, 2).unwrap();
    let average = timeline.average_cumulative(false).unwrap();
    assert_eq!(average[0], 1.0);
    assert_eq!(average[3], (1.0 + 1.0 + 2.0) / 3.0);
}
