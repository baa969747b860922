//! Cumulative event timelines across independent runs.
//!
//! A timeline aggregator takes discrete event timestamps (round numbers)
//! and computes how many events happened *by* each round in a fixed range,
//! turning per-round data into total-progress data. It holds one histogram
//! per independent run and can average the cumulative views together.

use crate::utils::error::TimelineError;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Identifier of one independent experiment run
pub type RunId = usize;

/// Aggregates per-round event counts into cumulative, per-run and
/// averaged views over a half-open round range `[min, max)`.
///
/// Runs are discovered lazily: the first event recorded for a run id
/// creates its histogram. The cumulative view is memoized and rebuilt in
/// full after any mutation; averaging always divides by the number of
/// distinct runs seen so far.
#[derive(Debug, Clone)]
pub struct TimelineAggregator {
    /// Lowest valid round; inclusive
    min_round: u64,

    /// Highest valid round; exclusive
    max_round: u64,

    /// Divisor applied only when a normalized average is requested
    normalization_factor: f64,

    /// Raw per-round weight sums, one histogram per run
    runs: BTreeMap<RunId, HashMap<u64, f64>>,

    /// Memoized dense cumulative series per run; None after any mutation
    cumulative_cache: Option<BTreeMap<RunId, Vec<f64>>>,
}

impl TimelineAggregator {
    /// Create an aggregator over the half-open round range `[min, max)`
    ///
    /// **Public** - constructor
    ///
    /// # Errors
    /// * `TimelineError::EmptyRange` - `max_round <= min_round`
    pub fn new(min_round: u64, max_round: u64) -> Result<Self, TimelineError> {
        Self::with_normalization(min_round, max_round, 1.0)
    }

    /// Create an aggregator with a normalization divisor (e.g. peer or
    /// wallet count, for rate/fraction reporting)
    ///
    /// **Public** - constructor
    ///
    /// # Errors
    /// * `TimelineError::EmptyRange` - `max_round <= min_round`
    /// * `TimelineError::InvalidNormalization` - non-positive factor
    pub fn with_normalization(
        min_round: u64,
        max_round: u64,
        normalization_factor: f64,
    ) -> Result<Self, TimelineError> {
        if max_round <= min_round {
            return Err(TimelineError::EmptyRange {
                min: min_round,
                max: max_round,
            });
        }
        if normalization_factor <= 0.0 {
            return Err(TimelineError::InvalidNormalization(normalization_factor));
        }

        Ok(Self {
            min_round,
            max_round,
            normalization_factor,
            runs: BTreeMap::new(),
            cumulative_cache: None,
        })
    }

    /// Record one event at `round` for `run`
    ///
    /// **Public** - main entry point for event ingestion
    ///
    /// # Errors
    /// * `TimelineError::RoundOutOfRange` - round outside `[min, max)`
    pub fn record_event(&mut self, round: u64, run: RunId) -> Result<(), TimelineError> {
        self.record_weighted(round, run, 1.0)
    }

    /// Record a weighted event at `round` for `run`
    ///
    /// **Public** - weighted variant for batches and reversals
    ///
    /// The weight may be fractional or negative; a negative weight
    /// reverses a previously recorded event. A weight of exactly zero is
    /// accepted and still invalidates the cumulative cache.
    ///
    /// # Errors
    /// * `TimelineError::RoundOutOfRange` - round outside `[min, max)`
    pub fn record_weighted(
        &mut self,
        round: u64,
        run: RunId,
        weight: f64,
    ) -> Result<(), TimelineError> {
        if round < self.min_round || round >= self.max_round {
            return Err(TimelineError::RoundOutOfRange {
                round,
                min: self.min_round,
                max: self.max_round,
            });
        }

        self.cumulative_cache = None;
        *self
            .runs
            .entry(run)
            .or_default()
            .entry(round)
            .or_insert(0.0) += weight;

        Ok(())
    }

    /// Cumulative event counts per run
    ///
    /// **Public** - the per-run derived view
    ///
    /// For each known run, maps index `i` to the running sum of all
    /// weights recorded at rounds `<= min_round + i`. Memoized until the
    /// next mutation.
    pub fn cumulative_by_run(&mut self) -> &BTreeMap<RunId, Vec<f64>> {
        let cache = match self.cumulative_cache.take() {
            Some(cache) => cache,
            None => self.build_cumulative(),
        };
        self.cumulative_cache.insert(cache)
    }

    /// Average the cumulative views across all distinct runs seen
    ///
    /// **Public** - the averaged derived view
    ///
    /// Index `i` of the result corresponds to round `min_round + i`.
    /// With `normalize`, each point is additionally divided by the
    /// configured normalization factor.
    ///
    /// # Errors
    /// * `TimelineError::NoRuns` - no events recorded for any run
    pub fn average_cumulative(&mut self, normalize: bool) -> Result<Vec<f64>, TimelineError> {
        if self.runs.is_empty() {
            return Err(TimelineError::NoRuns);
        }

        let divisor =
            self.runs.len() as f64 * if normalize { self.normalization_factor } else { 1.0 };
        let mut average = vec![0.0; self.round_count() as usize];

        for series in self.cumulative_by_run().values() {
            for (slot, value) in average.iter_mut().zip(series) {
                *slot += value;
            }
        }
        for slot in &mut average {
            *slot /= divisor;
        }

        Ok(average)
    }

    /// Value of the averaged cumulative series at the last round
    ///
    /// **Public** - the end-of-run readout used by summary metrics
    ///
    /// # Errors
    /// * `TimelineError::NoRuns` - no events recorded for any run
    pub fn final_average(&mut self, normalize: bool) -> Result<f64, TimelineError> {
        let average = self.average_cumulative(normalize)?;
        Ok(average.last().copied().unwrap_or(0.0))
    }

    /// Lowest valid round (inclusive)
    pub fn min_round(&self) -> u64 {
        self.min_round
    }

    /// Highest valid round (exclusive)
    pub fn max_round(&self) -> u64 {
        self.max_round
    }

    /// Number of rounds in the configured range
    pub fn round_count(&self) -> u64 {
        self.max_round - self.min_round
    }

    /// Number of distinct runs seen so far
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// The valid rounds, in order
    pub fn rounds(&self) -> std::ops::Range<u64> {
        self.min_round..self.max_round
    }

    /// Recompute the dense cumulative series for every run
    ///
    /// **Private** - full prefix-sum rebuild; no incremental patching
    fn build_cumulative(&self) -> BTreeMap<RunId, Vec<f64>> {
        debug!(
            "Rebuilding cumulative timelines for {} runs over {} rounds",
            self.runs.len(),
            self.round_count()
        );

        let mut cumulative = BTreeMap::new();
        for (run, histogram) in &self.runs {
            let mut series = Vec::with_capacity(self.round_count() as usize);
            let mut so_far = 0.0;
            for round in self.min_round..self.max_round {
                so_far += histogram.get(&round).copied().unwrap_or(0.0);
                series.push(so_far);
            }
            cumulative.insert(*run, series);
        }
        cumulative
    }
}
