//! History adapter traits.
//!
//! The feature builder reads its past window through one of two
//! sources: a recorded scenario ([`ScenarioSource`], offline training)
//! or a rolling simulation buffer ([`HistorySource`], online planning).
//! Both are implemented outside the feature crate so that the transform
//! pipeline never depends on how history is stored.

use crate::error::SamplingError;
use crate::id::TimePoint;
use crate::state::{DetectionsTracks, EgoState, Observation};

/// Read access to a recorded scenario at its initial iteration.
///
/// All `past_*` methods return exactly `num_samples` items ordered
/// oldest-first, excluding the present sample. Implementations sample
/// with [`sample_indices_with_time_horizon`](crate::sample_indices_with_time_horizon).
pub trait ScenarioSource {
    /// Ego state at the scenario's initial iteration (the anchor).
    fn initial_ego_state(&self) -> &EgoState;

    /// Detections at the scenario's initial iteration.
    fn initial_tracked_objects(&self) -> &DetectionsTracks;

    /// Timestamp of the scenario's initial iteration.
    fn start_time(&self) -> TimePoint;

    /// Past ego states relative to `iteration`.
    fn past_ego_states(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<EgoState>, SamplingError>;

    /// Past timestamps relative to `iteration`.
    fn past_timestamps(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<TimePoint>, SamplingError>;

    /// Past detections relative to `iteration`.
    fn past_tracked_objects(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<DetectionsTracks>, SamplingError>;
}

/// Read access to a rolling simulation history.
///
/// Index 0 is the oldest stored sample; `len() - 1` is the present.
pub trait HistorySource {
    /// Number of stored samples.
    fn len(&self) -> usize;

    /// Whether no samples are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ego state at `index`, oldest-first.
    fn ego_state(&self, index: usize) -> Option<&EgoState>;

    /// Observation at `index`, oldest-first.
    fn observation(&self, index: usize) -> Option<&Observation>;

    /// Seconds between consecutive samples, if known.
    fn sample_interval(&self) -> Option<f64>;

    /// Seconds of history the buffer can span.
    fn duration(&self) -> f64;

    /// The most recent ego state and observation.
    fn current_state(&self) -> Option<(&EgoState, &Observation)> {
        let last = self.len().checked_sub(1)?;
        Some((self.ego_state(last)?, self.observation(last)?))
    }
}
