//! Recorded scenario logs.

use std::error::Error;
use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use trackfeat_core::{
    sample_indices_with_time_horizon, DetectionsTracks, EgoState, SamplingError, ScenarioSource,
    TimePoint,
};

/// One recorded log frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogFrame {
    /// Ego state at this frame.
    pub ego_state: EgoState,
    /// Detections at this frame.
    pub detections: DetectionsTracks,
}

// ── ScenarioLogError ───────────────────────────────────────────────

/// Errors detected when constructing or deserializing a [`ScenarioLog`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScenarioLogError {
    /// `start_index` does not address a stored frame.
    StartOutOfRange {
        /// Requested start position.
        start_index: usize,
        /// Stored frames.
        frames: usize,
    },
    /// `database_interval` is not a positive finite number.
    InvalidInterval {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ScenarioLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOutOfRange {
                start_index,
                frames,
            } => write!(
                f,
                "start_index {start_index} out of range for a log of {frames} frames"
            ),
            Self::InvalidInterval { value } => {
                write!(f, "database_interval must be positive and finite, got {value}")
            }
        }
    }
}

impl Error for ScenarioLogError {}

// ── ScenarioLog ────────────────────────────────────────────────────

/// A recorded sequence of frames at a fixed database interval.
///
/// Iteration 0 of the scenario sits at `start_index` in `frames`; the
/// frames before it are the history the scenario can sample from.
/// Deserialization runs the same checks as [`ScenarioLog::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScenarioLog")]
pub struct ScenarioLog {
    frames: Vec<LogFrame>,
    database_interval: f64,
    start_index: usize,
}

/// Unchecked wire form of [`ScenarioLog`].
#[derive(Deserialize)]
struct RawScenarioLog {
    frames: Vec<LogFrame>,
    database_interval: f64,
    start_index: usize,
}

impl TryFrom<RawScenarioLog> for ScenarioLog {
    type Error = ScenarioLogError;

    fn try_from(raw: RawScenarioLog) -> Result<Self, Self::Error> {
        Self::new(raw.frames, raw.database_interval, raw.start_index)
    }
}

impl ScenarioLog {
    /// Create a log. `start_index` must address a stored frame (so
    /// `frames` is non-empty) and `database_interval` must be a positive
    /// finite number.
    pub fn new(
        frames: Vec<LogFrame>,
        database_interval: f64,
        start_index: usize,
    ) -> Result<Self, ScenarioLogError> {
        if start_index >= frames.len() {
            return Err(ScenarioLogError::StartOutOfRange {
                start_index,
                frames: frames.len(),
            });
        }
        if !database_interval.is_finite() || database_interval <= 0.0 {
            return Err(ScenarioLogError::InvalidInterval {
                value: database_interval,
            });
        }
        Ok(Self {
            frames,
            database_interval,
            start_index,
        })
    }

    /// All stored frames, oldest first.
    pub fn frames(&self) -> &[LogFrame] {
        &self.frames
    }

    /// Seconds between stored frames.
    pub fn database_interval(&self) -> f64 {
        self.database_interval
    }

    /// Position of iteration 0 in [`frames`](Self::frames).
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Number of iterations from the start frame to the end of the log.
    pub fn num_iterations(&self) -> usize {
        self.frames.len() - self.start_index
    }

    /// Frame positions for a past window at `iteration`, oldest first.
    fn past_positions(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<usize>, SamplingError> {
        let anchor = self.start_index + iteration;
        if anchor >= self.frames.len() {
            return Err(SamplingError::OutOfRange {
                requested: anchor,
                available: self.frames.len(),
            });
        }
        let offsets =
            sample_indices_with_time_horizon(num_samples, time_horizon, self.database_interval)?;
        trace!("scenario past offsets at iteration {iteration}: {offsets:?}");
        offsets
            .iter()
            .rev()
            .map(|&offset| {
                anchor
                    .checked_sub(offset)
                    .ok_or(SamplingError::OutOfRange {
                        requested: offset,
                        available: anchor,
                    })
            })
            .collect()
    }
}

impl ScenarioSource for ScenarioLog {
    fn initial_ego_state(&self) -> &EgoState {
        &self.frames[self.start_index].ego_state
    }

    fn initial_tracked_objects(&self) -> &DetectionsTracks {
        &self.frames[self.start_index].detections
    }

    fn start_time(&self) -> TimePoint {
        self.frames[self.start_index].ego_state.time_point
    }

    fn past_ego_states(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<EgoState>, SamplingError> {
        let positions = self.past_positions(iteration, num_samples, time_horizon)?;
        Ok(positions
            .into_iter()
            .map(|i| self.frames[i].ego_state.clone())
            .collect())
    }

    fn past_timestamps(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<TimePoint>, SamplingError> {
        let positions = self.past_positions(iteration, num_samples, time_horizon)?;
        Ok(positions
            .into_iter()
            .map(|i| self.frames[i].ego_state.time_point)
            .collect())
    }

    fn past_tracked_objects(
        &self,
        iteration: usize,
        num_samples: usize,
        time_horizon: f64,
    ) -> Result<Vec<DetectionsTracks>, SamplingError> {
        let positions = self.past_positions(iteration, num_samples, time_horizon)?;
        Ok(positions
            .into_iter()
            .map(|i| self.frames[i].detections.clone())
            .collect())
    }
}
