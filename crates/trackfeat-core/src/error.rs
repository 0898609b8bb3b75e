//! Error types for the trackfeat pipeline.
//!
//! Split by subsystem: horizon sampling (history adapters) and feature
//! construction (packing and the transform pipeline).

use std::error::Error;
use std::fmt;

/// Errors from sampling a past window out of a log or history buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum SamplingError {
    /// Horizon or interval is non-positive, non-finite, or the horizon is
    /// shorter than one interval.
    InvalidHorizon {
        /// Requested look-back (s).
        time_horizon: f64,
        /// Spacing between stored samples (s).
        time_interval: f64,
    },
    /// The horizon holds too few intervals for the requested sample count.
    StepTooSmall {
        /// Requested number of samples.
        num_samples: usize,
        /// Intervals that fit inside the horizon.
        num_intervals: usize,
    },
    /// A sample reaches further back than the source holds.
    OutOfRange {
        /// Offset (in stored samples) that was requested.
        requested: usize,
        /// Offsets actually available.
        available: usize,
    },
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHorizon {
                time_horizon,
                time_interval,
            } => write!(
                f,
                "invalid sampling horizon {time_horizon}s at interval {time_interval}s"
            ),
            Self::StepTooSmall {
                num_samples,
                num_intervals,
            } => write!(
                f,
                "cannot take {num_samples} samples from {num_intervals} intervals"
            ),
            Self::OutOfRange {
                requested,
                available,
            } => write!(
                f,
                "sample offset {requested} exceeds the {available} available samples"
            ),
        }
    }
}

impl Error for SamplingError {}

/// Errors from building the agents feature.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureError {
    /// Ego, timestamp, and detection sequences differ in length.
    LengthMismatch {
        /// Number of ego states.
        ego: usize,
        /// Number of timestamps.
        timestamps: usize,
        /// Number of detection snapshots.
        tracked_objects: usize,
    },
    /// The window is shorter than the pipeline requires.
    TooFewFrames {
        /// Frames supplied.
        got: usize,
        /// Minimum frames required.
        min: usize,
    },
    /// The simulation history buffer does not reach back far enough.
    BufferTooShort {
        /// Buffer duration (s).
        duration: f64,
        /// Requested look-back (s).
        time_horizon: f64,
    },
    /// The history holds an observation type other than detections.
    UnexpectedObservation {
        /// Variant found in the history.
        got: &'static str,
    },
    /// The history buffer has no sample interval.
    MissingSampleInterval,
    /// The history buffer holds no samples.
    EmptyHistory,
    /// A packed tensor key expected by the pipeline is absent.
    MissingTensor {
        /// The missing key.
        key: String,
    },
    /// A tensor has the wrong shape or contents for its role.
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },
    /// More distinct track tokens than ids can represent.
    TooManyTracks {
        /// Maximum number of distinct tokens.
        limit: usize,
    },
    /// Sampling the past window failed.
    Sampling(SamplingError),
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                ego,
                timestamps,
                tracked_objects,
            } => write!(
                f,
                "expected equal trajectory lengths, got ego: {ego}, \
                 timestamps: {timestamps}, tracked objects: {tracked_objects}"
            ),
            Self::TooFewFrames { got, min } => {
                write!(f, "trajectory of length {got} needs to be at least {min}")
            }
            Self::BufferTooShort {
                duration,
                time_horizon,
            } => write!(
                f,
                "simulation history buffer duration {duration}s is too short for \
                 requested past time horizon {time_horizon}s; \
                 increase simulation_buffer_duration"
            ),
            Self::UnexpectedObservation { got } => {
                write!(f, "expected observation of type DetectionsTracks, got {got}")
            }
            Self::MissingSampleInterval => write!(f, "history buffer sample interval is unset"),
            Self::EmptyHistory => write!(f, "history buffer is empty"),
            Self::MissingTensor { key } => write!(f, "missing packed tensor '{key}'"),
            Self::ShapeMismatch { reason } => write!(f, "shape mismatch: {reason}"),
            Self::TooManyTracks { limit } => {
                write!(f, "window holds more than {limit} distinct track tokens")
            }
            Self::Sampling(e) => write!(f, "sampling: {e}"),
        }
    }
}

impl Error for FeatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sampling(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SamplingError> for FeatureError {
    fn from(e: SamplingError) -> Self {
        Self::Sampling(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_too_short_names_remedy() {
        let e = FeatureError::BufferTooShort {
            duration: 1.0,
            time_horizon: 2.0,
        };
        assert!(e.to_string().contains("simulation_buffer_duration"));
    }

    #[test]
    fn sampling_error_is_source() {
        let inner = SamplingError::OutOfRange {
            requested: 5,
            available: 3,
        };
        let e = FeatureError::from(inner.clone());
        let src = e.source().unwrap();
        assert_eq!(src.to_string(), inner.to_string());
    }
}
