//! Builder configuration, validation, and error types.
//!
//! [`AgentsFeatureConfig`] is the input for constructing an
//! [`AgentsFeatureBuilder`](crate::AgentsFeatureBuilder).
//! [`validate()`](AgentsFeatureConfig::validate) checks it once up front
//! so that every later failure is about the data, not the setup.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use trackfeat_core::TrackedObjectType;

use crate::builder::MIN_FRAMES;

// ── TrajectorySampling ─────────────────────────────────────────────

/// How many past poses to sample and over what look-back.
///
/// The window handed to the pipeline is `num_poses` past samples plus
/// the present one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySampling {
    /// Past samples, excluding the present. Default: 4.
    pub num_poses: usize,
    /// Look-back in seconds. Default: 1.5.
    pub time_horizon: f64,
}

impl Default for TrajectorySampling {
    fn default() -> Self {
        Self {
            num_poses: 4,
            time_horizon: 1.5,
        }
    }
}

impl TrajectorySampling {
    /// Construct a sampling.
    pub fn new(num_poses: usize, time_horizon: f64) -> Self {
        Self {
            num_poses,
            time_horizon,
        }
    }

    /// Seconds between consecutive sampled poses.
    pub fn interval_length(&self) -> f64 {
        self.time_horizon / self.num_poses as f64
    }

    /// Frames in a full window, present included.
    pub fn window_len(&self) -> usize {
        self.num_poses + 1
    }

    /// Check the sampling invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_poses == 0 {
            return Err(ConfigError::ZeroPoses);
        }
        if self.window_len() < MIN_FRAMES {
            return Err(ConfigError::TooFewPoses {
                configured: self.num_poses,
                min: MIN_FRAMES - 1,
            });
        }
        if !self.time_horizon.is_finite() || self.time_horizon <= 0.0 {
            return Err(ConfigError::InvalidHorizon {
                value: self.time_horizon,
            });
        }
        Ok(())
    }
}

// ── FrameOrder ─────────────────────────────────────────────────────

/// Order of frames along the leading axis of the output tensors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOrder {
    /// Oldest frame first, anchor last.
    #[default]
    Chronological,
    /// Anchor first, oldest last.
    MostRecentFirst,
}

// ── AgentsFeatureConfig ────────────────────────────────────────────

/// Configuration for the agents feature builder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentsFeatureConfig {
    /// Past window sampling.
    pub sampling: TrajectorySampling,
    /// Tracked-object types that become agents. Default: vehicles only.
    pub object_types: Vec<TrackedObjectType>,
    /// Output frame order. Default: chronological.
    pub output_order: FrameOrder,
}

impl Default for AgentsFeatureConfig {
    fn default() -> Self {
        Self {
            sampling: TrajectorySampling::default(),
            object_types: vec![TrackedObjectType::Vehicle],
            output_order: FrameOrder::default(),
        }
    }
}

impl AgentsFeatureConfig {
    /// Default configuration with the given sampling.
    pub fn with_sampling(sampling: TrajectorySampling) -> Self {
        Self {
            sampling,
            ..Self::default()
        }
    }

    /// Check all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampling.validate()?;
        if self.object_types.is_empty() {
            return Err(ConfigError::NoObjectTypes);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`AgentsFeatureConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `num_poses` is zero.
    ZeroPoses,
    /// `num_poses` is below the pipeline minimum.
    TooFewPoses {
        /// The configured value.
        configured: usize,
        /// The smallest accepted value.
        min: usize,
    },
    /// `time_horizon` is NaN, infinite, zero, or negative.
    InvalidHorizon {
        /// The invalid value.
        value: f64,
    },
    /// No tracked-object types selected.
    NoObjectTypes,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPoses => write!(f, "num_poses must be positive"),
            Self::TooFewPoses { configured, min } => {
                write!(f, "num_poses {configured} is below the minimum of {min}")
            }
            Self::InvalidHorizon { value } => {
                write!(f, "time_horizon must be finite and positive, got {value}")
            }
            Self::NoObjectTypes => write!(f, "no tracked-object types selected"),
        }
    }
}

impl Error for ConfigError {}
