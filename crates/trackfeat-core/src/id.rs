//! Strongly-typed identifiers for tracks and time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense integer identity of a tracked object within one sampled window.
///
/// Track tokens arrive as strings; the feature packer interns them into
/// `TrackId`s in order of first appearance so they fit in a numeric
/// tensor column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u32);

impl TrackId {
    /// The id as stored in the track-token column of a raw agent row.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Recover an id from a track-token column value.
    ///
    /// Returns `None` for negative, fractional, or non-finite values.
    pub fn from_f64(v: f64) -> Option<Self> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
            Some(Self(v as u32))
        } else {
            None
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TrackId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// An absolute timestamp in microseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimePoint(pub i64);

impl TimePoint {
    /// Construct from a value in microseconds.
    pub fn from_us(time_us: i64) -> Self {
        Self(time_us)
    }

    /// Construct from a value in seconds, rounded to the nearest microsecond.
    pub fn from_s(time_s: f64) -> Self {
        Self((time_s * 1e6).round() as i64)
    }

    /// Time in microseconds.
    pub fn time_us(self) -> i64 {
        self.0
    }

    /// Time in seconds.
    pub fn time_s(self) -> f64 {
        self.0 as f64 * 1e-6
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

impl From<i64> for TimePoint {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
