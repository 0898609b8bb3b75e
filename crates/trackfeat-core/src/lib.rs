//! Core types and traits for the trackfeat feature pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: track and
//! time identifiers, ego and tracked-object state, error types, the
//! history adapter traits, and horizon sampling.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod sampling;
pub mod state;
pub mod traits;

pub use error::{FeatureError, SamplingError};
pub use id::{TimePoint, TrackId};
pub use sampling::sample_indices_with_time_horizon;
pub use state::{
    DetectionsTracks, EgoState, Extent, Observation, SensorFrame, StateSE2, TrackedObject,
    TrackedObjectType, TrackedObjects, Vector2D,
};
pub use traits::{HistorySource, ScenarioSource};
