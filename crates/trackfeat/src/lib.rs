//! Trackfeat: ego-relative agent history features for motion planners.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all trackfeat sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use trackfeat::prelude::*;
//!
//! let builder = AgentsFeatureBuilder::new(AgentsFeatureConfig::with_sampling(
//!     TrajectorySampling::new(2, 0.2),
//! ))
//! .unwrap();
//!
//! // 10 Hz history with two vehicles.
//! let mut history = SimulationHistoryBuffer::new(8, Some(0.1));
//! for t in 0..5 {
//!     let ts = t as f64 * 0.1;
//!     let ego = EgoState::new(
//!         StateSE2::new(10.0 * ts, 0.0, 0.0),
//!         Vector2D::new(10.0, 0.0),
//!         Vector2D::default(),
//!         TimePoint::from_s(ts),
//!     );
//!     let vehicles = ["a", "b"].iter().enumerate().map(|(k, token)| TrackedObject {
//!         track_token: token.to_string(),
//!         object_type: TrackedObjectType::Vehicle,
//!         pose: StateSE2::new(20.0 + 5.0 * k as f64, 3.5, 0.0),
//!         velocity: Vector2D::default(),
//!         extent: Extent { width: 2.0, length: 4.5 },
//!     });
//!     let detections = DetectionsTracks::new(TrackedObjects::new(vehicles.collect()));
//!     history.append(ego, detections.into());
//! }
//!
//! let feature = builder.get_features_from_simulation(&history).unwrap();
//! assert_eq!(feature.ego.shape(), &[3, 7]);
//! assert_eq!(feature.agents.shape(), &[3, 2, 8]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `trackfeat-core` | State types, ids, errors, history traits |
//! | [`features`] | `trackfeat-features` | Tensors, transforms, the feature builder |
//! | [`history`] | `trackfeat-history` | Simulation buffer and scenario logs |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`trackfeat-core`).
///
/// Contains ego and tracked-object state, [`types::FeatureError`], and
/// the [`types::ScenarioSource`] and [`types::HistorySource`] traits.
pub use trackfeat_core as types;

/// Feature tensors and transforms (`trackfeat-features`).
///
/// [`features::AgentsFeatureBuilder`] is the entry point; the stages it
/// runs live in [`features::agents`].
pub use trackfeat_features as features;

/// History storage (`trackfeat-history`).
pub use trackfeat_history as history;

/// Common imports for typical trackfeat usage.
///
/// ```rust
/// use trackfeat::prelude::*;
/// ```
pub mod prelude {
    // State
    pub use trackfeat_core::{
        DetectionsTracks, EgoState, Extent, Observation, StateSE2, TimePoint, TrackId,
        TrackedObject, TrackedObjectType, TrackedObjects, Vector2D,
    };

    // Errors
    pub use trackfeat_core::{FeatureError, SamplingError};

    // Sources
    pub use trackfeat_core::{HistorySource, ScenarioSource};
    pub use trackfeat_history::{LogFrame, ScenarioLog, ScenarioLogError, SimulationHistoryBuffer};

    // Features
    pub use trackfeat_features::{
        AgentsFeature, AgentsFeatureBuilder, AgentsFeatureConfig, ConfigError, FeatureTensors,
        FrameOrder, Tensor, TrajectorySampling,
    };
}
