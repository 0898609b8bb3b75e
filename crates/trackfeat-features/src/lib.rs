//! Agent and ego history features for trajectory planners.
//!
//! Converts a short window of ego states and tracked-object detections
//! into fixed-shape tensors expressed in the frame of the most recent
//! ego pose. The entry point is [`AgentsFeatureBuilder`]; the individual
//! transform stages in [`agents`] are public for reuse and testing.
//!
//! The pipeline runs in three phases:
//!
//! 1. **Pack**: raw states become `past_ego_states`, `past_time_stamps`
//!    and `past_tracked_objects` tensors ([`pack`]).
//! 2. **Forward**: [`AgentsFeatureBuilder::scriptable_forward`] filters,
//!    pads and localizes the agents and computes yaw rates.
//! 3. **Unpack**: the output tensors become an [`AgentsFeature`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agents;
pub mod builder;
pub mod config;
pub mod feature;
pub mod geometry;
pub mod index;
pub mod pack;
pub mod tensor;

pub use builder::{
    AgentsFeatureBuilder, FeatureRequirements, SamplingRequirement, AGENTS_AGENTS, AGENTS_EGO,
    MIN_FRAMES,
};
pub use config::{AgentsFeatureConfig, ConfigError, FrameOrder, TrajectorySampling};
pub use feature::AgentsFeature;
pub use index::{AgentFeatureIndex, AgentInternalIndex, EgoFeatureIndex, EgoInternalIndex};
pub use pack::{FeatureTensors, TrackTokenInterner};
pub use tensor::{Shape, Tensor};
