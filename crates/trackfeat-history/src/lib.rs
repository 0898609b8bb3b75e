//! History storage for the trackfeat feature pipeline.
//!
//! Provides the two concrete sources the feature builder reads from:
//!
//! - [`SimulationHistoryBuffer`]: a bounded rolling window of ego states
//!   and observations, appended to once per simulation step.
//! - [`ScenarioLog`]: a recorded sequence of frames at a fixed database
//!   interval, sampled backwards from an anchor iteration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod scenario;

pub use buffer::SimulationHistoryBuffer;
pub use scenario::{LogFrame, ScenarioLog, ScenarioLogError};
