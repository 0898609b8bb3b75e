//! Column layouts of the raw and feature tensors.
//!
//! Downstream model code indexes feature rows positionally, so these
//! constants are part of the output contract.

/// Columns of a raw ego row, as produced by the feature packer.
#[derive(Clone, Copy, Debug)]
pub struct EgoInternalIndex;

impl EgoInternalIndex {
    /// Absolute x (m).
    pub const X: usize = 0;
    /// Absolute y (m).
    pub const Y: usize = 1;
    /// Absolute heading (rad).
    pub const HEADING: usize = 2;
    /// Absolute velocity x (m/s).
    pub const VX: usize = 3;
    /// Absolute velocity y (m/s).
    pub const VY: usize = 4;
    /// Absolute acceleration x (m/s^2).
    pub const AX: usize = 5;
    /// Absolute acceleration y (m/s^2).
    pub const AY: usize = 6;
    /// Row width.
    pub const DIM: usize = 7;
}

/// Columns of a raw agent row, as produced by the feature packer.
///
/// The track token column holds an interned [`TrackId`](trackfeat_core::TrackId).
#[derive(Clone, Copy, Debug)]
pub struct AgentInternalIndex;

impl AgentInternalIndex {
    /// Interned track identity.
    pub const TRACK_TOKEN: usize = 0;
    /// Absolute velocity x (m/s).
    pub const VX: usize = 1;
    /// Absolute velocity y (m/s).
    pub const VY: usize = 2;
    /// Absolute heading (rad).
    pub const HEADING: usize = 3;
    /// Box width (m).
    pub const WIDTH: usize = 4;
    /// Box length (m).
    pub const LENGTH: usize = 5;
    /// Absolute x (m).
    pub const X: usize = 6;
    /// Absolute y (m).
    pub const Y: usize = 7;
    /// Row width.
    pub const DIM: usize = 8;
}

/// Columns of an assembled agent feature row.
#[derive(Clone, Copy, Debug)]
pub struct AgentFeatureIndex;

impl AgentFeatureIndex {
    /// Relative x (m).
    pub const X: usize = 0;
    /// Relative y (m).
    pub const Y: usize = 1;
    /// Relative heading (rad).
    pub const HEADING: usize = 2;
    /// Relative velocity x (m/s).
    pub const VX: usize = 3;
    /// Relative velocity y (m/s).
    pub const VY: usize = 4;
    /// Yaw rate (rad/s).
    pub const YAW_RATE: usize = 5;
    /// Box length (m).
    pub const LENGTH: usize = 6;
    /// Box width (m).
    pub const WIDTH: usize = 7;
    /// Row width.
    pub const DIM: usize = 8;
}

/// Columns of an assembled ego feature row.
#[derive(Clone, Copy, Debug)]
pub struct EgoFeatureIndex;

impl EgoFeatureIndex {
    /// Relative x (m).
    pub const X: usize = 0;
    /// Relative y (m).
    pub const Y: usize = 1;
    /// Relative heading (rad).
    pub const HEADING: usize = 2;
    /// Relative velocity x (m/s).
    pub const VX: usize = 3;
    /// Relative velocity y (m/s).
    pub const VY: usize = 4;
    /// Relative acceleration x (m/s^2).
    pub const AX: usize = 5;
    /// Relative acceleration y (m/s^2).
    pub const AY: usize = 6;
    /// Row width.
    pub const DIM: usize = 7;
}
