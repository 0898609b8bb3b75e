//! Feature packer: raw history sequences into transform-ready tensors.
//!
//! Fixed-size sequences (ego states, timestamps) are stacked into one
//! tensor each. Detection snapshots vary in population, so they stay a
//! list of per-frame `[agents, 8]` tensors until the agent filter aligns
//! them. Nothing here changes values or order: rows and frames come out
//! exactly as they went in, oldest-first.

use indexmap::IndexMap;
use trackfeat_core::{EgoState, FeatureError, TimePoint, TrackId, TrackedObjectType, TrackedObjects};

use crate::index::{AgentInternalIndex, EgoInternalIndex};
use crate::tensor::Tensor;

/// Key of the stacked ego history tensor.
pub const PAST_EGO_STATES: &str = "past_ego_states";
/// Key of the stacked timestamp tensor.
pub const PAST_TIME_STAMPS: &str = "past_time_stamps";
/// Key of the per-frame detection tensor list.
pub const PAST_TRACKED_OBJECTS: &str = "past_tracked_objects";

/// Tensors exchanged with [`scriptable_forward`](crate::AgentsFeatureBuilder::scriptable_forward).
///
/// Three maps by nesting depth: single tensors, lists of tensors, and
/// lists of lists. Keys are insertion-ordered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTensors {
    /// Single tensors by name.
    pub tensors: IndexMap<String, Tensor>,
    /// Tensor lists by name.
    pub list_tensors: IndexMap<String, Vec<Tensor>>,
    /// Nested tensor lists by name.
    pub list_list_tensors: IndexMap<String, Vec<Vec<Tensor>>>,
}

impl FeatureTensors {
    /// Look up a single tensor.
    pub fn tensor(&self, key: &str) -> Result<&Tensor, FeatureError> {
        self.tensors
            .get(key)
            .ok_or_else(|| FeatureError::MissingTensor { key: key.into() })
    }

    /// Look up a tensor list.
    pub fn tensor_list(&self, key: &str) -> Result<&[Tensor], FeatureError> {
        self.list_tensors
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| FeatureError::MissingTensor { key: key.into() })
    }
}

/// Interns string track tokens into dense [`TrackId`]s.
///
/// Ids are handed out in order of first appearance. At most
/// [`MAX_TRACKS`](Self::MAX_TRACKS) distinct tokens can be interned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackTokenInterner {
    ids: IndexMap<String, TrackId>,
    limit: usize,
}

impl Default for TrackTokenInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackTokenInterner {
    /// Largest number of distinct tokens: every `u32` id below `u32::MAX`.
    pub const MAX_TRACKS: usize = u32::MAX as usize;

    /// An empty interner.
    pub fn new() -> Self {
        Self::with_limit(Self::MAX_TRACKS)
    }

    /// An empty interner accepting at most `limit` distinct tokens,
    /// capped at [`MAX_TRACKS`](Self::MAX_TRACKS).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            ids: IndexMap::new(),
            limit: limit.min(Self::MAX_TRACKS),
        }
    }

    /// Id for `token`, allocating the next one if unseen.
    ///
    /// Fails with [`FeatureError::TooManyTracks`] once the limit is
    /// reached and `token` is new.
    pub fn intern(&mut self, token: &str) -> Result<TrackId, FeatureError> {
        if let Some(&id) = self.ids.get(token) {
            return Ok(id);
        }
        let too_many = FeatureError::TooManyTracks { limit: self.limit };
        if self.ids.len() >= self.limit {
            return Err(too_many);
        }
        let id = u32::try_from(self.ids.len()).map_err(|_| too_many)?;
        self.ids.insert(token.to_owned(), TrackId(id));
        Ok(TrackId(id))
    }

    /// Token that was assigned `id`.
    pub fn token(&self, id: TrackId) -> Option<&str> {
        self.ids
            .get_index(id.0 as usize)
            .map(|(token, _)| token.as_str())
    }

    /// Number of distinct tokens seen.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no tokens have been seen.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Stack ego states into a `[frames, 7]` tensor.
pub fn sampled_past_ego_states_to_tensor(past_ego_states: &[EgoState]) -> Tensor {
    let mut data = Vec::with_capacity(past_ego_states.len() * EgoInternalIndex::DIM);
    for state in past_ego_states {
        let mut row = [0.0; EgoInternalIndex::DIM];
        row[EgoInternalIndex::X] = state.pose.x;
        row[EgoInternalIndex::Y] = state.pose.y;
        row[EgoInternalIndex::HEADING] = state.pose.heading;
        row[EgoInternalIndex::VX] = state.velocity.x;
        row[EgoInternalIndex::VY] = state.velocity.y;
        row[EgoInternalIndex::AX] = state.acceleration.x;
        row[EgoInternalIndex::AY] = state.acceleration.y;
        data.extend_from_slice(&row);
    }
    Tensor::from_parts(&[past_ego_states.len(), EgoInternalIndex::DIM], data)
}

/// Stack timestamps into a `[frames]` tensor of microseconds.
pub fn sampled_past_timestamps_to_tensor(time_stamps: &[TimePoint]) -> Tensor {
    let data: Vec<f64> = time_stamps.iter().map(|t| t.time_us() as f64).collect();
    Tensor::from_parts(&[time_stamps.len()], data)
}

/// Convert detection snapshots into per-frame `[agents, 8]` tensors.
///
/// Only objects whose type is in `object_types` are kept. Track tokens
/// are interned across the whole window, oldest frame first.
pub fn sampled_tracked_objects_to_tensor_list(
    past_tracked_objects: &[TrackedObjects],
    object_types: &[TrackedObjectType],
) -> Result<Vec<Tensor>, FeatureError> {
    let mut interner = TrackTokenInterner::new();
    pack_tracked_objects(past_tracked_objects, object_types, &mut interner)
}

/// Like [`sampled_tracked_objects_to_tensor_list`], with a caller-owned
/// interner so ids can be mapped back to tokens.
pub fn pack_tracked_objects(
    past_tracked_objects: &[TrackedObjects],
    object_types: &[TrackedObjectType],
    interner: &mut TrackTokenInterner,
) -> Result<Vec<Tensor>, FeatureError> {
    past_tracked_objects
        .iter()
        .map(|frame| {
            let mut data = Vec::with_capacity(frame.len() * AgentInternalIndex::DIM);
            let mut rows = 0usize;
            for object in frame.of_types(object_types) {
                let mut row = [0.0; AgentInternalIndex::DIM];
                row[AgentInternalIndex::TRACK_TOKEN] =
                    interner.intern(&object.track_token)?.as_f64();
                row[AgentInternalIndex::VX] = object.velocity.x;
                row[AgentInternalIndex::VY] = object.velocity.y;
                row[AgentInternalIndex::HEADING] = object.pose.heading;
                row[AgentInternalIndex::WIDTH] = object.extent.width;
                row[AgentInternalIndex::LENGTH] = object.extent.length;
                row[AgentInternalIndex::X] = object.pose.x;
                row[AgentInternalIndex::Y] = object.pose.y;
                data.extend_from_slice(&row);
                rows += 1;
            }
            Ok(Tensor::from_parts(&[rows, AgentInternalIndex::DIM], data))
        })
        .collect()
}
