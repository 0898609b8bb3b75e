//! The agents feature builder.
//!
//! [`AgentsFeatureBuilder`] has two entry points that differ only in
//! where the past window comes from: a recorded scenario (training) or
//! a rolling simulation history (planning). Both gather the window,
//! pack it with [`pack_to_feature_tensors`](AgentsFeatureBuilder::pack_to_feature_tensors),
//! run [`scriptable_forward`](AgentsFeatureBuilder::scriptable_forward),
//! and unpack the result. `scriptable_forward` is a pure function of
//! its tensors so it can run without any history source.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use trackfeat_core::{
    sample_indices_with_time_horizon, EgoState, FeatureError, HistorySource, Observation,
    ScenarioSource, TimePoint, TrackedObjects,
};

use crate::agents::{
    build_ego_features_from_tensor, compute_yaw_rate_from_state_tensors,
    convert_absolute_quantities_to_relative, filter_agents_tensor, pack_agents_tensor,
    pad_agent_states,
};
use crate::config::{AgentsFeatureConfig, ConfigError, FrameOrder};
use crate::feature::AgentsFeature;
use crate::index::{AgentFeatureIndex, EgoInternalIndex};
use crate::pack::{
    sampled_past_ego_states_to_tensor, sampled_past_timestamps_to_tensor,
    sampled_tracked_objects_to_tensor_list, FeatureTensors, PAST_EGO_STATES, PAST_TIME_STAMPS,
    PAST_TRACKED_OBJECTS,
};
use crate::tensor::Tensor;

/// Smallest window (present included) the pipeline accepts.
pub const MIN_FRAMES: usize = 3;

/// Output key of the ego feature tensor list.
pub const AGENTS_EGO: &str = "agents.ego";
/// Output key of the agent feature tensor list.
pub const AGENTS_AGENTS: &str = "agents.agents";

/// Sampling parameters for one precomputable input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingRequirement {
    /// Scenario iteration the window is anchored at.
    pub iteration: usize,
    /// Past samples requested.
    pub num_samples: usize,
    /// Look-back in seconds.
    pub time_horizon: f64,
}

impl SamplingRequirement {
    /// String-valued form, keyed `iteration`, `num_samples`, `time_horizon`.
    pub fn to_string_map(&self) -> IndexMap<String, String> {
        IndexMap::from([
            ("iteration".to_owned(), self.iteration.to_string()),
            ("num_samples".to_owned(), self.num_samples.to_string()),
            ("time_horizon".to_owned(), self.time_horizon.to_string()),
        ])
    }
}

/// Sampling requirements keyed by packed input name.
pub type FeatureRequirements = IndexMap<String, SamplingRequirement>;

/// Builds [`AgentsFeature`]s from perception history.
#[derive(Clone, Debug)]
pub struct AgentsFeatureBuilder {
    config: AgentsFeatureConfig,
}

impl AgentsFeatureBuilder {
    /// Create a builder after validating `config`.
    pub fn new(config: AgentsFeatureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Name under which the feature is stored.
    pub fn feature_unique_name() -> &'static str {
        "agents"
    }

    /// The validated configuration.
    pub fn config(&self) -> &AgentsFeatureConfig {
        &self.config
    }

    /// Past samples per window, excluding the present.
    pub fn num_past_poses(&self) -> usize {
        self.config.sampling.num_poses
    }

    /// Look-back in seconds.
    pub fn past_time_horizon(&self) -> f64 {
        self.config.sampling.time_horizon
    }

    /// Build the feature from a recorded scenario at its initial iteration.
    pub fn get_features_from_scenario<S>(&self, scenario: &S) -> Result<AgentsFeature, FeatureError>
    where
        S: ScenarioSource + ?Sized,
    {
        let num_samples = self.num_past_poses();
        let horizon = self.past_time_horizon();

        let mut ego_states = scenario.past_ego_states(0, num_samples, horizon)?;
        ego_states.push(scenario.initial_ego_state().clone());

        let mut time_stamps = scenario.past_timestamps(0, num_samples, horizon)?;
        time_stamps.push(scenario.start_time());

        let mut tracked_objects: Vec<TrackedObjects> = scenario
            .past_tracked_objects(0, num_samples, horizon)?
            .into_iter()
            .map(|d| d.tracked_objects)
            .collect();
        tracked_objects.push(scenario.initial_tracked_objects().tracked_objects.clone());

        self.features_from_window(&ego_states, &time_stamps, &tracked_objects)
    }

    /// Build the feature from a rolling simulation history.
    ///
    /// Past samples are taken every `sample_indices_with_time_horizon`
    /// step back from the present. Fails with
    /// [`FeatureError::BufferTooShort`] when the history does not reach
    /// back over the configured horizon.
    pub fn get_features_from_simulation<H>(&self, history: &H) -> Result<AgentsFeature, FeatureError>
    where
        H: HistorySource + ?Sized,
    {
        let (present_ego, present_observation) =
            history.current_state().ok_or(FeatureError::EmptyHistory)?;
        let present_objects = detections_of(present_observation)?;
        let interval = history
            .sample_interval()
            .ok_or(FeatureError::MissingSampleInterval)?;
        let horizon = self.past_time_horizon();
        let indices = sample_indices_with_time_horizon(self.num_past_poses(), horizon, interval)?;

        let past_len = history.len() - 1;
        let mut ego_states = Vec::with_capacity(indices.len() + 1);
        let mut tracked_objects = Vec::with_capacity(indices.len() + 1);
        for &offset in indices.iter().rev() {
            let too_short = || FeatureError::BufferTooShort {
                duration: history.duration(),
                time_horizon: horizon,
            };
            let position = past_len.checked_sub(offset).ok_or_else(too_short)?;
            let ego = history.ego_state(position).ok_or_else(too_short)?;
            let observation = history.observation(position).ok_or_else(too_short)?;
            ego_states.push(ego.clone());
            tracked_objects.push(detections_of(observation)?.clone());
        }
        ego_states.push(present_ego.clone());
        tracked_objects.push(present_objects.clone());

        let time_stamps: Vec<TimePoint> = ego_states.iter().map(|s| s.time_point).collect();
        self.features_from_window(&ego_states, &time_stamps, &tracked_objects)
    }

    fn features_from_window(
        &self,
        ego_states: &[EgoState],
        time_stamps: &[TimePoint],
        tracked_objects: &[TrackedObjects],
    ) -> Result<AgentsFeature, FeatureError> {
        let packed = self.pack_to_feature_tensors(ego_states, time_stamps, tracked_objects)?;
        let output = self.scriptable_forward(&packed)?;
        self.unpack_feature(&output)
    }

    /// Pack a raw window into the tensors `scriptable_forward` consumes.
    ///
    /// All three sequences must have the same length, at least
    /// [`MIN_FRAMES`], ordered oldest-first with the anchor last.
    pub fn pack_to_feature_tensors(
        &self,
        past_ego_states: &[EgoState],
        past_time_stamps: &[TimePoint],
        past_tracked_objects: &[TrackedObjects],
    ) -> Result<FeatureTensors, FeatureError> {
        check_window(
            past_ego_states.len(),
            past_time_stamps.len(),
            past_tracked_objects.len(),
        )?;

        let mut packed = FeatureTensors::default();
        packed.tensors.insert(
            PAST_EGO_STATES.into(),
            sampled_past_ego_states_to_tensor(past_ego_states),
        );
        packed.tensors.insert(
            PAST_TIME_STAMPS.into(),
            sampled_past_timestamps_to_tensor(past_time_stamps),
        );
        packed.list_tensors.insert(
            PAST_TRACKED_OBJECTS.into(),
            sampled_tracked_objects_to_tensor_list(
                past_tracked_objects,
                &self.config.object_types,
            )?,
        );
        Ok(packed)
    }

    /// Unpack `scriptable_forward` output into an [`AgentsFeature`].
    pub fn unpack_feature(&self, output: &FeatureTensors) -> Result<AgentsFeature, FeatureError> {
        let first = |key: &str| -> Result<Tensor, FeatureError> {
            output
                .tensor_list(key)?
                .first()
                .cloned()
                .ok_or_else(|| FeatureError::MissingTensor { key: key.into() })
        };
        AgentsFeature::new(first(AGENTS_EGO)?, first(AGENTS_AGENTS)?)
    }

    /// Transform packed raw tensors into packed feature tensors.
    ///
    /// Reads `past_ego_states` `[frames, 7]`, `past_time_stamps`
    /// `[frames]` and the `past_tracked_objects` list of `[agents, 8]`
    /// frames. Writes one-element lists `agents.ego` `[frames, 7]` and
    /// `agents.agents` `[frames, agents, 8]`. The newest frame is both
    /// the anchor pose and the reference agent population.
    pub fn scriptable_forward(&self, input: &FeatureTensors) -> Result<FeatureTensors, FeatureError> {
        let ego_history = input.tensor(PAST_EGO_STATES)?;
        let time_stamps = input.tensor(PAST_TIME_STAMPS)?;
        let agents = input.tensor_list(PAST_TRACKED_OBJECTS)?;

        if ego_history.rank() != 2 || ego_history.dim(1) != EgoInternalIndex::DIM {
            return Err(FeatureError::ShapeMismatch {
                reason: format!(
                    "{PAST_EGO_STATES} has shape {:?}, expected [_, {}]",
                    ego_history.shape(),
                    EgoInternalIndex::DIM
                ),
            });
        }
        if time_stamps.rank() != 1 {
            return Err(FeatureError::ShapeMismatch {
                reason: format!(
                    "{PAST_TIME_STAMPS} has shape {:?}, expected [_]",
                    time_stamps.shape()
                ),
            });
        }
        check_window(ego_history.nrows(), time_stamps.dim(0), agents.len())?;

        let frames = ego_history.nrows();
        let anchor_ego_state = ego_history.row(frames - 1);
        let agent_history = filter_agents_tensor(agents, true)?;

        let agents_tensor = if agent_history[frames - 1].nrows() == 0 {
            Tensor::zeros(&[frames, 0, AgentFeatureIndex::DIM])
        } else {
            let padded = pad_agent_states(&agent_history, true)?;
            let local = padded
                .iter()
                .map(|frame| convert_absolute_quantities_to_relative(frame, anchor_ego_state))
                .collect::<Result<Vec<_>, _>>()?;
            let yaw_rates = compute_yaw_rate_from_state_tensors(&padded, time_stamps)?;
            pack_agents_tensor(&local, &yaw_rates)?
        };
        let ego_tensor = build_ego_features_from_tensor(ego_history, true)?;
        debug!(
            "agents feature: {frames} frames, {} agents",
            agents_tensor.dim(1)
        );

        let (ego_tensor, agents_tensor) = match self.config.output_order {
            FrameOrder::Chronological => (ego_tensor, agents_tensor),
            FrameOrder::MostRecentFirst => (
                ego_tensor.reversed_leading(),
                agents_tensor.reversed_leading(),
            ),
        };

        let mut output = FeatureTensors::default();
        output.list_tensors.insert(AGENTS_EGO.into(), vec![ego_tensor]);
        output
            .list_tensors
            .insert(AGENTS_AGENTS.into(), vec![agents_tensor]);
        Ok(output)
    }

    /// Sampling parameters of every packed input, for precomputation.
    pub fn precomputed_feature_config(&self) -> FeatureRequirements {
        let requirement = SamplingRequirement {
            iteration: 0,
            num_samples: self.num_past_poses(),
            time_horizon: self.past_time_horizon(),
        };
        [PAST_EGO_STATES, PAST_TIME_STAMPS, PAST_TRACKED_OBJECTS]
            .into_iter()
            .map(|key| (key.to_owned(), requirement.clone()))
            .collect()
    }
}

fn check_window(ego: usize, timestamps: usize, tracked_objects: usize) -> Result<(), FeatureError> {
    if ego != timestamps || ego != tracked_objects {
        return Err(FeatureError::LengthMismatch {
            ego,
            timestamps,
            tracked_objects,
        });
    }
    if ego < MIN_FRAMES {
        return Err(FeatureError::TooFewFrames {
            got: ego,
            min: MIN_FRAMES,
        });
    }
    Ok(())
}

fn detections_of(observation: &Observation) -> Result<&TrackedObjects, FeatureError> {
    match observation.as_detections() {
        Some(d) => Ok(&d.tracked_objects),
        None => {
            warn!("rejecting {} observation in agents history", observation.kind());
            Err(FeatureError::UnexpectedObservation {
                got: observation.kind(),
            })
        }
    }
}
