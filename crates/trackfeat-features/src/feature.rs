//! The assembled agents feature.

use trackfeat_core::FeatureError;

use crate::index::{AgentFeatureIndex, EgoFeatureIndex};
use crate::tensor::Tensor;

/// Ego and agent trajectory features for one sample.
///
/// `ego` is `[frames, 7]` laid out by [`EgoFeatureIndex`]; `agents` is
/// `[frames, agents, 8]` laid out by [`AgentFeatureIndex`]. Agents are
/// ordered as in the anchor frame's detections, and the agent axis is 0
/// when the anchor frame has none.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentsFeature {
    /// Ego features.
    pub ego: Tensor,
    /// Agent features.
    pub agents: Tensor,
}

impl AgentsFeature {
    /// Wrap feature tensors after checking their shapes agree.
    pub fn new(ego: Tensor, agents: Tensor) -> Result<Self, FeatureError> {
        if ego.rank() != 2 || ego.dim(1) != EgoFeatureIndex::DIM {
            return Err(FeatureError::ShapeMismatch {
                reason: format!(
                    "ego features have shape {:?}, expected [_, {}]",
                    ego.shape(),
                    EgoFeatureIndex::DIM
                ),
            });
        }
        if agents.rank() != 3
            || agents.dim(0) != ego.dim(0)
            || agents.dim(2) != AgentFeatureIndex::DIM
        {
            return Err(FeatureError::ShapeMismatch {
                reason: format!(
                    "agent features have shape {:?}, expected [{}, _, {}]",
                    agents.shape(),
                    ego.dim(0),
                    AgentFeatureIndex::DIM
                ),
            });
        }
        Ok(Self { ego, agents })
    }

    /// Width of an ego feature row.
    pub const fn ego_state_dim() -> usize {
        EgoFeatureIndex::DIM
    }

    /// Width of an agent feature row.
    pub const fn agents_states_dim() -> usize {
        AgentFeatureIndex::DIM
    }

    /// Frames in the window.
    pub fn num_frames(&self) -> usize {
        self.ego.dim(0)
    }

    /// Agents in the anchor frame.
    pub fn num_agents(&self) -> usize {
        self.agents.dim(1)
    }

    /// One agent's feature rows, `[frames, 8]`.
    pub fn agent_history(&self, agent: usize) -> Option<Tensor> {
        if agent >= self.num_agents() {
            return None;
        }
        let mut data = Vec::with_capacity(self.num_frames() * AgentFeatureIndex::DIM);
        for frame in self.agents.rows() {
            let start = agent * AgentFeatureIndex::DIM;
            data.extend_from_slice(&frame[start..start + AgentFeatureIndex::DIM]);
        }
        Some(Tensor::from_parts(
            &[self.num_frames(), AgentFeatureIndex::DIM],
            data,
        ))
    }

    /// Flat `f32` ego features for model input.
    pub fn ego_f32(&self) -> Vec<f32> {
        self.ego.to_f32_vec()
    }

    /// Flat `f32` agent features for model input.
    pub fn agents_f32(&self) -> Vec<f32> {
        self.agents.to_f32_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_shapes() {
        let ego = Tensor::zeros(&[3, EgoFeatureIndex::DIM]);
        assert!(AgentsFeature::new(ego.clone(), Tensor::zeros(&[3, 2, 8])).is_ok());
        assert!(AgentsFeature::new(ego.clone(), Tensor::zeros(&[2, 2, 8])).is_err());
        assert!(AgentsFeature::new(ego, Tensor::zeros(&[3, 2, 5])).is_err());
        assert!(AgentsFeature::new(Tensor::zeros(&[3, 3]), Tensor::zeros(&[3, 0, 8])).is_err());
    }

    #[test]
    fn agent_history_slices_one_agent() {
        let ego = Tensor::zeros(&[2, EgoFeatureIndex::DIM]);
        let data: Vec<f64> = (0..2 * 2 * 8).map(|v| v as f64).collect();
        let agents = Tensor::new(&[2, 2, 8], data).unwrap();
        let feature = AgentsFeature::new(ego, agents).unwrap();

        let h = feature.agent_history(1).unwrap();
        assert_eq!(h.shape(), &[2, 8]);
        assert_eq!(h.row(0)[0], 8.0);
        assert_eq!(h.row(1)[0], 24.0);
        assert!(feature.agent_history(2).is_none());
    }

    #[test]
    fn f32_exports_cover_every_element() {
        let ego = Tensor::new(&[1, 7], vec![1.5, -2.0, 0.25, 0.0, 3.0, 0.0, -1.0]).unwrap();
        let agents = Tensor::new(&[1, 1, 8], (0..8).map(|v| v as f64 * 0.5).collect()).unwrap();
        let feature = AgentsFeature::new(ego, agents).unwrap();

        let ego32 = feature.ego_f32();
        assert_eq!(ego32.len(), feature.ego.numel());
        assert_eq!(ego32[0], 1.5f32);
        assert_eq!(ego32[6], -1.0f32);

        let agents32 = feature.agents_f32();
        assert_eq!(agents32.len(), feature.agents.numel());
        assert_eq!(agents32[7], 3.5f32);
    }

    #[test]
    fn dims() {
        assert_eq!(AgentsFeature::ego_state_dim(), 7);
        assert_eq!(AgentsFeature::agents_states_dim(), 8);
    }
}
