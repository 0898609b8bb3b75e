//! Benchmark profiles for the trackfeat feature pipeline.
//!
//! - [`reference_profile`]: 2 s at 10 Hz, 64 tracks with dropouts
//! - [`stress_profile`]: same window with 512 tracks
//! - [`history_profile`]: a filled simulation buffer for the online path

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use trackfeat_features::{
    AgentsFeatureBuilder, AgentsFeatureConfig, FeatureTensors, TrajectorySampling,
};
use trackfeat_history::SimulationHistoryBuffer;
use trackfeat_test_utils::fixtures::noisy_scene;

/// A builder plus one packed input window.
pub struct BenchProfile {
    /// Builder configured for the profile's window.
    pub builder: AgentsFeatureBuilder,
    /// Packed raw tensors ready for `scriptable_forward`.
    pub packed: FeatureTensors,
}

fn build_profile(seed: u64, agents: usize) -> BenchProfile {
    let config = AgentsFeatureConfig::with_sampling(TrajectorySampling::new(20, 2.0));
    let builder = AgentsFeatureBuilder::new(config).unwrap();
    let scene = noisy_scene(seed, builder.config().sampling.window_len(), agents, 0.1);
    let objects: Vec<_> = scene.tracks.iter().map(|d| d.tracked_objects.clone()).collect();
    let packed = builder
        .pack_to_feature_tensors(&scene.ego_states, &scene.timestamps(), &objects)
        .unwrap();
    BenchProfile { builder, packed }
}

/// 21-frame window with 64 tracks, 10% dropout.
pub fn reference_profile(seed: u64) -> BenchProfile {
    build_profile(seed, 64)
}

/// 21-frame window with 512 tracks, 10% dropout.
pub fn stress_profile(seed: u64) -> BenchProfile {
    build_profile(seed, 512)
}

/// A 10 Hz buffer holding 2 s plus the present, filled from a 64-track
/// scene, and a builder sampling 4 poses over 2 s.
pub fn history_profile(seed: u64) -> (AgentsFeatureBuilder, SimulationHistoryBuffer) {
    let config = AgentsFeatureConfig::with_sampling(TrajectorySampling::new(4, 2.0));
    let builder = AgentsFeatureBuilder::new(config).unwrap();
    let scene = noisy_scene(seed, 21, 64, 0.1);
    let mut buffer = SimulationHistoryBuffer::with_duration(2.0, 0.1);
    buffer.extend(scene.samples());
    (builder, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfeat_core::HistorySource;
    use trackfeat_features::pack::PAST_TRACKED_OBJECTS;

    #[test]
    fn reference_profile_runs_forward() {
        let profile = reference_profile(42);
        let out = profile.builder.scriptable_forward(&profile.packed).unwrap();
        let feature = profile.builder.unpack_feature(&out).unwrap();
        assert_eq!(feature.num_frames(), 21);
        assert_eq!(
            profile.packed.tensor_list(PAST_TRACKED_OBJECTS).unwrap().len(),
            21
        );
    }

    #[test]
    fn profiles_are_deterministic() {
        let a = reference_profile(7);
        let b = reference_profile(7);
        assert_eq!(a.packed, b.packed);
    }

    #[test]
    fn history_profile_is_full() {
        let (builder, buffer) = history_profile(42);
        assert_eq!(HistorySource::len(&buffer), 21);
        let feature = builder.get_features_from_simulation(&buffer).unwrap();
        assert_eq!(feature.num_frames(), 5);
    }
}
