//! Deterministic scene generators.
//!
//! - [`straight_scene`]: ego and vehicles driving parallel lanes.
//! - [`turning_scene`]: vehicles on circular arcs with a known yaw rate.
//! - [`noisy_scene`]: seeded pseudo-random traffic with track dropouts.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use trackfeat_core::{
    DetectionsTracks, EgoState, Observation, StateSE2, TimePoint, TrackedObject,
    TrackedObjectType, Vector2D,
};

use crate::{detections, make_ego, make_object};

/// An oldest-first window of ego states and detections.
#[derive(Clone, Debug)]
pub struct Scene {
    pub ego_states: Vec<EgoState>,
    pub tracks: Vec<DetectionsTracks>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.ego_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ego_states.is_empty()
    }

    pub fn timestamps(&self) -> Vec<TimePoint> {
        self.ego_states.iter().map(|e| e.time_point).collect()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.tracks.iter().cloned().map(Observation::from).collect()
    }

    /// `(ego, observation)` pairs for feeding a history buffer.
    pub fn samples(&self) -> Vec<(EgoState, Observation)> {
        self.ego_states
            .iter()
            .cloned()
            .zip(self.observations())
            .collect()
    }
}

/// Ego at 10 m/s along +x; vehicle `k` in lane `y = 3.5 * (k + 1)` at
/// 8 m/s, starting `5 * k` m ahead.
pub fn straight_scene(frames: usize, agents: usize, dt_us: i64) -> Scene {
    let mut scene = Scene {
        ego_states: Vec::with_capacity(frames),
        tracks: Vec::with_capacity(frames),
    };
    for t in 0..frames {
        let t_us = t as i64 * dt_us;
        let ts = t_us as f64 * 1e-6;
        scene.ego_states.push(make_ego(10.0 * ts, 0.0, 0.0, 10.0, t_us));
        let objects = (0..agents)
            .map(|k| {
                make_object(
                    &format!("veh-{k}"),
                    TrackedObjectType::Vehicle,
                    StateSE2::new(5.0 * k as f64 + 8.0 * ts, 3.5 * (k + 1) as f64, 0.0),
                    Vector2D::new(8.0, 0.0),
                )
            })
            .collect();
        scene.tracks.push(detections(objects));
    }
    scene
}

/// Stationary ego; vehicle `k` turns at `yaw_rate` rad/s on a circle of
/// radius `10 + k` m around the origin.
pub fn turning_scene(frames: usize, agents: usize, dt_us: i64, yaw_rate: f64) -> Scene {
    let mut scene = Scene {
        ego_states: Vec::with_capacity(frames),
        tracks: Vec::with_capacity(frames),
    };
    for t in 0..frames {
        let t_us = t as i64 * dt_us;
        let theta = yaw_rate * t_us as f64 * 1e-6;
        scene.ego_states.push(make_ego(0.0, 0.0, 0.0, 0.0, t_us));
        let objects = (0..agents)
            .map(|k| {
                let r = 10.0 + k as f64;
                let heading = theta + FRAC_PI_2;
                make_object(
                    &format!("turn-{k}"),
                    TrackedObjectType::Vehicle,
                    StateSE2::new(r * theta.cos(), r * theta.sin(), heading),
                    Vector2D::new(r * yaw_rate * heading.cos(), r * yaw_rate * heading.sin()),
                )
            })
            .collect();
        scene.tracks.push(detections(objects));
    }
    scene
}

/// Seeded traffic with `agents` tracks, each missing from any given
/// frame with probability `dropout`. A pedestrian is mixed in every
/// fourth track. Detection order is shuffled per frame.
pub fn noisy_scene(seed: u64, frames: usize, agents: usize, dropout: f64) -> Scene {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dt_us = 100_000;
    let starts: Vec<(StateSE2, Vector2D)> = (0..agents)
        .map(|_| {
            let heading = rng.random_range(-PI..PI);
            let speed = rng.random_range(0.0..15.0);
            (
                StateSE2::new(
                    rng.random_range(-50.0..50.0),
                    rng.random_range(-50.0..50.0),
                    heading,
                ),
                Vector2D::new(speed * heading.cos(), speed * heading.sin()),
            )
        })
        .collect();

    let mut scene = Scene {
        ego_states: Vec::with_capacity(frames),
        tracks: Vec::with_capacity(frames),
    };
    for t in 0..frames {
        let t_us = t as i64 * dt_us;
        let ts = t_us as f64 * 1e-6;
        scene
            .ego_states
            .push(make_ego(5.0 * ts, 0.0, 0.1 * ts, 5.0, t_us));
        let mut objects: Vec<TrackedObject> = Vec::with_capacity(agents);
        for (k, (pose, velocity)) in starts.iter().enumerate() {
            if rng.random::<f64>() < dropout {
                continue;
            }
            let object_type = if k % 4 == 3 {
                TrackedObjectType::Pedestrian
            } else {
                TrackedObjectType::Vehicle
            };
            objects.push(make_object(
                &format!("trk-{k}"),
                object_type,
                StateSE2::new(pose.x + velocity.x * ts, pose.y + velocity.y * ts, pose.heading),
                *velocity,
            ));
        }
        objects.shuffle(&mut rng);
        scene.tracks.push(detections(objects));
    }
    scene
}
