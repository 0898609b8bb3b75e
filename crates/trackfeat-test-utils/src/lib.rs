//! Test utilities and mock types for trackfeat development.
//!
//! Provides state constructors, deterministic scene generators in
//! [`fixtures`], and a [`MockScenario`] implementing [`ScenarioSource`]
//! with caller-controlled past windows.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use trackfeat_core::{
    DetectionsTracks, EgoState, Extent, SamplingError, ScenarioSource, StateSE2, TimePoint,
    TrackedObject, TrackedObjectType, TrackedObjects, Vector2D,
};

/// Ego state with heading `heading`, moving at `speed` along it.
pub fn make_ego(x: f64, y: f64, heading: f64, speed: f64, t_us: i64) -> EgoState {
    EgoState::new(
        StateSE2::new(x, y, heading),
        Vector2D::new(speed * heading.cos(), speed * heading.sin()),
        Vector2D::default(),
        TimePoint::from_us(t_us),
    )
}

/// A tracked object of the given type with a 2 m x 4.5 m footprint.
pub fn make_object(
    token: &str,
    object_type: TrackedObjectType,
    pose: StateSE2,
    velocity: Vector2D,
) -> TrackedObject {
    TrackedObject {
        track_token: token.to_owned(),
        object_type,
        pose,
        velocity,
        extent: Extent {
            width: 2.0,
            length: 4.5,
        },
    }
}

/// A vehicle at `(x, y, heading)` with zero velocity.
pub fn make_vehicle(token: &str, x: f64, y: f64, heading: f64) -> TrackedObject {
    make_object(
        token,
        TrackedObjectType::Vehicle,
        StateSE2::new(x, y, heading),
        Vector2D::default(),
    )
}

/// Wrap objects into one detection snapshot.
pub fn detections(objects: Vec<TrackedObject>) -> DetectionsTracks {
    DetectionsTracks::new(TrackedObjects::new(objects))
}

/// A [`ScenarioSource`] returning fixed past windows.
///
/// The `past_*` methods ignore their sampling arguments and return the
/// stored vectors, so tests can hand the builder mismatched or short
/// windows. Set [`fail_with`](Self::fail_with) to make every past query
/// fail.
#[derive(Clone, Debug)]
pub struct MockScenario {
    pub past_ego_states: Vec<EgoState>,
    pub past_timestamps: Vec<TimePoint>,
    pub past_tracked_objects: Vec<DetectionsTracks>,
    pub initial_ego_state: EgoState,
    pub initial_tracked_objects: DetectionsTracks,
    pub fail_with: Option<SamplingError>,
}

impl MockScenario {
    /// Split an oldest-first window into past samples and present.
    ///
    /// # Panics
    ///
    /// Panics if `ego_states` is empty or the two inputs differ in length.
    pub fn from_window(ego_states: Vec<EgoState>, tracks: Vec<DetectionsTracks>) -> Self {
        assert!(!ego_states.is_empty(), "window must not be empty");
        assert_eq!(ego_states.len(), tracks.len(), "window length mismatch");
        let mut past_ego_states = ego_states;
        let mut past_tracked_objects = tracks;
        let initial_ego_state = past_ego_states.pop().unwrap();
        let initial_tracked_objects = past_tracked_objects.pop().unwrap();
        let past_timestamps = past_ego_states.iter().map(|e| e.time_point).collect();
        Self {
            past_ego_states,
            past_timestamps,
            past_tracked_objects,
            initial_ego_state,
            initial_tracked_objects,
            fail_with: None,
        }
    }

    fn check(&self) -> Result<(), SamplingError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl ScenarioSource for MockScenario {
    fn initial_ego_state(&self) -> &EgoState {
        &self.initial_ego_state
    }

    fn initial_tracked_objects(&self) -> &DetectionsTracks {
        &self.initial_tracked_objects
    }

    fn start_time(&self) -> TimePoint {
        self.initial_ego_state.time_point
    }

    fn past_ego_states(&self, _: usize, _: usize, _: f64) -> Result<Vec<EgoState>, SamplingError> {
        self.check()?;
        Ok(self.past_ego_states.clone())
    }

    fn past_timestamps(&self, _: usize, _: usize, _: f64) -> Result<Vec<TimePoint>, SamplingError> {
        self.check()?;
        Ok(self.past_timestamps.clone())
    }

    fn past_tracked_objects(
        &self,
        _: usize,
        _: usize,
        _: f64,
    ) -> Result<Vec<DetectionsTracks>, SamplingError> {
        self.check()?;
        Ok(self.past_tracked_objects.clone())
    }
}
