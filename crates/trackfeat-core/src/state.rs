//! Ego and tracked-object state as delivered by the history samplers.
//!
//! All quantities here are absolute (map frame). Conversion into the
//! anchor-relative frame happens in the feature pipeline.

use serde::{Deserialize, Serialize};

use crate::id::TimePoint;

/// A planar pose: position plus heading in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSE2 {
    /// Position along the map x axis (m).
    pub x: f64,
    /// Position along the map y axis (m).
    pub y: f64,
    /// Heading (rad), counter-clockwise from the x axis.
    pub heading: f64,
}

impl StateSE2 {
    /// Construct a pose.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

/// A planar vector (velocity or acceleration).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
}

impl Vector2D {
    /// Construct a vector.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// One sample of the ego vehicle's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EgoState {
    /// Absolute pose.
    pub pose: StateSE2,
    /// Absolute velocity vector (m/s).
    pub velocity: Vector2D,
    /// Absolute acceleration vector (m/s^2).
    pub acceleration: Vector2D,
    /// When this sample was taken.
    pub time_point: TimePoint,
}

impl EgoState {
    /// Construct an ego state.
    pub fn new(
        pose: StateSE2,
        velocity: Vector2D,
        acceleration: Vector2D,
        time_point: TimePoint,
    ) -> Self {
        Self {
            pose,
            velocity,
            acceleration,
            time_point,
        }
    }
}

/// Semantic category of a tracked object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedObjectType {
    /// Cars, trucks, buses.
    Vehicle,
    /// People on foot.
    Pedestrian,
    /// Bicycles and their riders.
    Bicycle,
    /// Traffic cones.
    TrafficCone,
    /// Static barriers.
    Barrier,
    /// Construction-zone signs.
    CzoneSign,
    /// Anything else the tracker reports.
    GenericObject,
}

/// Physical footprint of a tracked object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Lateral size (m).
    pub width: f64,
    /// Longitudinal size (m).
    pub length: f64,
}

/// A single tracked detection at one timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Stable identity across frames.
    pub track_token: String,
    /// Semantic category.
    pub object_type: TrackedObjectType,
    /// Absolute pose of the box center.
    pub pose: StateSE2,
    /// Absolute velocity vector (m/s).
    pub velocity: Vector2D,
    /// Footprint.
    pub extent: Extent,
}

/// The tracker output for one timestamp.
///
/// Population size varies from snapshot to snapshot. Track tokens are
/// assumed unique within one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedObjects {
    /// All objects in tracker order.
    pub objects: Vec<TrackedObject>,
}

impl TrackedObjects {
    /// Wrap a list of objects.
    pub fn new(objects: Vec<TrackedObject>) -> Self {
        Self { objects }
    }

    /// Number of objects of every type.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the snapshot has no objects at all.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects whose type is one of `types`, in tracker order.
    pub fn of_types<'a>(
        &'a self,
        types: &'a [TrackedObjectType],
    ) -> impl Iterator<Item = &'a TrackedObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| types.contains(&o.object_type))
    }
}

/// An observation carrying tracked detections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionsTracks {
    /// The tracker output.
    pub tracked_objects: TrackedObjects,
}

impl DetectionsTracks {
    /// Wrap a tracker output.
    pub fn new(tracked_objects: TrackedObjects) -> Self {
        Self { tracked_objects }
    }
}

/// Raw sensor payload. The agents feature cannot be built from it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Lidar points in the sensor frame.
    pub pointcloud: Vec<[f32; 3]>,
}

/// What a simulation step observed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// Tracked-object detections.
    Detections(DetectionsTracks),
    /// Raw sensors.
    Sensors(SensorFrame),
}

impl Observation {
    /// The detections, if this is a detection observation.
    pub fn as_detections(&self) -> Option<&DetectionsTracks> {
        match self {
            Self::Detections(d) => Some(d),
            Self::Sensors(_) => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Detections(_) => "DetectionsTracks",
            Self::Sensors(_) => "Sensors",
        }
    }
}

impl From<DetectionsTracks> for Observation {
    fn from(d: DetectionsTracks) -> Self {
        Self::Detections(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(token: &str, object_type: TrackedObjectType) -> TrackedObject {
        TrackedObject {
            track_token: token.into(),
            object_type,
            pose: StateSE2::default(),
            velocity: Vector2D::default(),
            extent: Extent::default(),
        }
    }

    #[test]
    fn of_types_keeps_tracker_order() {
        let objs = TrackedObjects::new(vec![
            object("a", TrackedObjectType::Vehicle),
            object("b", TrackedObjectType::Pedestrian),
            object("c", TrackedObjectType::Vehicle),
        ]);
        let tokens: Vec<&str> = objs
            .of_types(&[TrackedObjectType::Vehicle])
            .map(|o| o.track_token.as_str())
            .collect();
        assert_eq!(tokens, vec!["a", "c"]);
    }

    #[test]
    fn observation_variants() {
        let det = Observation::from(DetectionsTracks::default());
        assert!(det.as_detections().is_some());
        assert_eq!(det.kind(), "DetectionsTracks");

        let sensors = Observation::Sensors(SensorFrame::default());
        assert!(sensors.as_detections().is_none());
        assert_eq!(sensors.kind(), "Sensors");
    }

    #[test]
    fn vector_magnitude() {
        assert!((Vector2D::new(3.0, 4.0).magnitude() - 5.0).abs() < 1e-12);
    }
}
