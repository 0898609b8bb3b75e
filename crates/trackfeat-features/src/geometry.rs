//! Planar (SE(2)) frame changes and angle wrapping.

use std::f64::consts::{PI, TAU};

use trackfeat_core::StateSE2;

/// Wrap an angle into `(-pi, pi]`.
///
/// Angles already in range and non-finite input are returned unchanged.
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU); // [0, 2pi)
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Change of frame into the local frame of an anchor pose.
///
/// The anchor sits at the origin with zero heading in the local frame.
/// Poses are translated then rotated; vectors (velocity, acceleration)
/// are only rotated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    origin_x: f64,
    origin_y: f64,
    heading: f64,
    cos: f64,
    sin: f64,
}

impl LocalFrame {
    /// Local frame of `anchor`.
    pub fn new(anchor: StateSE2) -> Self {
        let (sin, cos) = anchor.heading.sin_cos();
        Self {
            origin_x: anchor.x,
            origin_y: anchor.y,
            heading: anchor.heading,
            cos,
            sin,
        }
    }

    /// Express an absolute pose in the local frame.
    pub fn pose_to_local(&self, pose: StateSE2) -> StateSE2 {
        let (x, y) = self.rotate_to_local(pose.x - self.origin_x, pose.y - self.origin_y);
        StateSE2 {
            x,
            y,
            heading: wrap_angle(pose.heading - self.heading),
        }
    }

    /// Rotate an absolute vector into the local frame.
    pub fn rotate_to_local(&self, x: f64, y: f64) -> (f64, f64) {
        // R(-heading) * v
        (self.cos * x + self.sin * y, -self.sin * x + self.cos * y)
    }
}
