//! Math utilities and types
//!
//! Provides the vector and rotation types used by the cell core, plus the
//! rigid frame that places a position inside a landblock.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Quaternion, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid frame: an origin and an orientation inside a landblock
///
/// Unlike a render transform there is no scale; object scale is carried
/// separately by the objects that need it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Origin in landblock-local coordinates
    pub origin: Vec3,

    /// Orientation of the frame
    pub orientation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            origin: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }
}

impl Frame {
    /// Create a frame with only an origin
    pub fn from_origin(origin: Vec3) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    /// Create a frame rotated about +Z by `heading` radians
    pub fn from_heading(origin: Vec3, heading: f32) -> Self {
        Self {
            origin,
            orientation: Quat::from_axis_angle(&Vec3::z_axis(), heading),
        }
    }

    /// Map a point from this frame's local space into the landblock frame
    pub fn local_to_global(&self, point: Vec3) -> Vec3 {
        self.origin + self.orientation * point
    }

    /// Map a point from the landblock frame into this frame's local space
    pub fn global_to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.origin)
    }
}
