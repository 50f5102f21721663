//! Primitive collision shapes and intersection tests
//!
//! Spheres are the unit of every sweep: movers are described by one or
//! more spheres, and cylinder-spheres are reduced to spheres before a
//! query runs.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Frame, Vec3};

/// A sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Sphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if this sphere touches an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Same sphere shifted by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.center + offset, self.radius)
    }

    /// Lowest point reached by the sphere along Z
    pub fn bottom(&self) -> f32 {
        self.center.z - self.radius
    }
}

/// A vertical cylinder described by its low point, radius and height
///
/// Sweeps only use the low point and radius; the height is kept for
/// callers that build spheres from creature shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylSphere {
    /// Bottom-center of the cylinder in the owner's local frame
    pub low_point: Vec3,
    /// Cylinder radius
    pub radius: f32,
    /// Cylinder height
    pub height: f32,
}

impl CylSphere {
    /// Creates a new cylinder-sphere
    pub const fn new(low_point: Vec3, radius: f32, height: f32) -> Self {
        Self {
            low_point,
            radius,
            height,
        }
    }

    /// Convert into a sphere placed through `frame`
    pub fn to_global_sphere(&self, frame: &Frame) -> Sphere {
        Sphere::new(frame.local_to_global(self.low_point), self.radius)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if this AABB contains a point (bounds inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Same box shifted by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_touching_counts_as_intersection() {
        let a = Sphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let b = Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = Sphere::new(Vec3::new(2.1, 0.0, 0.0), 1.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_sphere_aabb_intersection() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));

        assert!(Sphere::new(Vec3::new(5.0, 5.0, 5.0), 0.5).intersects_aabb(&aabb));
        assert!(Sphere::new(Vec3::new(-0.5, 5.0, 5.0), 1.0).intersects_aabb(&aabb));
        assert!(!Sphere::new(Vec3::new(-2.0, 5.0, 5.0), 1.0).intersects_aabb(&aabb));
    }

    #[test]
    fn test_cyl_sphere_uses_low_point() {
        let frame = Frame::from_origin(Vec3::new(100.0, 50.0, 10.0));
        let cyl = CylSphere::new(Vec3::new(0.0, 0.0, 0.5), 0.35, 1.8);

        let sphere = cyl.to_global_sphere(&frame);
        assert_relative_eq!(sphere.center, Vec3::new(100.0, 50.0, 10.5));
        assert_relative_eq!(sphere.radius, 0.35);
    }
}
