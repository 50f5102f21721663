//! Melee attack volumes and hit accumulation

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::ObjectId;
use crate::foundation::math::Vec2;

bitflags! {
    /// Where on a target an attack landed
    ///
    /// An empty value means "no hit". A hit always carries exactly one
    /// height band and one side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HitLocation: u32 {
        /// Lower third of the attack height
        const LOW = 0x01;
        /// Middle third of the attack height
        const MEDIUM = 0x02;
        /// Upper third of the attack height
        const HIGH = 0x04;
        /// Target lies to the attacker's left
        const LEFT = 0x08;
        /// Target lies to the attacker's right (or dead ahead)
        const RIGHT = 0x10;
    }
}

/// Horizontal wedge and height band swept by a melee attack
///
/// Directions are in the attacker's local XY plane, where +Y is facing.
/// The wedge runs counter-clockwise from `right` to `left` and must be
/// narrower than a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackCone {
    /// Left edge of the wedge
    pub left: Vec2,
    /// Right edge of the wedge
    pub right: Vec2,
    /// Reach of the attack before attacker scale
    pub radius: f32,
    /// Height of the attack band before attacker scale
    pub height: f32,
}

impl AttackCone {
    /// Symmetric wedge of `half_angle` radians either side of facing
    pub fn symmetric(half_angle: f32, radius: f32, height: f32) -> Self {
        let (sin, cos) = half_angle.sin_cos();
        Self {
            left: Vec2::new(-sin, cos),
            right: Vec2::new(sin, cos),
            radius,
            height,
        }
    }

    /// True when `direction` lies inside the wedge
    pub fn contains_direction(&self, direction: Vec2) -> bool {
        cross(self.right, direction) >= 0.0 && cross(direction, self.left) >= 0.0
    }
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Accumulates every object struck by one attack
#[derive(Debug, Clone, Default)]
pub struct AttackInfo {
    /// Reach used for hit tests (already includes any weapon bonus)
    pub attack_radius: f32,
    hits: Vec<(ObjectId, HitLocation)>,
}

impl AttackInfo {
    /// Create an empty accumulator
    pub fn new(attack_radius: f32) -> Self {
        Self {
            attack_radius,
            hits: Vec::new(),
        }
    }

    /// Record a hit
    pub fn add_object(&mut self, object: ObjectId, location: HitLocation) {
        self.hits.push((object, location));
    }

    /// All recorded hits in the order they were found
    pub fn hits(&self) -> &[(ObjectId, HitLocation)] {
        &self.hits
    }

    /// Number of recorded hits
    pub fn num_objects(&self) -> usize {
        self.hits.len()
    }

    /// True if `object` was hit at least once
    pub fn was_hit(&self, object: ObjectId) -> bool {
        self.hits.iter().any(|(id, _)| *id == object)
    }

    /// Forget all hits, keeping the radius
    pub fn clear(&mut self) {
        self.hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_cone_contains_facing() {
        let cone = AttackCone::symmetric(0.5, 2.0, 1.0);

        assert!(cone.contains_direction(Vec2::new(0.0, 1.0)));
        assert!(cone.contains_direction(Vec2::new(0.3, 1.0).normalize()));
        assert!(!cone.contains_direction(Vec2::new(1.0, 0.0)));
        assert!(!cone.contains_direction(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn test_attack_info_keeps_every_hit() {
        let mut info = AttackInfo::new(1.5);
        info.add_object(ObjectId::new(7), HitLocation::HIGH | HitLocation::LEFT);
        info.add_object(ObjectId::new(9), HitLocation::LOW | HitLocation::RIGHT);

        assert_eq!(info.num_objects(), 2);
        assert!(info.was_hit(ObjectId::new(9)));
        assert!(!info.was_hit(ObjectId::new(8)));
    }
}
