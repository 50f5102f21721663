//! Simulated objects as seen by the cell core
//!
//! Cells never own objects. They hold [`ObjectId`]s and reach the objects
//! through an [`ObjectRegistry`](super::ObjectRegistry), asking them for the
//! capabilities in [`SimObject`]. [`Body`] is the stock implementation: a
//! set of spheres placed by a [`Position`].

use std::any::Any;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::attack::{AttackCone, HitLocation};
use super::outcome::TransitionState;
use super::primitives::Sphere;
use crate::events::DetectionEvent;
use crate::foundation::math::Vec2;
use crate::spatial::{block_offset, CellId, Position, SweepDescriptor};

/// Stable identifier of a simulated object; 0 is "no object"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    /// The invalid sentinel
    pub const NONE: Self = Self(0);

    /// Wrap a raw id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// False for the zero sentinel
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

bitflags! {
    /// Physics state flags relevant to cell membership and collision
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PhysicsState: u32 {
        /// Never moves; always collides even when a sweep has a target
        const STATIC = 0x0001;
        /// Passes through everything
        const ETHEREAL = 0x0004;
        /// Not detectable by observers
        const HIDDEN = 0x0020;
    }
}

/// Capabilities the cell core needs from a simulated object
///
/// Implementations own their geometry and their reaction to events; the
/// cell core only decides who gets asked. Objects live in a registry that
/// hosts share across threads, so they must be `Send + Sync`.
pub trait SimObject: Any + Send + Sync {
    /// Object identifier
    fn id(&self) -> ObjectId;

    /// Object this one is attached to, if any
    fn parent(&self) -> Option<ObjectId>;

    /// Current physics state flags
    fn state(&self) -> PhysicsState;

    /// Where the object is
    fn position(&self) -> &Position;

    /// Collision spheres in the landblock frame of `position().cell`
    fn global_spheres(&self) -> Vec<Sphere>;

    /// Whether the object carries extended world-object data
    fn has_world_data(&self) -> bool {
        false
    }

    /// Fine collision test against a moving sweep
    fn find_obj_collisions(&self, sweep: &SweepDescriptor) -> TransitionState;

    /// Fine overlap test against another object
    fn check_collision(&self, other: &dyn SimObject) -> bool;

    /// Cone/radius melee test; an empty location means a miss
    fn check_attack(
        &self,
        attacker_pos: &Position,
        attacker_scale: f32,
        cone: &AttackCone,
        attack_radius: f32,
    ) -> HitLocation;

    /// Drop any per-cell parts tracked for `cell`
    fn remove_parts(&mut self, cell: CellId);

    /// Deliver a presence notification
    fn receive_detection_update(&mut self, event: DetectionEvent);

    /// True when every part of the object is visible from its cell
    fn is_completely_visible(&self) -> bool {
        true
    }

    /// Recompute which neighbouring cells the object spills into
    fn recalc_cross_cells(&mut self) {}

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// True when attached to a parent
    fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// True when flagged static
    fn is_static(&self) -> bool {
        self.state().contains(PhysicsState::STATIC)
    }

    /// True when flagged hidden
    fn is_hidden(&self) -> bool {
        self.state().contains(PhysicsState::HIDDEN)
    }
}

/// Stock sphere-bodied object
#[derive(Debug, Clone)]
pub struct Body {
    id: ObjectId,
    parent: Option<ObjectId>,
    /// Physics state flags
    pub state: PhysicsState,
    /// Current position
    pub position: Position,
    /// Collision spheres in the body's local frame
    pub spheres: Vec<Sphere>,
    /// Whether extended world-object data is attached
    pub world_data: bool,
    /// Whether all parts are visible from the current cell
    pub completely_visible: bool,
    part_cells: Vec<CellId>,
    detections: Vec<DetectionEvent>,
    cross_cell_recalcs: u32,
}

impl Body {
    /// New body at `position` with no spheres
    pub fn new(id: ObjectId, position: Position) -> Self {
        Self {
            id,
            parent: None,
            state: PhysicsState::empty(),
            position,
            spheres: Vec::new(),
            world_data: false,
            completely_visible: true,
            part_cells: Vec::new(),
            detections: Vec::new(),
            cross_cell_recalcs: 0,
        }
    }

    /// Add a local-frame collision sphere
    #[must_use]
    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.spheres.push(sphere);
        self
    }

    /// Replace the state flags
    #[must_use]
    pub fn with_state(mut self, state: PhysicsState) -> Self {
        self.state = state;
        self
    }

    /// Attach to `parent`
    #[must_use]
    pub fn attached_to(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Mark as carrying world-object data
    #[must_use]
    pub fn with_world_data(mut self) -> Self {
        self.world_data = true;
        self
    }

    /// Detach from any parent
    pub fn detach(&mut self) {
        self.parent = None;
    }

    /// Start tracking parts in `cell`
    pub fn add_part_cell(&mut self, cell: CellId) {
        if !self.part_cells.contains(&cell) {
            self.part_cells.push(cell);
        }
    }

    /// Cells the body currently tracks parts in
    pub fn part_cells(&self) -> &[CellId] {
        &self.part_cells
    }

    /// Notifications received so far
    pub fn detections(&self) -> &[DetectionEvent] {
        &self.detections
    }

    /// Forget received notifications
    pub fn clear_detections(&mut self) {
        self.detections.clear();
    }

    /// How many times cross-cell membership was recomputed
    pub const fn cross_cell_recalcs(&self) -> u32 {
        self.cross_cell_recalcs
    }

    /// Largest horizontal reach of the body's spheres from its origin
    fn horizontal_radius(&self) -> f32 {
        self.spheres
            .iter()
            .map(|s| Vec2::new(s.center.x, s.center.y).magnitude() + s.radius)
            .fold(0.0, f32::max)
    }

    /// Spheres expressed in the landblock frame of `frame_cell`
    fn spheres_in_frame_of(&self, frame_cell: CellId) -> impl Iterator<Item = Sphere> + '_ {
        let offset = block_offset(frame_cell, self.position.cell);
        self.spheres.iter().map(move |s| {
            Sphere::new(self.position.local_to_global(s.center) + offset, s.radius)
        })
    }
}

impl SimObject for Body {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    fn state(&self) -> PhysicsState {
        self.state
    }

    fn position(&self) -> &Position {
        &self.position
    }

    fn global_spheres(&self) -> Vec<Sphere> {
        self.spheres_in_frame_of(self.position.cell).collect()
    }

    fn has_world_data(&self) -> bool {
        self.world_data
    }

    fn find_obj_collisions(&self, sweep: &SweepDescriptor) -> TransitionState {
        if self.state.contains(PhysicsState::ETHEREAL) {
            return TransitionState::Ok;
        }

        let frame_cell = sweep.check_pos.cell;
        let hit = self
            .spheres_in_frame_of(frame_cell)
            .any(|mine| sweep.global_spheres.iter().any(|moving| mine.intersects(moving)));

        if hit {
            TransitionState::Collided
        } else {
            TransitionState::Ok
        }
    }

    fn check_collision(&self, other: &dyn SimObject) -> bool {
        if self.state.contains(PhysicsState::ETHEREAL) {
            return false;
        }

        let frame_cell = other.position().cell;
        let theirs = other.global_spheres();
        self.spheres_in_frame_of(frame_cell)
            .any(|mine| theirs.iter().any(|t| mine.intersects(t)))
    }

    fn check_attack(
        &self,
        attacker_pos: &Position,
        attacker_scale: f32,
        cone: &AttackCone,
        attack_radius: f32,
    ) -> HitLocation {
        // Target origin in the attacker's local frame, +Y facing
        let origin = self.position.origin_in_frame_of(attacker_pos.cell);
        let local = attacker_pos.global_to_local(origin);

        let flat = Vec2::new(local.x, local.y);
        let distance = flat.magnitude();
        let reach = attack_radius.max(cone.radius) * attacker_scale + self.horizontal_radius();
        if distance > reach {
            return HitLocation::empty();
        }
        if distance > f32::EPSILON && !cone.contains_direction(flat / distance) {
            return HitLocation::empty();
        }

        let band = cone.height * attacker_scale;
        if band <= 0.0 || local.z > band || local.z < -band {
            return HitLocation::empty();
        }

        // A target below the attacker is struck high, one above is struck low
        let fraction = (local.z + band) / (2.0 * band);
        let height = if fraction < 1.0 / 3.0 {
            HitLocation::HIGH
        } else if fraction < 2.0 / 3.0 {
            HitLocation::MEDIUM
        } else {
            HitLocation::LOW
        };
        let side = if local.x < 0.0 {
            HitLocation::LEFT
        } else {
            HitLocation::RIGHT
        };

        height | side
    }

    fn remove_parts(&mut self, cell: CellId) {
        self.part_cells.retain(|c| *c != cell);
    }

    fn receive_detection_update(&mut self, event: DetectionEvent) {
        self.detections.push(event);
    }

    fn is_completely_visible(&self) -> bool {
        self.completely_visible
    }

    fn recalc_cross_cells(&mut self) {
        self.cross_cell_recalcs += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
