//! Broad-phase collision and attack queries over a cell's shadow proxies
//!
//! Every walk takes a [`ShadowSnapshot`](super::shadow::ShadowSnapshot) up
//! front and evaluates candidates in snapshot order. Movement queries stop
//! at the first collision.

use log::trace;

use super::cell::{Cell, CellGeometry};
use super::ids::block_offset;
use super::position::Position;
use super::sweep::{InsertType, SweepDescriptor};
use crate::physics::{
    AttackCone, AttackInfo, ObjectId, ObjectRegistry, SimObject, Sphere, TransitionState,
};

impl Cell {
    /// Test a moving sweep against the objects shadowed in this cell
    ///
    /// Initial placement never collides. Attached objects and the mover are
    /// skipped. When the sweep names a target, mobile objects other than
    /// the target are passed through while static ones still block.
    pub fn find_obj_collisions(
        &self,
        sweep: &SweepDescriptor,
        objects: &ObjectRegistry,
    ) -> TransitionState {
        if sweep.insert_type == InsertType::InitialPlacement {
            return TransitionState::Ok;
        }

        for proxy in &self.shadows().snapshot() {
            let Some(candidate) = objects.get(proxy.object()) else {
                continue;
            };
            if candidate.is_attached() || Some(candidate.id()) == sweep.object {
                continue;
            }
            if let Some(target) = sweep.target {
                if !candidate.is_static() && candidate.id() != target {
                    continue;
                }
            }
            if candidate.find_obj_collisions(sweep).is_collided() {
                trace!("Cell {}: sweep blocked by {}", self.id(), candidate.id());
                return TransitionState::Collided;
            }
        }
        TransitionState::Ok
    }

    /// Hit-test every shadowed object against an attack cone
    ///
    /// The attacker and static objects are never struck. Every hit is
    /// appended to `info`; returns how many were added by this cell.
    pub fn check_attack(
        &self,
        attacker: ObjectId,
        attacker_pos: &Position,
        attacker_scale: f32,
        cone: &AttackCone,
        info: &mut AttackInfo,
        objects: &ObjectRegistry,
    ) -> usize {
        let before = info.num_objects();
        for proxy in &self.shadows().snapshot() {
            if proxy.object() == attacker {
                continue;
            }
            let Some(candidate) = objects.get(proxy.object()) else {
                continue;
            };
            if candidate.is_static() {
                continue;
            }
            let location =
                candidate.check_attack(attacker_pos, attacker_scale, cone, info.attack_radius);
            if !location.is_empty() {
                info.add_object(candidate.id(), location);
            }
        }
        info.num_objects() - before
    }

    /// True if any unattached object shadowed here overlaps `object`
    pub fn check_collisions(&self, object: &dyn SimObject, objects: &ObjectRegistry) -> bool {
        self.shadows().snapshot().iter().any(|proxy| {
            proxy.object() != object.id()
                && objects.get(proxy.object()).is_some_and(|candidate| {
                    !candidate.is_attached() && candidate.check_collision(object)
                })
        })
    }

    /// Whether the sweep's object may enter this cell at all
    pub fn check_entry_restrictions(
        &self,
        sweep: &SweepDescriptor,
        objects: &ObjectRegistry,
    ) -> TransitionState {
        let Some(object) = sweep.object.and_then(|id| objects.get(id)) else {
            return TransitionState::Collided;
        };
        if !object.has_world_data() {
            return TransitionState::Ok;
        }
        TransitionState::Ok
    }

    /// Collision of the sweep against the cell's own surfaces
    pub fn find_env_collisions(&self, sweep: &SweepDescriptor) -> TransitionState {
        let spheres = self.sweep_spheres_local(sweep);
        self.kind().find_env_collisions(&spheres)
    }

    /// Surfaces first, then objects
    ///
    /// A cell kind without a collision model reports `Invalid` and never
    /// reaches the object pass.
    pub fn find_collisions(
        &self,
        sweep: &SweepDescriptor,
        objects: &ObjectRegistry,
    ) -> TransitionState {
        match self.find_env_collisions(sweep) {
            TransitionState::Ok => self.find_obj_collisions(sweep, objects),
            other => other,
        }
    }

    /// Sweep spheres moved into this cell's landblock frame
    pub(crate) fn sweep_spheres_local(&self, sweep: &SweepDescriptor) -> Vec<Sphere> {
        let offset = block_offset(sweep.check_pos.cell, self.id());
        sweep.global_spheres.iter().map(|s| s.translated(-offset)).collect()
    }
}
