//! Sweep queries: which cells a moving volume may touch
//!
//! A sweep is anchored at a position and described by spheres in the
//! landblock frame of the anchor cell. [`CellCache::find_cell_list`] builds
//! the working set in six steps:
//!
//! 1. look up the anchor among resident cells
//! 2. an indoor anchor marks the sweep as indoor and is added directly
//! 3. an outdoor anchor adds every outdoor cell the spheres overlap
//! 4. each cell gathered so far adds the cells its portals lead to
//! 5. optionally, find the cell holding the first sphere's center
//! 6. an indoor anchor prunes cells it cannot see, unless `load_cells`
//!
//! The working set is never cleared here, so cells carried over from a
//! previous query are what step 6 removes.

use log::trace;

use super::cell::TransitTarget;
use super::cell_array::CellArray;
use super::cell_cache::CellCache;
use super::ids::{block_offset, CellId};
use super::landscape::OutdoorRegion;
use super::position::Position;
use crate::physics::{
    AttackCone, AttackInfo, CylSphere, ObjectId, ObjectRegistry, Sphere, TransitionState,
};

/// Why a sweep is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InsertType {
    /// Moving from one position to the next
    #[default]
    Transition,
    /// Placing an object that is already in the world
    Placement,
    /// Spawning an object; nothing is collision tested
    InitialPlacement,
}

/// A moving volume under test
#[derive(Debug, Clone, Default)]
pub struct SweepDescriptor {
    /// Position being checked
    pub check_pos: Position,
    /// Spheres in the landblock frame of `check_pos.cell`
    pub global_spheres: Vec<Sphere>,
    /// Why the sweep is run
    pub insert_type: InsertType,
    /// Object that is moving, if any
    pub object: Option<ObjectId>,
    /// Object the mover is heading for, if any
    pub target: Option<ObjectId>,
    /// Set once the sweep touches an indoor cell
    pub hits_interior_cell: bool,
}

impl SweepDescriptor {
    /// Sweep at `check_pos` with no spheres yet
    pub fn new(check_pos: Position, insert_type: InsertType) -> Self {
        Self {
            check_pos,
            insert_type,
            ..Self::default()
        }
    }

    /// Set the moving object
    #[must_use]
    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    /// Set the object the mover is heading for
    #[must_use]
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    /// Add a sphere given in the local frame of `check_pos`
    #[must_use]
    pub fn with_local_sphere(mut self, sphere: Sphere) -> Self {
        let center = self.check_pos.local_to_global(sphere.center);
        self.global_spheres.push(Sphere::new(center, sphere.radius));
        self
    }
}

/// What a cell-list query found besides the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellListResult {
    /// Cell holding the first sphere's center, when asked for
    pub current_cell: Option<CellId>,
    /// True when the query touched an indoor cell
    pub hits_interior_cell: bool,
}

impl<R: OutdoorRegion> CellCache<R> {
    /// Gather every cell the spheres around `position` may touch
    ///
    /// `spheres` are in the landblock frame of `position.cell`. With
    /// `find_current` set, the result also names the cell that holds the
    /// first sphere's center.
    pub fn find_cell_list(
        &mut self,
        position: &Position,
        spheres: &[Sphere],
        cells: &mut CellArray,
        find_current: bool,
    ) -> CellListResult {
        let mut result = CellListResult::default();
        let anchor_id = position.cell;
        cells.added_outside = false;
        if anchor_id.is_null() {
            return result;
        }

        let anchor_visible = self.resolve_visible(anchor_id).is_some();

        if anchor_id.is_indoor() {
            result.hits_interior_cell = true;
            if anchor_visible {
                cells.add_cell(anchor_id);
            }
        } else {
            self.region().add_all_outside_cells(position, spheres, cells);
            cells.added_outside = true;
        }

        if anchor_visible && !spheres.is_empty() {
            self.add_transit_cells(position, spheres, cells);
            if find_current {
                self.find_current_cell(position, spheres[0], cells, &mut result);
            }
        }

        if !cells.load_cells && anchor_id.is_indoor() {
            self.prune_unseen(anchor_id, cells);
        }
        result
    }

    /// Gather cells for one sphere given in the local frame of `position`
    pub fn find_cell_list_sphere(
        &mut self,
        position: &Position,
        sphere: &Sphere,
        cells: &mut CellArray,
    ) -> CellListResult {
        let global = Sphere::new(position.local_to_global(sphere.center), sphere.radius);
        self.find_cell_list(position, &[global], cells, false)
    }

    /// Gather cells for a cylinder-sphere body
    ///
    /// Inputs past `max_cylinder_spheres` are ignored; each remaining
    /// cylinder-sphere becomes the sphere at its low point.
    pub fn find_cell_list_cyl(
        &mut self,
        position: &Position,
        cylinders: &[CylSphere],
        cells: &mut CellArray,
    ) -> CellListResult {
        let limit = cylinders.len().min(self.config().max_cylinder_spheres);
        let spheres: Vec<Sphere> = cylinders[..limit]
            .iter()
            .map(|cyl| cyl.to_global_sphere(&position.frame))
            .collect();
        self.find_cell_list(position, &spheres, cells, false)
    }

    /// Gather cells for a sweep descriptor and return its current cell
    ///
    /// Sets `hits_interior_cell` on the descriptor when an indoor cell was
    /// touched; never clears it.
    pub fn find_cell_list_for_path(
        &mut self,
        sweep: &mut SweepDescriptor,
        cells: &mut CellArray,
    ) -> Option<CellId> {
        let position = sweep.check_pos;
        let result = self.find_cell_list(&position, &sweep.global_spheres, cells, true);
        if result.hits_interior_cell {
            sweep.hits_interior_cell = true;
        }
        result.current_cell
    }

    /// Run the collision pass of a sweep over every cell in `cells`
    ///
    /// Cells are tested in working-set order and the first collision wins.
    /// Cells with no collision model do not block.
    pub fn find_collisions_in(
        &self,
        sweep: &SweepDescriptor,
        cells: &CellArray,
        objects: &ObjectRegistry,
    ) -> TransitionState {
        let blocked = cells
            .ids()
            .iter()
            .filter_map(|id| self.get(*id))
            .any(|cell| cell.find_collisions(sweep, objects).is_collided());

        if blocked {
            TransitionState::Collided
        } else {
            TransitionState::Ok
        }
    }

    /// Hit-test an attack against every cell in `cells`
    pub fn check_attack_in(
        &self,
        attacker: ObjectId,
        attacker_pos: &Position,
        attacker_scale: f32,
        cone: &AttackCone,
        cells: &CellArray,
        info: &mut AttackInfo,
        objects: &ObjectRegistry,
    ) -> usize {
        cells
            .ids()
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|cell| {
                cell.check_attack(attacker, attacker_pos, attacker_scale, cone, info, objects)
            })
            .sum()
    }

    fn add_transit_cells(
        &mut self,
        position: &Position,
        spheres: &[Sphere],
        cells: &mut CellArray,
    ) {
        let gathered: Vec<CellId> = cells.ids().to_vec();
        for id in gathered {
            let offset = block_offset(position.cell, id);
            let local: Vec<Sphere> = spheres.iter().map(|s| s.translated(-offset)).collect();
            let Some(cell) = self.resolve(id) else {
                continue;
            };

            for target in cell.find_transit_cells(&local) {
                match target {
                    TransitTarget::Cell(next) => {
                        if self.resolve(next).is_some() {
                            cells.add_cell(next);
                        }
                    }
                    TransitTarget::Outside => {
                        self.region().add_all_outside_cells(position, spheres, cells);
                        cells.added_outside = true;
                    }
                }
            }
        }
    }

    fn find_current_cell(
        &mut self,
        position: &Position,
        first: Sphere,
        cells: &CellArray,
        result: &mut CellListResult,
    ) {
        for &id in cells.ids() {
            let point = first.center - block_offset(position.cell, id);
            let Some(cell) = self.resolve(id) else {
                continue;
            };
            if !cell.point_in_cell(point) {
                continue;
            }
            if id.is_indoor() {
                result.current_cell = Some(id);
                result.hits_interior_cell = true;
                break;
            }
            if result.current_cell.is_none() {
                result.current_cell = Some(id);
            }
        }
    }

    fn prune_unseen(&self, anchor_id: CellId, cells: &mut CellArray) {
        let anchor = self.resolve_visible(anchor_id).and_then(|cell| cell.env());
        let before = cells.len();
        cells.retain(|id| id == anchor_id || anchor.is_some_and(|env| env.is_visible(id)));
        if cells.len() != before {
            trace!("Pruned {} cells not visible from {}", before - cells.len(), anchor_id);
        }
    }
}
