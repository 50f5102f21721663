//! Cells: the spatial partitions of the world
//!
//! A [`Cell`] owns the membership of one partition: the full objects
//! standing in it, the shadow proxies used for collision, its lights and
//! clip planes, and the voyeur table of observers that want presence
//! notifications. Geometry lives in the tagged [`CellKind`]: outdoor
//! [`LandCell`]s on the landblock grid and indoor [`EnvCell`]s linked by
//! portals.

use log::trace;
use serde::{Deserialize, Serialize};

use super::ids::{CellId, LandblockId, CELL_LENGTH};
use super::landscape::{bilinear, OutdoorRegion, WaterType};
use super::position::Position;
use super::shadow::{ShadowList, ShadowProxy};
use crate::events::{DetectionEvent, DetectionType};
use crate::foundation::math::Vec3;
use crate::physics::{Aabb, ObjectId, ObjectRegistry, SimObject, Sphere, TransitionState};

/// Water depth reported for cells that are entirely water
pub const ENTIRELY_WATER_DEPTH: f32 = 0.9;

/// Water depth reported for partial-water cells with no landblock attached
pub const DEFAULT_PARTIAL_WATER_DEPTH: f32 = 0.1;

/// Something a sweep may spill into from a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitTarget {
    /// A linked cell
    Cell(CellId),
    /// The outdoor cells around the sweep
    Outside,
}

/// Geometry a cell kind provides
///
/// Points and spheres are in the landblock frame of the cell being asked.
/// The defaults describe a partition with no geometry at all.
pub trait CellGeometry {
    /// True when `point` lies inside the cell
    fn point_in_cell(&self, _point: Vec3) -> bool {
        false
    }

    /// Report cells the spheres may spill into from this one
    fn find_transit_cells(&self, _spheres: &[Sphere], _found: &mut Vec<TransitTarget>) {}

    /// Collision of the spheres against the cell's own surfaces
    fn find_env_collisions(&self, _spheres: &[Sphere]) -> TransitionState {
        TransitionState::Invalid
    }
}

/// Outdoor cell: one square of a landblock's grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandCell {
    cx: u32,
    cy: u32,
    corners: [f32; 4],
}

impl LandCell {
    /// Land cell at grid column `cx`, row `cy` with corner heights `[sw, se, nw, ne]`
    pub const fn new(cx: u32, cy: u32, corners: [f32; 4]) -> Self {
        Self { cx, cy, corners }
    }

    /// South-west corner in the landblock frame
    pub fn min_corner(&self) -> Vec3 {
        Vec3::new(self.cx as f32 * CELL_LENGTH, self.cy as f32 * CELL_LENGTH, 0.0)
    }

    /// Terrain height under a point inside the cell
    pub fn terrain_height(&self, point: Vec3) -> f32 {
        let min = self.min_corner();
        let fx = ((point.x - min.x) / CELL_LENGTH).clamp(0.0, 1.0);
        let fy = ((point.y - min.y) / CELL_LENGTH).clamp(0.0, 1.0);
        bilinear(self.corners, fx, fy)
    }
}

impl CellGeometry for LandCell {
    fn point_in_cell(&self, point: Vec3) -> bool {
        let min = self.min_corner();
        (min.x..min.x + CELL_LENGTH).contains(&point.x)
            && (min.y..min.y + CELL_LENGTH).contains(&point.y)
    }

    fn find_env_collisions(&self, spheres: &[Sphere]) -> TransitionState {
        let below_ground = spheres
            .iter()
            .filter(|s| self.point_in_cell(s.center))
            .any(|s| s.bottom() < self.terrain_height(s.center));

        if below_ground {
            TransitionState::Collided
        } else {
            TransitionState::Ok
        }
    }
}

/// Opening from an indoor cell into a neighbour or the outdoors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    /// Cell on the other side; `None` leads outside
    pub other_cell: Option<CellId>,
    /// Box covering the opening, landblock frame
    pub opening: Aabb,
}

/// Indoor cell: a box of space joined to others through portals
#[derive(Debug, Clone, PartialEq)]
pub struct EnvCell {
    /// Interior volume, landblock frame
    pub bounds: Aabb,
    /// Openings to linked cells
    pub portals: Vec<Portal>,
    /// Cells declared visible from this one
    pub visible_cells: Vec<CellId>,
    /// Whether the outdoors can be seen from inside
    pub seen_outside: bool,
}

impl EnvCell {
    /// Indoor cell with the given volume and no links
    pub const fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            portals: Vec::new(),
            visible_cells: Vec::new(),
            seen_outside: false,
        }
    }

    /// True if `cell` is in the declared visible list
    pub fn is_visible(&self, cell: CellId) -> bool {
        self.visible_cells.contains(&cell)
    }
}

impl CellGeometry for EnvCell {
    fn point_in_cell(&self, point: Vec3) -> bool {
        self.bounds.contains_point(point)
    }

    fn find_transit_cells(&self, spheres: &[Sphere], found: &mut Vec<TransitTarget>) {
        for portal in &self.portals {
            if !spheres.iter().any(|s| s.intersects_aabb(&portal.opening)) {
                continue;
            }
            let target = match portal.other_cell {
                Some(cell) => TransitTarget::Cell(cell),
                None => TransitTarget::Outside,
            };
            if !found.contains(&target) {
                found.push(target);
            }
        }
    }

    fn find_env_collisions(&self, spheres: &[Sphere]) -> TransitionState {
        let floor = self.bounds.min.z;
        let through_floor = spheres.iter().any(|s| {
            let over_floor = (self.bounds.min.x..=self.bounds.max.x).contains(&s.center.x)
                && (self.bounds.min.y..=self.bounds.max.y).contains(&s.center.y);
            over_floor && s.bottom() < floor
        });

        if through_floor {
            TransitionState::Collided
        } else {
            TransitionState::Ok
        }
    }
}

/// Geometry variant of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Partition with no geometry model
    Bare,
    /// Outdoor land cell
    Outdoor(LandCell),
    /// Indoor environment cell
    Indoor(EnvCell),
}

impl CellGeometry for CellKind {
    fn point_in_cell(&self, point: Vec3) -> bool {
        match self {
            Self::Bare => false,
            Self::Outdoor(land) => land.point_in_cell(point),
            Self::Indoor(env) => env.point_in_cell(point),
        }
    }

    fn find_transit_cells(&self, spheres: &[Sphere], found: &mut Vec<TransitTarget>) {
        // Outdoor cells are enumerated up front by the region
        if let Self::Indoor(env) = self {
            env.find_transit_cells(spheres, found);
        }
    }

    fn find_env_collisions(&self, spheres: &[Sphere]) -> TransitionState {
        match self {
            Self::Bare => TransitionState::Invalid,
            Self::Outdoor(land) => land.find_env_collisions(spheres),
            Self::Indoor(env) => env.find_env_collisions(spheres),
        }
    }
}

/// Plane clipping what is drawn or tested inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlane {
    /// Unit normal
    pub normal: Vec3,
    /// Signed distance from the landblock origin
    pub distance: f32,
}

/// One spatial partition
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    /// Water classification
    pub water_type: WaterType,
    /// Reference position of the cell
    pub pos: Position,
    objects: Vec<ObjectId>,
    shadows: ShadowList,
    lights: Vec<ObjectId>,
    clip_planes: Vec<ClipPlane>,
    voyeur_table: Option<Vec<ObjectId>>,
    landblock: Option<LandblockId>,
    kind: CellKind,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cell {}

impl Cell {
    /// Bare cell with an empty voyeur table
    pub fn new(id: CellId) -> Self {
        Self {
            id,
            water_type: WaterType::NotWater,
            pos: Position::new(id, Vec3::zeros()),
            objects: Vec::new(),
            shadows: ShadowList::new(),
            lights: Vec::new(),
            clip_planes: Vec::new(),
            voyeur_table: Some(Vec::new()),
            landblock: None,
            kind: CellKind::Bare,
        }
    }

    /// Outdoor cell attached to `landblock`
    pub fn outdoor(
        id: CellId,
        land: LandCell,
        water_type: WaterType,
        landblock: LandblockId,
    ) -> Self {
        let mut cell = Self::new(id);
        cell.pos = Position::new(id, land.min_corner());
        cell.water_type = water_type;
        cell.landblock = Some(landblock);
        cell.kind = CellKind::Outdoor(land);
        cell
    }

    /// Indoor cell
    pub fn indoor(id: CellId, env: EnvCell, water_type: WaterType) -> Self {
        let mut cell = Self::new(id);
        cell.pos = Position::new(id, env.bounds.min);
        cell.water_type = water_type;
        cell.kind = CellKind::Indoor(env);
        cell
    }

    /// Attach or detach the owning outdoor landblock
    pub fn set_landblock(&mut self, landblock: Option<LandblockId>) {
        self.landblock = landblock;
    }

    /// Cell identifier
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Owning outdoor landblock, if attached
    pub const fn landblock(&self) -> Option<LandblockId> {
        self.landblock
    }

    /// Geometry variant
    pub const fn kind(&self) -> &CellKind {
        &self.kind
    }

    /// Indoor geometry, if this is an indoor cell
    pub const fn env(&self) -> Option<&EnvCell> {
        match &self.kind {
            CellKind::Indoor(env) => Some(env),
            _ => None,
        }
    }

    /// Full objects in insertion order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Number of full objects
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// Shadow proxies
    pub const fn shadows(&self) -> &ShadowList {
        &self.shadows
    }

    /// Number of shadow proxies
    pub fn num_shadow_objects(&self) -> usize {
        self.shadows.len()
    }

    // ---- membership -------------------------------------------------------

    /// Add a full object and tell observers it entered
    ///
    /// Returns false, and notifies nobody, if the object is already here.
    pub fn add_object(&mut self, object: ObjectId, objects: &mut ObjectRegistry) -> bool {
        if self.objects.contains(&object) {
            return false;
        }
        self.objects.push(object);
        self.update_all_voyeur(object, DetectionType::EnteredDetection, true, objects);
        true
    }

    /// Remove a full object and tell observers it left
    ///
    /// Returns false if the object was not here; nothing is sent then.
    pub fn remove_object(&mut self, object: ObjectId, objects: &mut ObjectRegistry) -> bool {
        let Some(index) = self.objects.iter().position(|o| *o == object) else {
            return false;
        };
        self.objects.remove(index);
        self.update_all_voyeur(object, DetectionType::LeftDetection, true, objects);
        true
    }

    /// Tell observers an object here became hidden
    pub fn hide_object(&self, object: ObjectId, objects: &mut ObjectRegistry) -> usize {
        self.update_all_voyeur(object, DetectionType::LeftDetection, true, objects)
    }

    /// Tell observers an object here became visible again
    pub fn unhide_object(&self, object: ObjectId, objects: &mut ObjectRegistry) -> usize {
        self.update_all_voyeur(object, DetectionType::EnteredDetection, false, objects)
    }

    /// Deliver `kind` about `object` to every observer in the voyeur table
    ///
    /// Nothing is sent for an unresolvable or zero id, an attached object,
    /// or a cell without a voyeur table. A hidden object suppresses entered
    /// notifications; with `check_detection` off it suppresses everything.
    /// Returns the number of deliveries.
    pub fn update_all_voyeur(
        &self,
        object: ObjectId,
        kind: DetectionType,
        check_detection: bool,
        objects: &mut ObjectRegistry,
    ) -> usize {
        let Some(table) = &self.voyeur_table else {
            return 0;
        };
        let Some(subject) = objects.get(object) else {
            return 0;
        };
        if !subject.id().is_valid() || subject.is_attached() {
            return 0;
        }
        if subject.is_hidden() && (!check_detection || kind == DetectionType::EnteredDetection) {
            return 0;
        }

        let event = DetectionEvent::new(object, kind);
        let mut delivered = 0;
        for &voyeur_id in table {
            if voyeur_id == object || !voyeur_id.is_valid() {
                continue;
            }
            let Some(voyeur) = objects.get_mut(voyeur_id) else {
                trace!("Cell {}: voyeur {} no longer resolves", self.id, voyeur_id);
                continue;
            };
            voyeur.receive_detection_update(event);
            delivered += 1;
        }
        delivered
    }

    /// Linear scan for an object standing in this cell
    pub fn get_object<'a>(
        &self,
        id: ObjectId,
        objects: &'a ObjectRegistry,
    ) -> Option<&'a dyn SimObject> {
        let found = self.objects.iter().find(|o| **o == id)?;
        objects.get(*found)
    }

    /// True if the object stands in this cell
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    // ---- shadow proxies ---------------------------------------------------

    /// Place a proxy here and point it back at this cell
    ///
    /// Refused if the object already has a proxy in this cell.
    pub fn add_shadow_object(&mut self, mut proxy: ShadowProxy) -> bool {
        proxy.set_cell(Some(self.id));
        self.shadows.push(proxy)
    }

    /// Take an object's proxy out of this cell, clearing its back-reference
    pub fn remove_shadow_object(&mut self, object: ObjectId) -> Option<ShadowProxy> {
        let mut proxy = self.shadows.remove(object)?;
        proxy.set_cell(None);
        Some(proxy)
    }

    /// Release every proxy, front first, and have each object drop the parts
    /// it tracked for this cell. Returns how many were released.
    pub fn release_objects(&mut self, objects: &mut ObjectRegistry) -> usize {
        let mut released = 0;
        while let Some(first) = self.shadows.first().copied() {
            self.remove_shadow_object(first.object());
            if let Some(object) = objects.get_mut(first.object()) {
                object.remove_parts(self.id);
            }
            released += 1;
        }
        released
    }

    // ---- observers, lights, clip planes -----------------------------------

    /// Subscribe an observer; creates the table if absent
    pub fn add_voyeur(&mut self, voyeur: ObjectId) {
        let table = self.voyeur_table.get_or_insert_with(Vec::new);
        if !table.contains(&voyeur) {
            table.push(voyeur);
        }
    }

    /// Unsubscribe an observer
    pub fn remove_voyeur(&mut self, voyeur: ObjectId) -> bool {
        let Some(table) = self.voyeur_table.as_mut() else {
            return false;
        };
        let before = table.len();
        table.retain(|v| *v != voyeur);
        table.len() != before
    }

    /// Drop the voyeur table entirely
    pub fn clear_voyeur_table(&mut self) {
        self.voyeur_table = None;
    }

    /// Current observers, `None` when the cell has no table
    pub fn voyeur_table(&self) -> Option<&[ObjectId]> {
        self.voyeur_table.as_deref()
    }

    /// Register a light source
    pub fn add_light(&mut self, light: ObjectId) {
        if !self.lights.contains(&light) {
            self.lights.push(light);
        }
    }

    /// Unregister a light source
    pub fn remove_light(&mut self, light: ObjectId) -> bool {
        let before = self.lights.len();
        self.lights.retain(|l| *l != light);
        self.lights.len() != before
    }

    /// Light sources in this cell
    pub fn lights(&self) -> &[ObjectId] {
        &self.lights
    }

    /// Add a clip plane
    pub fn add_clip_plane(&mut self, plane: ClipPlane) {
        self.clip_planes.push(plane);
    }

    /// Clip planes
    pub fn clip_planes(&self) -> &[ClipPlane] {
        &self.clip_planes
    }

    // ---- geometry ---------------------------------------------------------

    /// True when a landblock-frame point lies in the cell
    pub fn point_in_cell(&self, point: Vec3) -> bool {
        self.kind.point_in_cell(point)
    }

    /// Cells the spheres (this cell's landblock frame) may spill into
    pub fn find_transit_cells(&self, spheres: &[Sphere]) -> Vec<TransitTarget> {
        let mut found = Vec::new();
        self.kind.find_transit_cells(spheres, &mut found);
        found
    }

    /// Water depth at a landblock-frame point
    pub fn get_water_depth(&self, point: Vec3, region: &dyn OutdoorRegion) -> f32 {
        match self.water_type {
            WaterType::NotWater => 0.0,
            WaterType::EntirelyWater => ENTIRELY_WATER_DEPTH,
            WaterType::PartiallyWater => self
                .landblock
                .and_then(|_| region.calc_water_depth(self.id, point))
                .unwrap_or(DEFAULT_PARTIAL_WATER_DEPTH),
        }
    }

    /// Water classification of the owning landblock
    pub fn get_block_water_type(&self, region: &dyn OutdoorRegion) -> WaterType {
        self.landblock
            .and_then(|block| region.block_water_type(block))
            .unwrap_or(WaterType::NotWater)
    }

    /// Ask every mobile, partly hidden object to recompute the neighbouring
    /// cells it spills into
    pub fn init_objects(&self, objects: &mut ObjectRegistry) -> usize {
        let mut recalculated = 0;
        for &id in &self.objects {
            let Some(object) = objects.get_mut(id) else {
                continue;
            };
            if !object.is_static() && !object.is_completely_visible() {
                object.recalc_cross_cells();
                recalculated += 1;
            }
        }
        recalculated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Body, PhysicsState};
    use crate::spatial::{Landblock, Landscape};
    use approx::assert_relative_eq;

    fn cell_id() -> CellId {
        LandblockId::new(0, 0).land_cell(0, 4)
    }

    fn register(objects: &mut ObjectRegistry, id: u32) {
        let body = Body::new(ObjectId::new(id), Position::new(cell_id(), Vec3::zeros()));
        assert!(objects.insert(Box::new(body)).is_ok());
    }

    fn detections(objects: &ObjectRegistry, id: u32) -> Vec<DetectionEvent> {
        objects
            .get_as::<Body>(ObjectId::new(id))
            .map(|b| b.detections().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_add_object_notifies_other_voyeurs_only() {
        let mut objects = ObjectRegistry::new();
        register(&mut objects, 10);
        register(&mut objects, 20);

        let mut cell = Cell::new(cell_id());
        for id in [10, 20, 0] {
            cell.add_voyeur(ObjectId::new(id));
        }

        assert!(cell.add_object(ObjectId::new(10), &mut objects));
        assert!(detections(&objects, 10).is_empty());
        assert_eq!(
            detections(&objects, 20),
            vec![DetectionEvent::new(ObjectId::new(10), DetectionType::EnteredDetection)]
        );
    }

    #[test]
    fn test_hidden_object_suppresses_entered_but_not_left() {
        let mut objects = ObjectRegistry::new();
        let hidden = Body::new(ObjectId::new(5), Position::new(cell_id(), Vec3::zeros()))
            .with_state(PhysicsState::HIDDEN);
        assert!(objects.insert(Box::new(hidden)).is_ok());
        register(&mut objects, 6);

        let mut cell = Cell::new(cell_id());
        cell.add_voyeur(ObjectId::new(6));

        cell.add_object(ObjectId::new(5), &mut objects);
        assert!(detections(&objects, 6).is_empty());

        cell.remove_object(ObjectId::new(5), &mut objects);
        assert_eq!(
            detections(&objects, 6),
            vec![DetectionEvent::new(ObjectId::new(5), DetectionType::LeftDetection)]
        );
    }

    #[test]
    fn test_attached_object_and_missing_table_send_nothing() {
        let mut objects = ObjectRegistry::new();
        let rider = Body::new(ObjectId::new(7), Position::new(cell_id(), Vec3::zeros()))
            .attached_to(ObjectId::new(99));
        assert!(objects.insert(Box::new(rider)).is_ok());
        register(&mut objects, 8);
        register(&mut objects, 9);

        let mut cell = Cell::new(cell_id());
        cell.add_voyeur(ObjectId::new(8));
        cell.add_object(ObjectId::new(7), &mut objects);
        assert!(detections(&objects, 8).is_empty());

        cell.clear_voyeur_table();
        cell.add_object(ObjectId::new(9), &mut objects);
        let left = DetectionType::LeftDetection;
        let sent = cell.update_all_voyeur(ObjectId::new(9), left, true, &mut objects);
        assert_eq!(sent, 0);
    }

    #[test]
    fn test_unresolvable_voyeur_is_skipped() {
        let mut objects = ObjectRegistry::new();
        register(&mut objects, 1);
        register(&mut objects, 2);

        let mut cell = Cell::new(cell_id());
        cell.add_voyeur(ObjectId::new(404));
        cell.add_voyeur(ObjectId::new(2));

        assert!(cell.add_object(ObjectId::new(1), &mut objects));
        assert_eq!(detections(&objects, 2).len(), 1);
    }

    #[test]
    fn test_hide_and_unhide() {
        let mut objects = ObjectRegistry::new();
        register(&mut objects, 1);
        register(&mut objects, 2);

        let mut cell = Cell::new(cell_id());
        cell.add_voyeur(ObjectId::new(2));
        cell.add_object(ObjectId::new(1), &mut objects);

        assert_eq!(cell.hide_object(ObjectId::new(1), &mut objects), 1);
        objects.get_as_mut::<Body>(ObjectId::new(1)).unwrap().state = PhysicsState::HIDDEN;
        // Still hidden: unhide is suppressed
        assert_eq!(cell.unhide_object(ObjectId::new(1), &mut objects), 0);

        objects.get_as_mut::<Body>(ObjectId::new(1)).unwrap().state = PhysicsState::empty();
        assert_eq!(cell.unhide_object(ObjectId::new(1), &mut objects), 1);

        let kinds: Vec<_> = detections(&objects, 2).iter().map(DetectionEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                DetectionType::EnteredDetection,
                DetectionType::LeftDetection,
                DetectionType::EnteredDetection,
            ]
        );
    }

    #[test]
    fn test_counts_never_drift() {
        let mut objects = ObjectRegistry::new();
        register(&mut objects, 1);
        register(&mut objects, 2);
        let mut cell = Cell::new(cell_id());

        let ops: [(bool, u32); 8] = [
            (true, 1), (true, 1), (false, 2), (true, 2),
            (false, 1), (false, 1), (true, 1), (false, 3),
        ];
        for (add, id) in ops {
            let id = ObjectId::new(id);
            if add {
                cell.add_object(id, &mut objects);
                cell.add_shadow_object(ShadowProxy::new(id));
            } else {
                cell.remove_object(id, &mut objects);
                cell.remove_shadow_object(id);
            }
            assert_eq!(cell.num_objects(), cell.objects().len());
            assert_eq!(cell.num_shadow_objects(), cell.shadows().snapshot().len());
        }
        assert_eq!(cell.objects(), &[ObjectId::new(2), ObjectId::new(1)]);
    }

    #[test]
    fn test_shadow_back_reference() {
        let mut cell = Cell::new(cell_id());
        assert!(cell.add_shadow_object(ShadowProxy::new(ObjectId::new(4))));
        assert!(!cell.add_shadow_object(ShadowProxy::new(ObjectId::new(4))));

        let stored = cell.shadows().first().copied().unwrap();
        assert_eq!(stored.cell(), Some(cell_id()));

        let removed = cell.remove_shadow_object(ObjectId::new(4)).unwrap();
        assert_eq!(removed.cell(), None);
        assert!(cell.remove_shadow_object(ObjectId::new(4)).is_none());
    }

    #[test]
    fn test_release_objects_detaches_parts() {
        let mut objects = ObjectRegistry::new();
        for id in [1, 2] {
            let mut body = Body::new(ObjectId::new(id), Position::new(cell_id(), Vec3::zeros()));
            body.add_part_cell(cell_id());
            assert!(objects.insert(Box::new(body)).is_ok());
        }

        let mut cell = Cell::new(cell_id());
        cell.add_shadow_object(ShadowProxy::new(ObjectId::new(1)));
        cell.add_shadow_object(ShadowProxy::new(ObjectId::new(2)));
        // A proxy whose object is gone is still released
        cell.add_shadow_object(ShadowProxy::new(ObjectId::new(3)));

        assert_eq!(cell.release_objects(&mut objects), 3);
        assert_eq!(cell.num_shadow_objects(), 0);
        for id in [1, 2] {
            assert!(objects.get_as::<Body>(ObjectId::new(id)).unwrap().part_cells().is_empty());
        }
    }

    #[test]
    fn test_get_object_scans_membership() {
        let mut objects = ObjectRegistry::new();
        register(&mut objects, 1);
        register(&mut objects, 2);

        let mut cell = Cell::new(cell_id());
        cell.add_object(ObjectId::new(1), &mut objects);

        assert!(cell.get_object(ObjectId::new(1), &objects).is_some());
        // Registered but not standing here
        assert!(cell.get_object(ObjectId::new(2), &objects).is_none());
    }

    #[test]
    fn test_water_depth_by_classification() {
        let landscape = Landscape::new();
        let mut cell = Cell::new(cell_id());
        let point = Vec3::new(1.0, 1.0, 0.0);

        assert_relative_eq!(cell.get_water_depth(point, &landscape), 0.0);

        cell.water_type = WaterType::EntirelyWater;
        assert_relative_eq!(cell.get_water_depth(point, &landscape), 0.9);

        cell.water_type = WaterType::PartiallyWater;
        assert_relative_eq!(cell.get_water_depth(point, &landscape), 0.1);
        assert_eq!(cell.get_block_water_type(&landscape), WaterType::NotWater);
    }

    #[test]
    fn test_partial_water_samples_landblock() {
        let block = LandblockId::new(2, 2);
        let mut shore = Landblock::flat(block, 1.0);
        shore.water_level = Some(3.5);
        shore.water_type = WaterType::PartiallyWater;
        let mut landscape = Landscape::new();
        landscape.load_landblock(shore);

        let id = block.land_cell(1, 1);
        let land = LandCell::new(1, 1, [1.0; 4]);
        let cell = Cell::outdoor(id, land, WaterType::PartiallyWater, block);
        let point = Vec3::new(30.0, 30.0, 0.0);

        assert_relative_eq!(cell.get_water_depth(point, &landscape), 2.5);
        assert_eq!(cell.get_block_water_type(&landscape), WaterType::PartiallyWater);

        // Attached to a landblock the region no longer holds
        assert_relative_eq!(cell.get_water_depth(point, &Landscape::new()), 0.1);
    }

    #[test]
    fn test_init_objects_only_touches_mobile_partly_visible() {
        let mut objects = ObjectRegistry::new();
        let mut mobile = Body::new(ObjectId::new(1), Position::new(cell_id(), Vec3::zeros()));
        mobile.completely_visible = false;
        let mut fixed = Body::new(ObjectId::new(2), Position::new(cell_id(), Vec3::zeros()))
            .with_state(PhysicsState::STATIC);
        fixed.completely_visible = false;
        let visible = Body::new(ObjectId::new(3), Position::new(cell_id(), Vec3::zeros()));
        for body in [mobile, fixed, visible] {
            assert!(objects.insert(Box::new(body)).is_ok());
        }

        let mut cell = Cell::new(cell_id());
        for id in 1..=3 {
            cell.add_object(ObjectId::new(id), &mut objects);
        }

        assert_eq!(cell.init_objects(&mut objects), 1);
        assert_eq!(objects.get_as::<Body>(ObjectId::new(1)).unwrap().cross_cell_recalcs(), 1);
        assert_eq!(objects.get_as::<Body>(ObjectId::new(2)).unwrap().cross_cell_recalcs(), 0);
    }

    #[test]
    fn test_bare_cell_has_no_geometry() {
        let cell = Cell::new(cell_id());
        assert!(!cell.point_in_cell(Vec3::zeros()));
        assert_eq!(cell.kind().find_env_collisions(&[]), TransitionState::Invalid);
        assert!(cell.find_transit_cells(&[Sphere::new(Vec3::zeros(), 100.0)]).is_empty());
    }

    #[test]
    fn test_env_cell_portals() {
        let bounds = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 4.0));
        let mut env = EnvCell::new(bounds);
        let next = LandblockId::new(0, 0).env_cell(0x101);
        env.portals.push(Portal {
            other_cell: Some(next),
            opening: Aabb::new(Vec3::new(10.0, 4.0, 0.0), Vec3::new(10.0, 6.0, 3.0)),
        });
        env.portals.push(Portal {
            other_cell: None,
            opening: Aabb::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 3.0)),
        });
        let cell = Cell::indoor(LandblockId::new(0, 0).env_cell(0x100), env, WaterType::NotWater);

        let near_east = [Sphere::new(Vec3::new(9.5, 5.0, 1.0), 1.0)];
        assert_eq!(cell.find_transit_cells(&near_east), vec![TransitTarget::Cell(next)]);

        let near_south = [Sphere::new(Vec3::new(5.0, 0.5, 1.0), 1.0)];
        assert_eq!(cell.find_transit_cells(&near_south), vec![TransitTarget::Outside]);

        let middle = [Sphere::new(Vec3::new(5.0, 5.0, 1.0), 1.0)];
        assert!(cell.find_transit_cells(&middle).is_empty());
        assert!(cell.point_in_cell(Vec3::new(5.0, 5.0, 1.0)));
    }
}
