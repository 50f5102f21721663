//! Cell resolution cache
//!
//! Maps cell ids to live cells. Indoor cells are materialized from the
//! archetype store the first time they are resolved and stay resident
//! until their landblock is unloaded; outdoor cells are built from the
//! outdoor region when their landblock is loaded.
//!
//! Materialization needs `&mut CellCache`, so first materialization of an
//! id is serialized by ownership. A host that runs queries from more than
//! one thread shares the cache behind a lock.

use std::collections::HashMap;

use log::{debug, trace, warn};

use super::cell::Cell;
use super::ids::{CellId, LandblockId, CELLS_PER_SIDE};
use super::landscape::{Landscape, OutdoorRegion};
use super::store::{CellStore, QualifiedDataId, StoreError};
use crate::config::SpatialConfig;
use crate::foundation::math::Vec3;
use crate::physics::ObjectRegistry;

/// Process-wide index of live cells
pub struct CellCache<R: OutdoorRegion = Landscape> {
    region: R,
    store: Box<dyn CellStore>,
    config: SpatialConfig,
    cells: HashMap<CellId, Cell>,
}

impl<R: OutdoorRegion> CellCache<R> {
    /// Create an empty cache over an outdoor region and an archetype store
    pub fn new(region: R, store: Box<dyn CellStore>, config: SpatialConfig) -> Self {
        Self {
            region,
            store,
            config,
            cells: HashMap::new(),
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Outdoor region
    pub const fn region(&self) -> &R {
        &self.region
    }

    /// Outdoor region for mutation (loading landblocks)
    pub fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }

    /// Resolve an id to a live cell, materializing it if needed
    ///
    /// Id 0 resolves to nothing. Indoor ids come from the archetype store
    /// under the configured namespace; outdoor ids from the region. A
    /// resolved id stays resident, so repeated calls return the same cell.
    pub fn resolve(&mut self, id: CellId) -> Option<&mut Cell> {
        if id.is_null() {
            return None;
        }
        if !self.cells.contains_key(&id) {
            let cell = self.materialize(id)?;
            self.cells.insert(id, cell);
        }
        self.cells.get_mut(&id)
    }

    /// Look up a resident cell, outdoor or indoor, without materializing
    pub fn resolve_visible(&self, id: CellId) -> Option<&Cell> {
        if id.is_null() {
            return None;
        }
        self.cells.get(&id)
    }

    /// Resident cell by id
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Resident cell by id for mutation
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(&id)
    }

    /// True if the id is resident
    pub fn is_resident(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    /// Number of resident cells
    pub fn resident_count(&self) -> usize {
        self.cells.len()
    }

    /// Materialize every outdoor cell of a loaded landblock
    ///
    /// Returns how many cells are resident for it afterwards.
    pub fn load_landblock_cells(&mut self, landblock: LandblockId) -> usize {
        if !self.region.is_loaded(landblock) {
            return 0;
        }
        (0..CELLS_PER_SIDE)
            .flat_map(|cx| (0..CELLS_PER_SIDE).map(move |cy| (cx, cy)))
            .filter(|&(cx, cy)| self.resolve(landblock.land_cell(cx, cy)).is_some())
            .count()
    }

    /// Evict every resident cell of a landblock, releasing its proxies first
    pub fn unload_landblock(
        &mut self,
        landblock: LandblockId,
        objects: &mut ObjectRegistry,
    ) -> usize {
        let ids: Vec<CellId> =
            self.cells.keys().copied().filter(|id| id.landblock() == landblock).collect();
        for id in &ids {
            if let Some(mut cell) = self.cells.remove(id) {
                cell.release_objects(objects);
            }
        }
        debug!("Unloaded {} cells of landblock {}", ids.len(), landblock);
        ids.len()
    }

    /// Release every proxy and drop every resident cell
    pub fn clear(&mut self, objects: &mut ObjectRegistry) {
        for cell in self.cells.values_mut() {
            cell.release_objects(objects);
        }
        self.cells.clear();
    }

    /// Water depth at a landblock-frame point in a resident cell
    pub fn water_depth(&self, id: CellId, point: Vec3) -> Option<f32> {
        self.cells.get(&id).map(|cell| cell.get_water_depth(point, &self.region))
    }

    fn materialize(&self, id: CellId) -> Option<Cell> {
        if id.is_indoor() {
            let key = QualifiedDataId::new(self.config.env_cell_namespace, id.raw());
            return match self.store.load(key) {
                Ok(archetype) => {
                    trace!("Materialized indoor cell {}", id);
                    let mut cell = archetype.instantiate();
                    if cell.id() != id {
                        warn!("Archetype {} describes cell {}", key, cell.id());
                        return None;
                    }
                    if self.region.is_loaded(id.landblock()) {
                        cell.set_landblock(Some(id.landblock()));
                    }
                    Some(cell)
                }
                Err(StoreError::NotFound(_)) => {
                    debug!("No archetype for indoor cell {}", id);
                    None
                }
                Err(e) => {
                    warn!("Failed to load indoor cell {}: {}", id, e);
                    None
                }
            };
        }

        let cell = self.region.build_land_cell(id);
        if cell.is_some() {
            trace!("Materialized outdoor cell {}", id);
        }
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    use crate::physics::{Aabb, Body, ObjectId};
    use crate::spatial::landscape::Landblock;
    use crate::spatial::shadow::ShadowProxy;
    use crate::spatial::store::{EnvCellArchetype, MemoryCellStore};
    use crate::spatial::Position;

    fn block() -> LandblockId {
        LandblockId::new(0x12, 0x34)
    }

    fn cache() -> CellCache {
        let mut store = MemoryCellStore::new();
        let room = block().env_cell(0x100);
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(8.0, 8.0, 4.0));
        store.insert(3, EnvCellArchetype::new(room, bounds));

        let mut landscape = Landscape::new();
        landscape.load_landblock(Landblock::flat(block(), 0.0));
        CellCache::new(landscape, Box::new(store), SpatialConfig::default())
    }

    #[test]
    fn test_zero_id_resolves_to_nothing() {
        let mut cache = cache();
        assert!(cache.resolve(CellId::NULL).is_none());
        assert!(cache.resolve_visible(CellId::NULL).is_none());
        assert_eq!(cache.resident_count(), 0);
    }

    #[test]
    fn test_indoor_materialization_is_idempotent() {
        let mut cache = cache();
        let room = block().env_cell(0x100);
        let mut objects = ObjectRegistry::new();
        let body = Body::new(ObjectId::new(5), Position::new(room, Vec3::zeros()));
        assert!(objects.insert(Box::new(body)).is_ok());

        assert!(cache.resolve_visible(room).is_none());
        let cell = cache.resolve(room).unwrap();
        assert!(cell.env().is_some());
        cell.add_object(ObjectId::new(5), &mut objects);

        // Same logical cell, not a fresh copy
        assert_eq!(cache.resolve(room).unwrap().num_objects(), 1);
        assert_eq!(cache.resolve_visible(room).unwrap().num_objects(), 1);
        assert_eq!(cache.resident_count(), 1);
    }

    #[test]
    fn test_missing_archetype_and_unloaded_block() {
        let mut cache = cache();
        assert!(cache.resolve(block().env_cell(0x1FF)).is_none());
        assert!(cache.resolve(LandblockId::new(1, 1).land_cell(0, 0)).is_none());
        assert_eq!(cache.resident_count(), 0);
    }

    #[test]
    fn test_wrong_namespace_finds_nothing() {
        let config = SpatialConfig {
            env_cell_namespace: 9,
            ..SpatialConfig::default()
        };
        let mut store = MemoryCellStore::new();
        let room = block().env_cell(0x100);
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        store.insert(3, EnvCellArchetype::new(room, bounds));
        let mut cache = CellCache::new(Landscape::new(), Box::new(store), config);

        assert!(cache.resolve(room).is_none());
    }

    #[test]
    fn test_outdoor_cells_come_from_region() {
        let mut cache = cache();
        assert_eq!(cache.load_landblock_cells(block()), 64);
        let cell = cache.resolve_visible(block().land_cell(3, 4)).unwrap();
        assert_eq!(cell.landblock(), Some(block()));
        assert!(!cell.id().is_indoor());
    }

    #[test]
    fn test_shared_cache_materializes_once() {
        let cache = Mutex::new(cache());
        let objects = Mutex::new(ObjectRegistry::new());
        let room = block().env_cell(0x100);

        thread::scope(|scope| {
            for n in 1..=4 {
                let (cache, objects) = (&cache, &objects);
                scope.spawn(move || {
                    let id = ObjectId::new(n);
                    let mut objects = objects.lock().unwrap();
                    let body = Body::new(id, Position::new(room, Vec3::zeros()));
                    assert!(objects.insert(Box::new(body)).is_ok());
                    let mut cache = cache.lock().unwrap();
                    cache.resolve(room).unwrap().add_object(id, &mut objects);
                });
            }
        });

        let cache = cache.into_inner().unwrap();
        assert_eq!(cache.resident_count(), 1);
        assert_eq!(cache.resolve_visible(room).unwrap().num_objects(), 4);
    }

    #[test]
    fn test_unload_landblock_releases_proxies() {
        let mut cache = cache();
        let mut objects = ObjectRegistry::new();
        let outdoor = block().land_cell(0, 0);
        let mut body = Body::new(ObjectId::new(1), Position::new(outdoor, Vec3::zeros()));
        body.add_part_cell(outdoor);
        assert!(objects.insert(Box::new(body)).is_ok());

        cache.resolve(outdoor).unwrap().add_shadow_object(ShadowProxy::new(ObjectId::new(1)));
        cache.resolve(block().env_cell(0x100)).unwrap();
        let elsewhere = LandblockId::new(1, 1);
        cache.region_mut().load_landblock(Landblock::flat(elsewhere, 0.0));
        cache.resolve(elsewhere.land_cell(0, 0)).unwrap();

        assert_eq!(cache.unload_landblock(block(), &mut objects), 2);
        assert_eq!(cache.resident_count(), 1);
        assert!(objects.get_as::<Body>(ObjectId::new(1)).unwrap().part_cells().is_empty());

        cache.clear(&mut objects);
        assert_eq!(cache.resident_count(), 0);
    }
}
