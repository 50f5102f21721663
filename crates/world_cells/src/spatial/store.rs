//! Persistent store of indoor-cell archetypes
//!
//! Indoor cells are described by archetypes keyed by a namespace tag plus
//! the cell id. The cache materializes a live [`Cell`] from an archetype
//! the first time the id is resolved.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, ClipPlane, EnvCell, Portal};
use super::ids::CellId;
use super::landscape::WaterType;
use crate::physics::{Aabb, ObjectId};

/// Store key: namespace tag plus data id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedDataId {
    /// Namespace the id belongs to
    pub namespace: u32,
    /// Id within the namespace
    pub id: u32,
}

impl QualifiedDataId {
    /// Key for `id` in `namespace`
    pub const fn new(namespace: u32, id: u32) -> Self {
        Self { namespace, id }
    }
}

impl fmt::Display for QualifiedDataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{:08X}", self.namespace, self.id)
    }
}

/// Stored description of one indoor cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvCellArchetype {
    /// Cell the archetype materializes as
    pub id: CellId,
    /// Interior volume, landblock frame
    pub bounds: Aabb,
    /// Openings to linked cells
    #[serde(default)]
    pub portals: Vec<Portal>,
    /// Cells declared visible from this one
    #[serde(default)]
    pub visible_cells: Vec<CellId>,
    /// Whether the outdoors can be seen from inside
    #[serde(default)]
    pub seen_outside: bool,
    /// Water classification
    #[serde(default)]
    pub water_type: WaterType,
    /// Static light sources
    #[serde(default)]
    pub lights: Vec<ObjectId>,
    /// Clip planes
    #[serde(default)]
    pub clip_planes: Vec<ClipPlane>,
}

impl EnvCellArchetype {
    /// Archetype for a plain box with no links
    pub fn new(id: CellId, bounds: Aabb) -> Self {
        Self {
            id,
            bounds,
            portals: Vec::new(),
            visible_cells: Vec::new(),
            seen_outside: false,
            water_type: WaterType::NotWater,
            lights: Vec::new(),
            clip_planes: Vec::new(),
        }
    }

    /// Build a fresh live cell from the archetype
    pub fn instantiate(&self) -> Cell {
        let env = EnvCell {
            bounds: self.bounds,
            portals: self.portals.clone(),
            visible_cells: self.visible_cells.clone(),
            seen_outside: self.seen_outside,
        };
        let mut cell = Cell::indoor(self.id, env, self.water_type);
        for light in &self.lights {
            cell.add_light(*light);
        }
        for plane in &self.clip_planes {
            cell.add_clip_plane(*plane);
        }
        cell
    }
}

/// Store errors
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No archetype under this key
    #[error("No archetype for {0}")]
    NotFound(QualifiedDataId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Keyed source of indoor-cell archetypes
pub trait CellStore: Send + Sync {
    /// Fetch the archetype stored under `key`
    fn load(&self, key: QualifiedDataId) -> Result<EnvCellArchetype, StoreError>;
}

/// Map-backed archetype store
#[derive(Debug, Clone, Default)]
pub struct MemoryCellStore {
    archetypes: HashMap<QualifiedDataId, EnvCellArchetype>,
}

impl MemoryCellStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an archetype under `namespace`, replacing any previous entry
    pub fn insert(&mut self, namespace: u32, archetype: EnvCellArchetype) {
        let key = QualifiedDataId::new(namespace, archetype.id.raw());
        self.archetypes.insert(key, archetype);
    }

    /// Load a RON list of archetypes into `namespace`
    pub fn load_from_file(path: &str, namespace: u32) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_ron(&contents, namespace)?;
        debug!("Loaded {} cell archetypes from {}", store.len(), path);
        Ok(store)
    }

    /// Parse a RON list of archetypes into `namespace`
    pub fn from_ron(contents: &str, namespace: u32) -> Result<Self, StoreError> {
        let list: Vec<EnvCellArchetype> =
            ron::from_str(contents).map_err(|e| StoreError::Parse(e.to_string()))?;
        let mut store = Self::new();
        for archetype in list {
            store.insert(namespace, archetype);
        }
        Ok(store)
    }

    /// Number of stored archetypes
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl CellStore for MemoryCellStore {
    fn load(&self, key: QualifiedDataId) -> Result<EnvCellArchetype, StoreError> {
        self.archetypes.get(&key).cloned().ok_or(StoreError::NotFound(key))
    }
}
