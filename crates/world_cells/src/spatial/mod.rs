//! Spatial partitioning of the world into cells
//!
//! Cells hold object membership and shadow proxies; the [`CellCache`]
//! resolves ids to live cells; sweeps gather the cells a moving volume may
//! touch and run collision and attack queries over them.

pub mod cell;
pub mod cell_array;
pub mod cell_cache;
pub mod collision;
pub mod ids;
pub mod landscape;
pub mod position;
pub mod shadow;
pub mod store;
pub mod sweep;


pub use cell::{Cell, CellGeometry, CellKind, ClipPlane, EnvCell, LandCell, Portal, TransitTarget};
pub use cell_array::CellArray;
pub use cell_cache::CellCache;
pub use ids::{block_offset, CellId, LandblockId, BLOCK_LENGTH, CELL_LENGTH};
pub use landscape::{Landblock, Landscape, OutdoorRegion, WaterType};
pub use position::Position;
pub use shadow::{ShadowList, ShadowProxy, ShadowSnapshot};
pub use store::{CellStore, EnvCellArchetype, MemoryCellStore, QualifiedDataId, StoreError};
pub use sweep::{CellListResult, InsertType, SweepDescriptor};
