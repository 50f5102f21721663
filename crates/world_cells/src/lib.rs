//! # World Cells
//!
//! Authoritative cell partitioning for a persistent 3D world server.
//!
//! ## Features
//!
//! - **Cells**: object membership, shadow proxies and presence notifications
//! - **Resolution Cache**: lazy materialization of outdoor and indoor cells
//! - **Sweep Queries**: the set of cells a moving volume may touch
//! - **Collision & Attack**: broad-phase filtering over shadow proxies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use world_cells::prelude::*;
//!
//! let mut landscape = Landscape::new();
//! let block = LandblockId::new(0xA9, 0xB4);
//! landscape.load_landblock(Landblock::flat(block, 0.0));
//!
//! let store = Box::new(MemoryCellStore::new());
//! let mut cache = CellCache::new(landscape, store, SpatialConfig::default());
//! cache.load_landblock_cells(block);
//!
//! let position = Position::new(block.land_cell(2, 2), Vec3::new(60.0, 60.0, 0.0));
//! let mut sweep = SweepDescriptor::new(position, InsertType::Transition)
//!     .with_local_sphere(Sphere::new(Vec3::new(0.0, 0.0, 0.5), 0.5));
//! let mut cells = CellArray::new();
//! let current = cache.find_cell_list_for_path(&mut sweep, &mut cells);
//! assert_eq!(current, Some(block.land_cell(2, 2)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for cell-core users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SpatialConfig},
        events::{DetectionEvent, DetectionType},
        foundation::math::{Frame, Vec3},
        physics::{
            AttackCone, AttackInfo, Body, CylSphere, HitLocation, ObjectId, ObjectRegistry,
            PhysicsState, SimObject, Sphere, TransitionState,
        },
        spatial::{
            Cell, CellArray, CellCache, CellId, EnvCellArchetype, InsertType, Landblock,
            LandblockId, Landscape, MemoryCellStore, Position, ShadowProxy, SweepDescriptor,
        },
    };
}
