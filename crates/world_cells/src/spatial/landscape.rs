//! Outdoor region service
//!
//! The outdoor world is a grid of landblocks, each an 8x8 grid of land
//! cells over a 9x9 heightfield. [`OutdoorRegion`] is the surface the cell
//! core consumes; [`Landscape`] is the in-memory implementation.

use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, LandCell};
use super::cell_array::CellArray;
use super::ids::{CellId, LandblockId, BLOCK_LENGTH, CELLS_PER_SIDE, CELL_LENGTH};
use super::position::Position;
use crate::foundation::math::Vec3;
use crate::physics::Sphere;

/// Heightfield vertices along one side of a landblock
pub const VERTICES_PER_SIDE: usize = CELLS_PER_SIDE as usize + 1;

/// Land cells along one side of the world
const WORLD_CELLS: i64 = 256 * CELLS_PER_SIDE as i64;

/// Water classification of a cell or landblock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WaterType {
    /// Dry
    #[default]
    NotWater,
    /// Some of the area is under water
    PartiallyWater,
    /// All of the area is under water
    EntirelyWater,
}

/// Outdoor-region capabilities the cell core consumes
pub trait OutdoorRegion: Send + Sync {
    /// True when the landblock is resident
    fn is_loaded(&self, landblock: LandblockId) -> bool;

    /// Build the outdoor cell `cell`; `None` if its landblock is not resident
    fn build_land_cell(&self, cell: CellId) -> Option<Cell>;

    /// Add every outdoor cell overlapped by `spheres` around `position`
    ///
    /// Spheres are in the landblock frame of `position.cell`. With no
    /// spheres the cell under the position's origin is added.
    fn add_all_outside_cells(&self, position: &Position, spheres: &[Sphere], cells: &mut CellArray);

    /// Water depth at `point` (landblock frame of `cell`), if sampled
    fn calc_water_depth(&self, cell: CellId, point: Vec3) -> Option<f32>;

    /// Water classification of a resident landblock
    fn block_water_type(&self, landblock: LandblockId) -> Option<WaterType>;
}

/// Bilinear blend of four corner heights (`[sw, se, nw, ne]`)
pub(crate) fn bilinear(corners: [f32; 4], fx: f32, fy: f32) -> f32 {
    let [sw, se, nw, ne] = corners;
    let south = sw + (se - sw) * fx;
    let north = nw + (ne - nw) * fx;
    south + (north - south) * fy
}

/// One resident landblock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landblock {
    id: LandblockId,
    heights: Vec<f32>,
    /// Surface height of standing water, if any
    pub water_level: Option<f32>,
    /// Block-wide water classification
    pub water_type: WaterType,
    cell_water: HashMap<u32, WaterType>,
}

impl Landblock {
    /// Flat landblock at `height`
    pub fn flat(id: LandblockId, height: f32) -> Self {
        Self {
            id,
            heights: vec![height; VERTICES_PER_SIDE * VERTICES_PER_SIDE],
            water_level: None,
            water_type: WaterType::NotWater,
            cell_water: HashMap::new(),
        }
    }

    /// Landblock id
    pub const fn id(&self) -> LandblockId {
        self.id
    }

    /// Set the height of heightfield vertex (`vx`, `vy`), each in 0..=8
    pub fn set_vertex_height(&mut self, vx: usize, vy: usize, height: f32) {
        if vx < VERTICES_PER_SIDE && vy < VERTICES_PER_SIDE {
            self.heights[vx * VERTICES_PER_SIDE + vy] = height;
        }
    }

    /// Override the water classification of one land cell
    pub fn set_cell_water(&mut self, cx: u32, cy: u32, water: WaterType) {
        self.cell_water.insert(cx * CELLS_PER_SIDE + cy, water);
    }

    /// Water classification of land cell (`cx`, `cy`)
    pub fn cell_water_type(&self, cx: u32, cy: u32) -> WaterType {
        self.cell_water
            .get(&(cx * CELLS_PER_SIDE + cy))
            .copied()
            .unwrap_or(self.water_type)
    }

    /// Corner heights (`[sw, se, nw, ne]`) of land cell (`cx`, `cy`)
    pub fn cell_corners(&self, cx: u32, cy: u32) -> [f32; 4] {
        let (x, y) = (cx as usize, cy as usize);
        let at = |vx: usize, vy: usize| self.heights[vx * VERTICES_PER_SIDE + vy];
        [at(x, y), at(x + 1, y), at(x, y + 1), at(x + 1, y + 1)]
    }

    /// Terrain height under a landblock-frame point
    pub fn terrain_height(&self, point: Vec3) -> f32 {
        let max_cell = (CELLS_PER_SIDE - 1) as f32;
        let gx = (point.x.clamp(0.0, BLOCK_LENGTH) / CELL_LENGTH).min(max_cell + 1.0);
        let gy = (point.y.clamp(0.0, BLOCK_LENGTH) / CELL_LENGTH).min(max_cell + 1.0);
        let cx = gx.floor().min(max_cell);
        let cy = gy.floor().min(max_cell);

        bilinear(self.cell_corners(cx as u32, cy as u32), gx - cx, gy - cy)
    }
}

/// In-memory outdoor world made of resident landblocks
#[derive(Debug, Clone, Default)]
pub struct Landscape {
    landblocks: HashMap<LandblockId, Landblock>,
}

impl Landscape {
    /// Empty landscape
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a landblock resident, replacing any previous copy
    pub fn load_landblock(&mut self, landblock: Landblock) {
        trace!("Loading landblock {}", landblock.id());
        self.landblocks.insert(landblock.id(), landblock);
    }

    /// Drop a resident landblock
    pub fn unload_landblock(&mut self, id: LandblockId) -> Option<Landblock> {
        self.landblocks.remove(&id)
    }

    /// Resident landblock by id
    pub fn landblock(&self, id: LandblockId) -> Option<&Landblock> {
        self.landblocks.get(&id)
    }

    /// Mutable resident landblock by id
    pub fn landblock_mut(&mut self, id: LandblockId) -> Option<&mut Landblock> {
        self.landblocks.get_mut(&id)
    }

    /// Number of resident landblocks
    pub fn len(&self) -> usize {
        self.landblocks.len()
    }

    /// True when nothing is resident
    pub fn is_empty(&self) -> bool {
        self.landblocks.is_empty()
    }

    fn add_cells_around(&self, base: (f32, f32), sphere: &Sphere, cells: &mut CellArray) {
        let Some((x_lo, x_hi)) = grid_span(base.0 + sphere.center.x, sphere.radius) else {
            return;
        };
        let Some((y_lo, y_hi)) = grid_span(base.1 + sphere.center.y, sphere.radius) else {
            return;
        };
        let side = i64::from(CELLS_PER_SIDE);

        for bx in x_lo / side..=x_hi / side {
            for by in y_lo / side..=y_hi / side {
                let block = LandblockId::new(bx as u8, by as u8);
                if !self.is_loaded(block) {
                    continue;
                }
                let (west, south) = (bx * side, by * side);
                for gx in x_lo.max(west)..=x_hi.min(west + side - 1) {
                    for gy in y_lo.max(south)..=y_hi.min(south + side - 1) {
                        cells.add_cell(block.land_cell((gx - west) as u32, (gy - south) as u32));
                    }
                }
            }
        }
    }
}

/// Global cell indices touched by `center ± radius`, clipped to the world
///
/// `None` when the span is empty or not finite.
fn grid_span(center: f32, radius: f32) -> Option<(i64, i64)> {
    let (low, high) = (center - radius, center + radius);
    if !low.is_finite() || !high.is_finite() || low > high {
        return None;
    }
    let lo = ((low / CELL_LENGTH).floor() as i64).max(0);
    let hi = ((high / CELL_LENGTH).floor() as i64).min(WORLD_CELLS - 1);
    (lo <= hi).then_some((lo, hi))
}

impl OutdoorRegion for Landscape {
    fn is_loaded(&self, landblock: LandblockId) -> bool {
        self.landblocks.contains_key(&landblock)
    }

    fn build_land_cell(&self, cell: CellId) -> Option<Cell> {
        let (cx, cy) = cell.land_coords()?;
        let block = self.landblocks.get(&cell.landblock())?;

        let land = LandCell::new(cx, cy, block.cell_corners(cx, cy));
        Some(Cell::outdoor(cell, land, block.cell_water_type(cx, cy), block.id()))
    }

    fn add_all_outside_cells(
        &self,
        position: &Position,
        spheres: &[Sphere],
        cells: &mut CellArray,
    ) {
        let block = position.cell.landblock();
        let base = (
            f32::from(block.x()) * BLOCK_LENGTH,
            f32::from(block.y()) * BLOCK_LENGTH,
        );

        if spheres.is_empty() {
            let point = Sphere::new(position.frame.origin, 0.0);
            self.add_cells_around(base, &point, cells);
            return;
        }
        for sphere in spheres {
            self.add_cells_around(base, sphere, cells);
        }
    }

    fn calc_water_depth(&self, cell: CellId, point: Vec3) -> Option<f32> {
        let block = self.landblocks.get(&cell.landblock())?;
        let level = block.water_level?;
        Some((level - block.terrain_height(point)).max(0.0))
    }

    fn block_water_type(&self, landblock: LandblockId) -> Option<WaterType> {
        self.landblocks.get(&landblock).map(|block| block.water_type)
    }
}
