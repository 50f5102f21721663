//! Cell identifiers and landblock arithmetic
//!
//! A cell id packs the owning landblock into the high 16 bits (x in the top
//! byte, y in the next) and the cell index into the low 16 bits. Indices
//! 1..=64 are the outdoor cells of the landblock's 8x8 grid; indices from
//! 0x100 upward are indoor environment cells.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Side length of a landblock in world units
pub const BLOCK_LENGTH: f32 = 192.0;

/// Side length of an outdoor cell in world units
pub const CELL_LENGTH: f32 = 24.0;

/// Outdoor cells along one side of a landblock
pub const CELLS_PER_SIDE: u32 = 8;

/// First cell index used by indoor cells
pub const FIRST_ENV_CELL: u32 = 0x100;

/// Identifier of a landblock (the high half of a cell id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandblockId(u16);

impl LandblockId {
    /// Landblock at grid coordinates (`x`, `y`)
    pub const fn new(x: u8, y: u8) -> Self {
        Self(((x as u16) << 8) | y as u16)
    }

    /// Grid x coordinate
    pub const fn x(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Grid y coordinate
    pub const fn y(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Raw 16-bit value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Id of the outdoor cell at grid column `cx`, row `cy` of this block
    pub const fn land_cell(self, cx: u32, cy: u32) -> CellId {
        CellId(((self.0 as u32) << 16) | (cx * CELLS_PER_SIDE + cy + 1))
    }

    /// Id of the indoor cell with local index `index` (>= 0x100)
    pub const fn env_cell(self, index: u16) -> CellId {
        CellId(((self.0 as u32) << 16) | index as u32)
    }
}

impl fmt::Display for LandblockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Stable identifier of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u32);

impl CellId {
    /// The "no cell" sentinel
    pub const NULL: Self = Self(0);

    /// Wrap a raw id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for the zero sentinel
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Low 16 bits: the cell's index inside its landblock
    pub const fn index(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// True when the index denotes an indoor environment cell
    pub const fn is_indoor(self) -> bool {
        self.index() >= FIRST_ENV_CELL
    }

    /// Landblock owning this cell
    pub const fn landblock(self) -> LandblockId {
        LandblockId((self.0 >> 16) as u16)
    }

    /// Grid column and row of an outdoor cell, `None` for indoor or index 0
    pub const fn land_coords(self) -> Option<(u32, u32)> {
        let index = self.index();
        if index == 0 || index > CELLS_PER_SIDE * CELLS_PER_SIDE {
            return None;
        }
        let zero_based = index - 1;
        Some((zero_based / CELLS_PER_SIDE, zero_based % CELLS_PER_SIDE))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Translation that maps points in `to`'s landblock frame into `from`'s
///
/// A point expressed in `from`'s frame is moved into `to`'s frame by
/// subtracting this offset.
pub fn block_offset(from: CellId, to: CellId) -> Vec3 {
    let (a, b) = (from.landblock(), to.landblock());
    Vec3::new(
        (f32::from(b.x()) - f32::from(a.x())) * BLOCK_LENGTH,
        (f32::from(b.y()) - f32::from(a.y())) * BLOCK_LENGTH,
        0.0,
    )
}
