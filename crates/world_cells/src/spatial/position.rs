//! Positions: a cell plus a frame inside that cell's landblock

use serde::{Deserialize, Serialize};

use super::ids::{block_offset, CellId};
use crate::foundation::math::{Frame, Vec3};

/// Location of something in the world
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Cell the position is in
    pub cell: CellId,
    /// Frame in the landblock-local coordinates of `cell`
    pub frame: Frame,
}

impl Position {
    /// Position at `origin` in `cell` with identity orientation
    pub fn new(cell: CellId, origin: Vec3) -> Self {
        Self {
            cell,
            frame: Frame::from_origin(origin),
        }
    }

    /// Position with an explicit frame
    pub const fn with_frame(cell: CellId, frame: Frame) -> Self {
        Self { cell, frame }
    }

    /// Map a point in this position's local space into the landblock frame
    pub fn local_to_global(&self, point: Vec3) -> Vec3 {
        self.frame.local_to_global(point)
    }

    /// Map a landblock-frame point into this position's local space
    pub fn global_to_local(&self, point: Vec3) -> Vec3 {
        self.frame.global_to_local(point)
    }

    /// Origin of this position expressed in `other`'s landblock frame
    pub fn origin_in_frame_of(&self, other: CellId) -> Vec3 {
        self.frame.origin + block_offset(other, self.cell)
    }
}
