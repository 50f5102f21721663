//! Working set of cells gathered for one sweep query

use std::collections::HashSet;

use super::ids::CellId;

/// Keyed, insertion-ordered set of cell ids
///
/// Sweeps add to it and never clear it: a caller that reuses one array
/// across queries carries cells over, and indoor-anchored sweeps prune the
/// ones no longer reachable unless `load_cells` is set.
#[derive(Debug, Clone, Default)]
pub struct CellArray {
    cells: Vec<CellId>,
    members: HashSet<CellId>,
    /// Keep every gathered cell instead of pruning unreachable ones
    pub load_cells: bool,
    /// Set when the last sweep enumerated outdoor cells
    pub added_outside: bool,
}

impl CellArray {
    /// Empty working set that prunes
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty working set with an explicit `load_cells` setting
    pub fn with_load_cells(load_cells: bool) -> Self {
        Self {
            load_cells,
            ..Self::default()
        }
    }

    /// Insert `cell` at the end; false if it was already present
    pub fn add_cell(&mut self, cell: CellId) -> bool {
        if cell.is_null() || !self.members.insert(cell) {
            return false;
        }
        self.cells.push(cell);
        true
    }

    /// Remove `cell`, keeping the order of the rest
    pub fn remove_cell(&mut self, cell: CellId) -> bool {
        if !self.members.remove(&cell) {
            return false;
        }
        self.cells.retain(|c| *c != cell);
        true
    }

    /// Keep only the cells for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(CellId) -> bool) {
        let members = &mut self.members;
        self.cells.retain(|c| {
            let kept = keep(*c);
            if !kept {
                members.remove(c);
            }
            kept
        });
    }

    /// True if `cell` is in the set
    pub fn contains(&self, cell: CellId) -> bool {
        self.members.contains(&cell)
    }

    /// Cell ids in insertion order
    pub fn ids(&self) -> &[CellId] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop every cell, keeping `load_cells`
    pub fn clear(&mut self) {
        self.cells.clear();
        self.members.clear();
        self.added_outside = false;
    }
}
