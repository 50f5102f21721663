//! Shadow proxies: collision handles binding an object to one cell
//!
//! A cell's proxies live in a [`ShadowList`], a copy-on-write list. Every
//! broad-phase walk takes a [`ShadowSnapshot`] first, so the cell may be
//! mutated while a walk is in flight and the walk still sees exactly the
//! proxies that existed when it started.

use std::sync::Arc;

use super::ids::CellId;
use crate::physics::ObjectId;

/// Non-owning collision handle for one (object, cell) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowProxy {
    object: ObjectId,
    cell: Option<CellId>,
}

impl ShadowProxy {
    /// Fresh proxy for `object`, not yet placed in a cell
    pub const fn new(object: ObjectId) -> Self {
        Self { object, cell: None }
    }

    /// Object the proxy stands for
    pub const fn object(&self) -> ObjectId {
        self.object
    }

    /// Cell currently holding the proxy
    pub const fn cell(&self) -> Option<CellId> {
        self.cell
    }

    pub(crate) fn set_cell(&mut self, cell: Option<CellId>) {
        self.cell = cell;
    }
}

/// Immutable view of a cell's proxies at one instant
#[derive(Debug, Clone)]
pub struct ShadowSnapshot(Arc<Vec<ShadowProxy>>);

impl ShadowSnapshot {
    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ShadowProxy> {
        self.0.iter()
    }

    /// Number of proxies captured
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was captured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ShadowSnapshot {
    type Item = &'a ShadowProxy;
    type IntoIter = std::slice::Iter<'a, ShadowProxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered, copy-on-write collection of a cell's proxies
#[derive(Debug, Clone, Default)]
pub struct ShadowList {
    proxies: Arc<Vec<ShadowProxy>>,
}

impl ShadowList {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current contents; cheap, shares storage until the next write
    pub fn snapshot(&self) -> ShadowSnapshot {
        ShadowSnapshot(Arc::clone(&self.proxies))
    }

    /// Append a proxy; refused if one for the same object is already present
    pub fn push(&mut self, proxy: ShadowProxy) -> bool {
        if self.contains(proxy.object) {
            return false;
        }
        Arc::make_mut(&mut self.proxies).push(proxy);
        true
    }

    /// Remove the proxy for `object`, preserving the order of the rest
    pub fn remove(&mut self, object: ObjectId) -> Option<ShadowProxy> {
        let index = self.proxies.iter().position(|p| p.object == object)?;
        Some(Arc::make_mut(&mut self.proxies).remove(index))
    }

    /// First proxy in insertion order
    pub fn first(&self) -> Option<&ShadowProxy> {
        self.proxies.first()
    }

    /// True if `object` has a proxy here
    pub fn contains(&self, object: ObjectId) -> bool {
        self.proxies.iter().any(|p| p.object == object)
    }

    /// Number of proxies
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
