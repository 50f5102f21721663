//! Arena of live simulated objects
//!
//! Objects are stored behind generational slot keys and indexed by their
//! [`ObjectId`], so cells and shadow proxies can refer to them by id
//! without owning them.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use super::object::{ObjectId, SimObject};

new_key_type! {
    /// Generational handle into the registry's arena
    pub struct ObjectKey;
}

/// Live object table shared by every cell
#[derive(Default)]
pub struct ObjectRegistry {
    objects: SlotMap<ObjectKey, Box<dyn SimObject>>,
    index: HashMap<ObjectId, ObjectKey>,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object
    ///
    /// An object whose id is invalid or already taken is handed back
    /// unchanged as the error.
    pub fn insert(&mut self, object: Box<dyn SimObject>) -> Result<ObjectKey, Box<dyn SimObject>> {
        let id = object.id();
        if !id.is_valid() || self.index.contains_key(&id) {
            return Err(object);
        }

        let key = self.objects.insert(object);
        self.index.insert(id, key);
        Ok(key)
    }

    /// Unregister an object, returning it
    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn SimObject>> {
        let key = self.index.remove(&id)?;
        self.objects.remove(key)
    }

    /// Resolve an id to a live object
    pub fn get(&self, id: ObjectId) -> Option<&dyn SimObject> {
        let key = self.index.get(&id)?;
        self.objects.get(*key).map(|object| &**object)
    }

    /// Resolve an id to a live object for mutation
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut dyn SimObject> {
        let key = *self.index.get(&id)?;
        match self.objects.get_mut(key) {
            Some(object) => Some(&mut **object),
            None => None,
        }
    }

    /// Resolve and downcast to a concrete type
    pub fn get_as<T: SimObject>(&self, id: ObjectId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Resolve and downcast to a concrete type for mutation
    pub fn get_as_mut<T: SimObject>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Arena key of a registered object
    pub fn key_of(&self, id: ObjectId) -> Option<ObjectKey> {
        self.index.get(&id).copied()
    }

    /// True if `id` resolves to a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no object is registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
