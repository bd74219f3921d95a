//! Stable id allocation and the id → hecs entity lookup.

use std::collections::HashMap;

use hecs::Entity;

use greenline_core::types::EntityId;

/// Maps stable entity ids to live hecs handles.
///
/// Ids are allocated monotonically and never reused within a session, so a
/// deferred task naming a removed entity simply misses.
#[derive(Debug)]
pub struct EntityIndex {
    next_id: u64,
    handles: HashMap<EntityId, Entity>,
}

impl Default for EntityIndex {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl EntityIndex {
    pub fn starting_at(next_id: u64) -> Self {
        Self {
            next_id,
            handles: HashMap::new(),
        }
    }

    /// Reserve the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a live entity. Returns `false` if the id is already taken.
    pub fn insert(&mut self, id: EntityId, entity: Entity) -> bool {
        if self.handles.contains_key(&id) {
            return false;
        }
        self.handles.insert(id, entity);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.handles.get(&id).copied()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.handles.remove(&id)
    }

    /// The id the next allocation will return.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
