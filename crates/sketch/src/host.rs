use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    scene::SceneEntity,
    traits::{EntityHandle, SceneHost},
};

/// A host that keeps spawned entities in memory, keyed by handle.
///
/// Handles are never reused, so a stale handle despawns nothing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    live: BTreeMap<EntityHandle, SceneEntity>,
    next_id: u64,
    spawned_total: u64,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entities in spawn order.
    pub fn live(&self) -> impl Iterator<Item = (EntityHandle, &SceneEntity)> {
        self.live.iter().map(|(handle, entity)| (*handle, entity))
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        self.live.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of spawns over the lifetime of the world.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }
}

impl SceneHost for InMemoryWorld {
    fn spawn(&mut self, entity: &SceneEntity) -> EntityHandle {
        let handle = EntityHandle(self.next_id);
        self.next_id += 1;
        self.spawned_total += 1;
        self.live.insert(handle, *entity);
        trace!(handle = handle.0, shape = %entity.shape, "spawned");
        handle
    }

    fn despawn(&mut self, handle: EntityHandle) {
        if self.live.remove(&handle).is_some() {
            trace!(handle = handle.0, "despawned");
        }
    }
}
