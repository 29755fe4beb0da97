use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::collision::CollisionMap;

/// Owns the live entity set.
///
/// Flat Vec in creation order so iteration over behavior, collision and
/// render stages is stable within a frame. Removal is always deferred:
/// collide handlers mark, and the queue drains once per tick after all
/// dispatch, clearing each victim's last occupancy footprint on the way out.
pub struct EntityRegistry {
    entities: Vec<Entity>,
    next_id: u32,
    deletions: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(32),
            next_id: 0,
            deletions: Vec::new(),
        }
    }

    /// Allocate the next entity id. Monotonic for the whole playthrough.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a constructed entity at the back of the live set.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Snapshot of live ids in creation order. Stages iterate over this so
    /// mid-stage spawns are neither double-processed nor skipped.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().filter(|e| e.alive).map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Queue an entity for removal at the end of the tick. It stops counting
    /// as live immediately but keeps its slot until the drain.
    pub fn mark_for_deletion(&mut self, id: EntityId) {
        if let Some(e) = self.get_mut(id) {
            if e.alive {
                e.alive = false;
                self.deletions.push(id);
            }
        }
    }

    /// Remove everything queued since the last drain, clearing each removed
    /// entity's final occupancy footprint. Runs once per tick, strictly
    /// after collision dispatch.
    pub fn drain_deletions(&mut self, map: &mut CollisionMap) {
        if self.deletions.is_empty() {
            return;
        }
        let deletions = std::mem::take(&mut self.deletions);
        for id in &deletions {
            if let Some(e) = self.entities.iter().find(|e| e.id == *id) {
                if let (true, Some(bbox)) = (e.solid, e.bbox) {
                    map.clear(*id, bbox);
                }
            }
        }
        self.entities.retain(|e| !deletions.contains(&e.id));
    }

    /// Drop every entity. Level teardown; pending deletions are moot.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.deletions.clear();
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
