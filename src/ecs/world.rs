//! World wrapper around hecs

use hecs::Entity;
use log::debug;

use super::components::Name;
use crate::agent::Enemy;

/// Live enemies of the current map
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
    spawned: u32,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
            spawned: 0,
        }
    }

    /// Spawn an enemy with a debug name
    pub fn spawn_enemy(&mut self, enemy: Enemy) -> Entity {
        self.spawned += 1;
        let name = Name::numbered(enemy.kind(), self.spawned);
        self.inner.spawn((enemy, name))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get an enemy by entity
    pub fn enemy(&self, entity: Entity) -> Result<hecs::Ref<'_, Enemy>, hecs::ComponentError> {
        self.inner.get::<&Enemy>(entity)
    }

    /// Get an enemy mutably by entity
    pub fn enemy_mut(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, Enemy>, hecs::ComponentError> {
        self.inner.get::<&mut Enemy>(entity)
    }

    /// Debug name of an entity
    pub fn name(&self, entity: Entity) -> Option<String> {
        self.inner
            .get::<&Name>(entity)
            .ok()
            .map(|name| name.0.clone())
    }

    /// Iterate enemies mutably
    pub fn enemies_mut(&mut self) -> hecs::QueryMut<'_, &mut Enemy> {
        self.inner.query_mut::<&mut Enemy>()
    }

    /// Entities of every enemy, in storage order
    pub fn enemy_entities(&self) -> Vec<Entity> {
        self.inner
            .query::<&Enemy>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Remove enemies whose death sequence is over. Returns how many went.
    pub fn reap_finished(&mut self) -> usize {
        let finished: Vec<Entity> = self
            .inner
            .query::<&Enemy>()
            .iter()
            .filter(|(_, enemy)| enemy.is_finished())
            .map(|(entity, _)| entity)
            .collect();

        for &entity in &finished {
            debug!("Removing corpse {entity:?}");
            let _ = self.inner.despawn(entity);
        }
        finished.len()
    }

    /// Get the number of enemies
    pub fn enemy_count(&self) -> usize {
        self.inner.query::<&Enemy>().iter().count()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
        self.spawned = 0;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
