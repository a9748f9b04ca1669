//! ECS World implementation

use super::{ComponentMessenger, Entity};

/// ECS World: entity allocation plus the message bus components talk through
pub struct World {
    next_entity_id: u32,
    entities: Vec<Entity>,
    messenger: ComponentMessenger,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            next_entity_id: 0,
            entities: Vec::new(),
            messenger: ComponentMessenger::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.push(entity);
        entity
    }

    /// Get an iterator over all entities
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Message bus, read side
    pub fn messenger(&self) -> &ComponentMessenger {
        &self.messenger
    }

    /// Message bus, registration side
    pub fn messenger_mut(&mut self) -> &mut ComponentMessenger {
        &mut self.messenger
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_get_distinct_ids() {
        let mut world = World::new();

        let a = world.create_entity();
        let b = world.create_entity();

        assert_ne!(a, b);
        assert_eq!(world.entities().count(), 2);
        assert_eq!(b.id(), 1);
    }
}
