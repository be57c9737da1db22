use std::collections::HashSet;

/// Identifier shared by a game object and the physics body it owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// Underlying integer, for logging.
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Hands out entity ids and tracks which are still alive.
#[derive(Debug)]
pub struct Entities {
    next_id: u32,
    alive: HashSet<EntityId>,
}

impl Entities {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            alive: HashSet::new(),
        }
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.alive.insert(id);
        id
    }

    /// Returns false if the entity was already gone.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.alive.remove(&entity)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_despawn_once() {
        let mut entities = Entities::new();
        let a = entities.spawn();
        let b = entities.spawn();
        assert_ne!(a, b);
        assert_eq!(entities.len(), 2);

        assert!(entities.despawn(a));
        assert!(!entities.despawn(a));
        assert!(!entities.is_alive(a));
        assert!(entities.is_alive(b));
    }
}
