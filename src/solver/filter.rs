use std::collections::HashSet;

use crate::world::EntityId;

/// Entities a vehicle never exchanges collision impulses with, such as its
/// rider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionFilter {
    excluded: HashSet<EntityId>,
}

impl CollisionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the entity was not already excluded.
    pub fn insert(&mut self, entity: EntityId) -> bool {
        self.excluded.insert(entity)
    }

    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.excluded.remove(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.excluded.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut filter = CollisionFilter::new();
        assert!(filter.insert(EntityId(7)));
        assert!(!filter.insert(EntityId(7)));
        assert!(filter.contains(EntityId(7)));
        assert_eq!(filter.len(), 1);
        assert!(filter.remove(EntityId(7)));
        assert!(filter.is_empty());
    }
}
