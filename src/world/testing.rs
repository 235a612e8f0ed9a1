use std::collections::HashMap;

use crate::sim::Float3;

use super::{BodyAccess, BodyKind, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestBody {
    pub(crate) kind: BodyKind,
    pub(crate) position: Float3,
    pub(crate) velocity: Float3,
    pub(crate) mass: Option<f32>,
}

/// In-memory free bodies keyed by entity.
#[derive(Debug, Default)]
pub(crate) struct TestBodies {
    pub(crate) bodies: HashMap<EntityId, TestBody>,
}

impl TestBodies {
    pub(crate) fn character(&mut self, id: EntityId, position: Float3, velocity: Float3) {
        self.bodies.insert(
            id,
            TestBody {
                kind: BodyKind::Character,
                position,
                velocity,
                mass: None,
            },
        );
    }

    pub(crate) fn rigid_body(&mut self, id: EntityId, position: Float3, velocity: Float3, mass: f32) {
        self.bodies.insert(
            id,
            TestBody {
                kind: BodyKind::RigidBody,
                position,
                velocity,
                mass: Some(mass),
            },
        );
    }
}

impl BodyAccess for TestBodies {
    fn kind(&self, entity: EntityId) -> Option<BodyKind> {
        self.bodies.get(&entity).map(|b| b.kind)
    }

    fn position(&self, entity: EntityId) -> Option<Float3> {
        self.bodies.get(&entity).map(|b| b.position)
    }

    fn velocity(&self, entity: EntityId) -> Option<Float3> {
        self.bodies.get(&entity).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Float3) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.velocity = velocity;
        }
    }

    fn mass(&self, entity: EntityId) -> Option<f32> {
        self.bodies.get(&entity).and_then(|b| b.mass)
    }
}
