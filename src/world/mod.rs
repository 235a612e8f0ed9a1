//! Contracts with the embedding application.
//!
//! The rail core never owns the voxel world, entity storage, or the
//! free-body physics engine. It reaches them through the two traits here:
//! [`RailWorld`] for ray probes and rail-to-spline bindings, and
//! [`BodyAccess`] for the velocities of characters and rigid bodies that
//! collide with vehicles.

mod ids;
#[cfg(test)]
pub(crate) mod testing;

pub use ids::{BlockPos, EntityId};

use std::sync::Arc;

use crate::sim::{Float3, Quaternion};
use crate::spline::{PathDescriptor, Placement};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub point: Float3,
    pub block: BlockPos,
}

/// Binding of a rail block to its spline shapes.
#[derive(Debug, Clone)]
pub struct RailAssociation {
    /// Orientation of the block; descriptors are authored unrotated.
    pub rotation: Quaternion,
    pub friction: f32,
    pub descriptors: Vec<Arc<PathDescriptor>>,
}

impl RailAssociation {
    pub fn placement(&self, block: BlockPos) -> Placement {
        Placement::new(block.center(), self.rotation)
    }
}

pub trait RailWorld {
    /// Casts a ray, ignoring the listed entities.
    fn cast_ray(
        &self,
        origin: Float3,
        direction: Float3,
        max_distance: f32,
        ignore: &[EntityId],
    ) -> Option<RayHit>;

    /// Rail binding of a block; `None` when the block is not a rail.
    fn resolve_association(&self, block: BlockPos) -> Option<RailAssociation>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// Player-like body without a rigid-body mass.
    Character,
    RigidBody,
}

/// Velocity access to non-vehicle bodies.
///
/// Every getter returns `None` once the entity is gone.
pub trait BodyAccess {
    fn kind(&self, entity: EntityId) -> Option<BodyKind>;
    fn position(&self, entity: EntityId) -> Option<Float3>;
    fn velocity(&self, entity: EntityId) -> Option<Float3>;
    fn set_velocity(&mut self, entity: EntityId, velocity: Float3);
    /// Rigid-body mass. Characters report `None`.
    fn mass(&self, entity: EntityId) -> Option<f32>;
}

/// One contacting pair, delivered once per tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub normal: Float3,
    pub depth: f32,
}
