//! Rail vehicles: path following, per-tick integration, coupling sockets.

mod follower;
mod integrator;
mod profile;
mod socket;

pub use follower::{AdvanceOutcome, DetachReason, FollowerState, PathState, VehiclePathFollower};
pub use integrator::{PhysicsIntegrator, StepOutcome};
pub use profile::{AxleLayout, SocketSpec, VehicleProfile};
pub use socket::{Joint, Socket, SocketSide};

use crate::sim::{Float3, Quaternion};
use crate::solver::CollisionFilter;
use crate::world::EntityId;

/// One vehicle as the simulation owns it.
///
/// While attached the vehicle is kinematic: its pose and velocity come from
/// the path. While detached the host's free-body physics moves it and pushes
/// the result back through [`Vehicle::set_free_body`].
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub(crate) id: EntityId,
    pub(crate) profile: VehicleProfile,
    pub(crate) follower: VehiclePathFollower,
    pub(crate) position: Float3,
    pub(crate) rotation: Quaternion,
    pub(crate) velocity: Float3,
    pub(crate) front: Option<Socket>,
    pub(crate) back: Option<Socket>,
    pub(crate) filter: CollisionFilter,
    pub(crate) rider: Option<EntityId>,
}

impl Vehicle {
    pub fn new(id: EntityId, profile: VehicleProfile, position: Float3) -> Self {
        Self {
            id,
            front: profile.front.map(Socket::new),
            back: profile.back.map(Socket::new),
            profile,
            follower: VehiclePathFollower::new(),
            position,
            rotation: Quaternion::IDENTITY,
            velocity: Float3::ZERO,
            filter: CollisionFilter::new(),
            rider: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    pub fn mass(&self) -> f32 {
        self.profile.mass
    }

    pub fn position(&self) -> Float3 {
        self.position
    }

    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    pub fn velocity(&self) -> Float3 {
        self.velocity
    }

    /// Path-following vehicles are driven kinematically.
    pub fn is_kinematic(&self) -> bool {
        self.follower.is_attached()
    }

    pub fn follower(&self) -> &VehiclePathFollower {
        &self.follower
    }

    pub fn path_state(&self) -> Option<&PathState> {
        self.follower.path_state()
    }

    pub fn rider(&self) -> Option<EntityId> {
        self.rider
    }

    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    /// Forward direction: the path heading while attached, the body's
    /// local forward otherwise.
    pub fn facing(&self) -> Float3 {
        match self.follower.path_state() {
            Some(state) => state.heading(),
            None => self.rotation.mul_vec(Float3::FORWARD).normalize(),
        }
    }

    pub fn socket(&self, side: SocketSide) -> Option<&Socket> {
        match side {
            SocketSide::Front => self.front.as_ref(),
            SocketSide::Back => self.back.as_ref(),
        }
    }

    pub(crate) fn socket_mut(&mut self, side: SocketSide) -> Option<&mut Socket> {
        match side {
            SocketSide::Front => self.front.as_mut(),
            SocketSide::Back => self.back.as_mut(),
        }
    }

    /// Direction a socket points, away from the vehicle.
    pub fn socket_facing(&self, side: SocketSide) -> Float3 {
        self.facing() * side.sign()
    }

    pub fn socket_position(&self, side: SocketSide) -> Option<Float3> {
        let socket = self.socket(side)?;
        Some(self.position + self.socket_facing(side) * socket.spec.offset)
    }

    /// Every joint held by this vehicle's sockets.
    pub fn joints(&self) -> impl Iterator<Item = (SocketSide, Joint)> + '_ {
        SocketSide::BOTH
            .into_iter()
            .filter_map(|side| Some((side, self.socket(side)?.joint?)))
    }

    pub fn is_joined_to(&self, other: EntityId) -> bool {
        self.joints().any(|(_, joint)| joint.partner == other)
    }

    /// Clears every socket joined to `partner`.
    pub(crate) fn release_partner(&mut self, partner: EntityId) -> bool {
        let mut released = false;
        for side in SocketSide::BOTH {
            if let Some(socket) = self.socket_mut(side) {
                released |= socket.release(partner).is_some();
            }
        }
        released
    }

    /// Sets the velocity. An attached vehicle keeps only the component along
    /// its path.
    pub(crate) fn set_velocity(&mut self, velocity: Float3) {
        let velocity = velocity.finite_or_zero();
        match self.follower.path_state_mut() {
            Some(state) => {
                state.speed = velocity.dot(state.heading());
                self.velocity = state.velocity();
            }
            None => self.velocity = velocity,
        }
    }

    /// Takes the host's free-body pose. Ignored while attached.
    pub(crate) fn set_free_body(&mut self, position: Float3, rotation: Quaternion, velocity: Float3) -> bool {
        if self.is_kinematic() {
            return false;
        }
        self.position = position.finite_or_zero();
        self.rotation = rotation.normalize();
        self.velocity = velocity.finite_or_zero();
        true
    }

    pub(crate) fn set_rider(&mut self, rider: Option<EntityId>) -> Option<EntityId> {
        let previous = std::mem::replace(&mut self.rider, rider);
        if let Some(old) = previous {
            self.filter.remove(old);
        }
        if let Some(new) = rider {
            self.filter.insert(new);
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::placed_line;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn sockets_sit_ahead_and_behind() {
        let vehicle = Vehicle::new(EntityId(1), VehicleProfile::default(), Float3::new(0.0, 0.0, 2.0));
        let front = vehicle.socket_position(SocketSide::Front).unwrap();
        let back = vehicle.socket_position(SocketSide::Back).unwrap();
        assert_relative_eq!(front.z, 2.75, epsilon = TOLERANCE);
        assert_relative_eq!(back.z, 1.25, epsilon = TOLERANCE);
        assert_relative_eq!(
            vehicle.socket_facing(SocketSide::Front).dot(vehicle.socket_facing(SocketSide::Back)),
            -1.0,
            epsilon = TOLERANCE
        );
    }

    #[test]
    fn attached_velocity_stays_on_path() {
        let mut vehicle = Vehicle::new(EntityId(1), VehicleProfile::default(), Float3::ZERO);
        let segment = placed_line(1, Float3::ZERO, Float3::new(0.0, 0.0, 10.0));
        vehicle.follower.attach(segment, Float3::ZERO, Float3::ZERO);

        vehicle.set_velocity(Float3::new(4.0, 1.0, 2.0));
        assert_relative_eq!(vehicle.path_state().unwrap().speed, 2.0, epsilon = TOLERANCE);
        assert_relative_eq!(vehicle.velocity().x, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(vehicle.velocity().z, 2.0, epsilon = TOLERANCE);
    }

    #[test]
    fn free_body_sync_ignored_while_attached() {
        let mut vehicle = Vehicle::new(EntityId(1), VehicleProfile::default(), Float3::ZERO);
        assert!(vehicle.set_free_body(Float3::UP, Quaternion::IDENTITY, Float3::RIGHT));
        assert_eq!(vehicle.position(), Float3::UP);

        let segment = placed_line(1, Float3::ZERO, Float3::new(0.0, 0.0, 10.0));
        vehicle.follower.attach(segment, Float3::ZERO, Float3::ZERO);
        assert!(!vehicle.set_free_body(Float3::ZERO, Quaternion::IDENTITY, Float3::ZERO));
        assert_eq!(vehicle.position(), Float3::UP);
    }

    #[test]
    fn rider_swaps_filter_entry() {
        let mut vehicle = Vehicle::new(EntityId(1), VehicleProfile::default(), Float3::ZERO);
        vehicle.set_rider(Some(EntityId(5)));
        assert!(vehicle.filter().contains(EntityId(5)));
        assert_eq!(vehicle.set_rider(Some(EntityId(6))), Some(EntityId(5)));
        assert!(!vehicle.filter().contains(EntityId(5)));
        assert!(vehicle.filter().contains(EntityId(6)));
    }
}
