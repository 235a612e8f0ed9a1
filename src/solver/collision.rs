use std::collections::BTreeMap;

use crate::sim::Float3;
use crate::vehicle::Vehicle;
use crate::world::{BodyAccess, BodyKind, ContactEvent, EntityId};

use super::impulse::{collision_impulse, BodyState, ContactGeometry};
use super::ConstraintSolver;

/// Solve direction from A to B, falling back to the host's contact normal
/// when the centers coincide.
fn geometry(a: Float3, b: Float3, contact: &ContactEvent) -> Option<ContactGeometry> {
    let mut normal = (b - a).normalize();
    if normal == Float3::ZERO {
        normal = contact.normal.normalize();
    }
    (normal != Float3::ZERO).then_some(ContactGeometry {
        normal,
        contact_normal: contact.normal.normalize(),
        depth: contact.depth,
    })
}

impl ConstraintSolver {
    /// Applies collision impulses for every contact involving a vehicle.
    ///
    /// Returns the number of contacts that received an impulse.
    pub fn resolve_contacts<B: BodyAccess + ?Sized>(
        &self,
        vehicles: &mut BTreeMap<EntityId, Vehicle>,
        bodies: &mut B,
        contacts: &[ContactEvent],
        dt: f32,
    ) -> usize {
        contacts
            .iter()
            .filter(|contact| self.resolve_contact(vehicles, bodies, contact, dt))
            .count()
    }

    fn resolve_contact<B: BodyAccess + ?Sized>(
        &self,
        vehicles: &mut BTreeMap<EntityId, Vehicle>,
        bodies: &mut B,
        contact: &ContactEvent,
        dt: f32,
    ) -> bool {
        if contact.a == contact.b {
            return false;
        }
        match (vehicles.contains_key(&contact.a), vehicles.contains_key(&contact.b)) {
            (true, true) => self.vehicle_pair(vehicles, contact.a, contact.b, contact, dt),
            (true, false) => self.vehicle_body(vehicles, bodies, contact.a, contact.b, contact, dt),
            (false, true) => self.vehicle_body(vehicles, bodies, contact.b, contact.a, contact, dt),
            (false, false) => false,
        }
    }

    fn vehicle_pair(
        &self,
        vehicles: &mut BTreeMap<EntityId, Vehicle>,
        id_a: EntityId,
        id_b: EntityId,
        contact: &ContactEvent,
        dt: f32,
    ) -> bool {
        let (Some(a), Some(b)) = (vehicles.get(&id_a), vehicles.get(&id_b)) else {
            return false;
        };
        if a.filter.contains(id_b) || b.filter.contains(id_a) {
            tracing::trace!(a = %id_a, b = %id_b, "contact filtered");
            return false;
        }
        if a.is_joined_to(id_b) || b.is_joined_to(id_a) {
            return false;
        }

        let Some(geometry) = geometry(a.position, b.position, contact) else {
            return false;
        };
        let (Some(state_a), Some(state_b)) = (
            BodyState::new(a.velocity, a.mass()),
            BodyState::new(b.velocity, b.mass()),
        ) else {
            return false;
        };
        let Some((velocity_a, velocity_b)) =
            collision_impulse(state_a, state_b, geometry, self.baumgarte_coeff, dt)
        else {
            return false;
        };

        if let Some(a) = vehicles.get_mut(&id_a) {
            a.set_velocity(velocity_a);
        }
        if let Some(b) = vehicles.get_mut(&id_b) {
            b.set_velocity(velocity_b);
        }
        tracing::trace!(a = %id_a, b = %id_b, "vehicle collision resolved");
        true
    }

    fn vehicle_body<B: BodyAccess + ?Sized>(
        &self,
        vehicles: &mut BTreeMap<EntityId, Vehicle>,
        bodies: &mut B,
        vehicle_id: EntityId,
        body_id: EntityId,
        contact: &ContactEvent,
        dt: f32,
    ) -> bool {
        let Some(vehicle) = vehicles.get(&vehicle_id) else {
            return false;
        };
        if vehicle.filter.contains(body_id) {
            tracing::trace!(vehicle = %vehicle_id, body = %body_id, "contact filtered");
            return false;
        }

        let Some(kind) = bodies.kind(body_id) else {
            return false;
        };
        let (Some(position), Some(velocity)) = (bodies.position(body_id), bodies.velocity(body_id))
        else {
            return false;
        };
        let mass = match kind {
            BodyKind::Character => Some(self.character_mass),
            BodyKind::RigidBody => bodies.mass(body_id),
        };

        let Some(geometry) = geometry(vehicle.position, position, contact) else {
            return false;
        };
        let (Some(state_vehicle), Some(state_body)) = (
            BodyState::new(vehicle.velocity, vehicle.mass()),
            mass.and_then(|mass| BodyState::new(velocity, mass)),
        ) else {
            return false;
        };
        let Some((velocity_vehicle, velocity_body)) =
            collision_impulse(state_vehicle, state_body, geometry, self.baumgarte_coeff, dt)
        else {
            return false;
        };

        if let Some(vehicle) = vehicles.get_mut(&vehicle_id) {
            vehicle.set_velocity(velocity_vehicle);
        }
        bodies.set_velocity(body_id, velocity_body);
        tracing::trace!(vehicle = %vehicle_id, body = %body_id, ?kind, "body collision resolved");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::vehicle::VehicleProfile;
    use crate::world::testing::TestBodies;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;
    const DT: f32 = 1.0 / 60.0;

    fn free_vehicle(id: u64, z: f32, velocity_z: f32) -> (EntityId, Vehicle) {
        let mut vehicle = Vehicle::new(EntityId(id), VehicleProfile::default(), Float3::new(0.0, 0.0, z));
        vehicle.set_velocity(Float3::new(0.0, 0.0, velocity_z));
        (EntityId(id), vehicle)
    }

    fn contact(a: u64, b: u64) -> ContactEvent {
        ContactEvent {
            a: EntityId(a),
            b: EntityId(b),
            normal: Float3::FORWARD,
            depth: 0.0,
        }
    }

    fn solver() -> ConstraintSolver {
        ConstraintSolver::new(&SimConfig {
            baumgarte_coeff: 0.0,
            ..SimConfig::default()
        })
    }

    #[test]
    fn closing_vehicles_exchange_momentum() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 1.0), free_vehicle(2, 1.5, -1.0)].into();
        let mut bodies = TestBodies::default();

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 2)], DT);
        assert_eq!(applied, 1);
        let a = vehicles[&EntityId(1)].velocity();
        let b = vehicles[&EntityId(2)].velocity();
        assert_relative_eq!(a.z, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(b.z, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn contact_order_does_not_matter() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 2.0), free_vehicle(2, 1.5, 0.0)].into();
        let mut bodies = TestBodies::default();

        solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(2, 1)], DT);
        assert_relative_eq!(vehicles[&EntityId(1)].velocity().z, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(vehicles[&EntityId(2)].velocity().z, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn separating_vehicles_are_untouched() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, -1.0), free_vehicle(2, 1.5, 1.0)].into();
        let mut bodies = TestBodies::default();

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 2)], DT);
        assert_eq!(applied, 0);
        assert_relative_eq!(vehicles[&EntityId(1)].velocity().z, -1.0);
    }

    #[test]
    fn character_uses_stand_in_mass() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 2.0)].into();
        let mut bodies = TestBodies::default();
        bodies.character(EntityId(9), Float3::new(0.0, 0.0, 1.0), Float3::ZERO);

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(9, 1)], DT);
        assert_eq!(applied, 1);
        assert_relative_eq!(vehicles[&EntityId(1)].velocity().z, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(bodies.bodies[&EntityId(9)].velocity.z, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn rigid_body_uses_its_mass() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 3.0)].into();
        let mut bodies = TestBodies::default();
        bodies.rigid_body(EntityId(9), Float3::new(0.0, 0.0, 1.0), Float3::ZERO, 20.0);

        solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 9)], DT);
        let vehicle = vehicles[&EntityId(1)].velocity().z;
        let body = bodies.bodies[&EntityId(9)].velocity.z;
        assert_relative_eq!(vehicle, body, epsilon = TOLERANCE);
        assert_relative_eq!(10.0 * vehicle + 20.0 * body, 30.0, epsilon = TOLERANCE);
    }

    #[test]
    fn rider_is_filtered() {
        let (id, mut vehicle) = free_vehicle(1, 0.0, 2.0);
        vehicle.set_rider(Some(EntityId(9)));
        let mut vehicles: BTreeMap<_, _> = [(id, vehicle)].into();
        let mut bodies = TestBodies::default();
        bodies.character(EntityId(9), Float3::new(0.0, 0.0, 1.0), Float3::ZERO);

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 9)], DT);
        assert_eq!(applied, 0);
        assert_eq!(bodies.bodies[&EntityId(9)].velocity, Float3::ZERO);
    }

    #[test]
    fn non_finite_body_velocity_is_zeroed() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 2.0)].into();
        let mut bodies = TestBodies::default();
        bodies.rigid_body(EntityId(9), Float3::new(0.0, 0.0, 1.0), Float3::new(0.0, 0.0, f32::NAN), 10.0);

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 9)], DT);
        assert_eq!(applied, 1);
        let vehicle = vehicles[&EntityId(1)].velocity();
        let body = bodies.bodies[&EntityId(9)].velocity;
        assert!(vehicle.is_finite() && body.is_finite());
        assert_relative_eq!(vehicle.z, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(body.z, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn missing_body_is_skipped() {
        let mut vehicles: BTreeMap<_, _> = [free_vehicle(1, 0.0, 2.0)].into();
        let mut bodies = TestBodies::default();

        let applied = solver().resolve_contacts(&mut vehicles, &mut bodies, &[contact(1, 42)], DT);
        assert_eq!(applied, 0);
        assert_relative_eq!(vehicles[&EntityId(1)].velocity().z, 2.0);
    }
}
