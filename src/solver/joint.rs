use std::collections::BTreeMap;

use crate::simulation::SimEvent;
use crate::vehicle::{Joint, SocketSide, Vehicle};
use crate::world::EntityId;

use super::impulse::{joint_impulse, BodyState};
use super::ConstraintSolver;

/// Whether socket `side_a` of `a` can couple with socket `side_b` of `b`:
/// both free, facing each other and within their combined range.
fn can_couple(a: &Vehicle, side_a: SocketSide, b: &Vehicle, side_b: SocketSide) -> bool {
    let (Some(socket_a), Some(socket_b)) = (a.socket(side_a), b.socket(side_b)) else {
        return false;
    };
    if !socket_a.is_free() || !socket_b.is_free() {
        return false;
    }
    let (Some(pos_a), Some(pos_b)) = (a.socket_position(side_a), b.socket_position(side_b)) else {
        return false;
    };
    a.socket_facing(side_a).dot(b.socket_facing(side_b)) < 0.0
        && pos_a.distance(pos_b) <= socket_a.spec.range + socket_b.spec.range
}

/// Clears every socket linking `a` and `b`.
fn release_pair(vehicles: &mut BTreeMap<EntityId, Vehicle>, a: EntityId, b: EntityId) -> bool {
    let mut released = false;
    if let Some(vehicle) = vehicles.get_mut(&a) {
        released |= vehicle.release_partner(b);
    }
    if let Some(vehicle) = vehicles.get_mut(&b) {
        released |= vehicle.release_partner(a);
    }
    released
}

impl ConstraintSolver {
    /// Couples `a` and `b` through the first pair of sockets that face each
    /// other within range. `a` owns the joint.
    ///
    /// Returns `false` without changing anything when no pair qualifies.
    pub fn try_join(&self, vehicles: &mut BTreeMap<EntityId, Vehicle>, a: EntityId, b: EntityId) -> bool {
        if a == b {
            return false;
        }
        let (Some(vehicle_a), Some(vehicle_b)) = (vehicles.get(&a), vehicles.get(&b)) else {
            return false;
        };
        if vehicle_a.is_joined_to(b) || vehicle_b.is_joined_to(a) {
            return false;
        }

        let Some((side_a, side_b)) = SocketSide::BOTH
            .into_iter()
            .flat_map(|side_a| SocketSide::BOTH.into_iter().map(move |side_b| (side_a, side_b)))
            .find(|&(side_a, side_b)| can_couple(vehicle_a, side_a, vehicle_b, side_b))
        else {
            return false;
        };
        let rest_length = vehicle_a.position.distance(vehicle_b.position);

        if let Some(socket) = vehicles.get_mut(&a).and_then(|v| v.socket_mut(side_a)) {
            socket.joint = Some(Joint {
                partner: b,
                partner_side: side_b,
                owning: true,
                rest_length,
            });
        }
        if let Some(socket) = vehicles.get_mut(&b).and_then(|v| v.socket_mut(side_b)) {
            socket.joint = Some(Joint {
                partner: a,
                partner_side: side_a,
                owning: false,
                rest_length,
            });
        }
        tracing::info!(owner = %a, partner = %b, ?side_a, ?side_b, rest_length, "vehicles coupled");
        true
    }

    /// Breaks every joint of `vehicle`, reporting each broken pair.
    pub fn unjoin(&self, vehicles: &mut BTreeMap<EntityId, Vehicle>, vehicle: EntityId) -> Vec<SimEvent> {
        let Some(joints) = vehicles.get(&vehicle).map(|v| v.joints().collect::<Vec<_>>()) else {
            return Vec::new();
        };
        joints
            .into_iter()
            .filter(|(_, joint)| release_pair(vehicles, vehicle, joint.partner))
            .map(|(_, joint)| broken(vehicle, joint))
            .collect()
    }

    /// Solves every owned joint once, breaking those stretched past the
    /// break distance or whose partner is gone.
    pub fn resolve_joints(&self, vehicles: &mut BTreeMap<EntityId, Vehicle>, dt: f32) -> Vec<SimEvent> {
        let owned: Vec<(EntityId, Joint)> = vehicles
            .values()
            .flat_map(|v| {
                v.joints()
                    .filter(|(_, joint)| joint.owning)
                    .map(move |(_, joint)| (v.id, joint))
            })
            .collect();

        let mut events = Vec::new();
        for (owner_id, joint) in owned {
            let (Some(owner), Some(partner)) = (vehicles.get(&owner_id), vehicles.get(&joint.partner))
            else {
                release_pair(vehicles, owner_id, joint.partner);
                tracing::info!(owner = %owner_id, partner = %joint.partner, "joint partner gone");
                events.push(broken(owner_id, joint));
                continue;
            };

            let delta = partner.position - owner.position;
            let distance = delta.magnitude();
            if distance > self.joint_break_distance {
                release_pair(vehicles, owner_id, joint.partner);
                tracing::info!(owner = %owner_id, partner = %joint.partner, distance, "joint broke");
                events.push(broken(owner_id, joint));
                continue;
            }
            if distance <= f32::EPSILON {
                continue;
            }

            let (Some(state_owner), Some(state_partner)) = (
                BodyState::new(owner.velocity, owner.mass()),
                BodyState::new(partner.velocity, partner.mass()),
            ) else {
                continue;
            };
            let (velocity_owner, velocity_partner) = joint_impulse(
                state_owner,
                state_partner,
                delta / distance,
                distance,
                joint.rest_length,
                self.baumgarte_coeff,
                dt,
            );

            if let Some(owner) = vehicles.get_mut(&owner_id) {
                owner.set_velocity(velocity_owner.clamp_magnitude(self.velocity_cap));
            }
            if let Some(partner) = vehicles.get_mut(&joint.partner) {
                partner.set_velocity(velocity_partner.clamp_magnitude(self.velocity_cap));
            }
        }
        events
    }
}

fn broken(owner: EntityId, joint: Joint) -> SimEvent {
    SimEvent::JointBroken {
        owner,
        partner: joint.partner,
    }
}
