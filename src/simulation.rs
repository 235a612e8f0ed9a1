//! Fixed-timestep driver tying the rail network, vehicles and solver together.
//!
//! One [`RailSimulation::step`] runs, in order:
//!
//! 1. attach probes for detached vehicles whose cooldown has run out
//! 2. path integration of attached vehicles
//! 3. coupling attempts for touching vehicles
//! 4. joint resolution
//! 5. collision resolution
//!
//! Every phase uses the same `dt`.

use std::collections::BTreeMap;

use crate::config::SimConfig;
use crate::error::{RailError, Result};
use crate::network::SegmentGraph;
use crate::sim::{Float3, Frame, Quaternion};
use crate::solver::ConstraintSolver;
use crate::spline::SegmentCache;
use crate::vehicle::{DetachReason, PhysicsIntegrator, StepOutcome, Vehicle, VehicleProfile};
use crate::world::{BlockPos, BodyAccess, ContactEvent, EntityId, RailWorld};

/// Notifications for audio and visual collaborators.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SimEvent {
    Attached { vehicle: EntityId, block: BlockPos },
    Detached { vehicle: EntityId, reason: DetachReason },
    JointFormed { owner: EntityId, partner: EntityId },
    JointBroken { owner: EntityId, partner: EntityId },
}

pub struct RailSimulation {
    config: SimConfig,
    cache: SegmentCache,
    vehicles: BTreeMap<EntityId, Vehicle>,
    integrator: PhysicsIntegrator,
    solver: ConstraintSolver,
    now: f64,
}

impl RailSimulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: SegmentCache::new(config.samples_per_curve),
            integrator: PhysicsIntegrator::new(&config),
            solver: ConstraintSolver::new(&config),
            vehicles: BTreeMap::new(),
            config,
            now: 0.0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulation clock in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn segment_cache(&self) -> &SegmentCache {
        &self.cache
    }

    pub fn add_vehicle(&mut self, id: EntityId, profile: VehicleProfile, position: Float3) -> Result<()> {
        if self.vehicles.contains_key(&id) {
            return Err(RailError::DuplicateVehicle(id));
        }
        profile.validate()?;
        self.vehicles.insert(id, Vehicle::new(id, profile, position));
        tracing::debug!(vehicle = %id, "vehicle added");
        Ok(())
    }

    /// Removes a vehicle, breaking its joints on both sides.
    pub fn remove_vehicle(&mut self, id: EntityId) -> Result<(Vehicle, Vec<SimEvent>)> {
        if !self.vehicles.contains_key(&id) {
            return Err(RailError::UnknownVehicle(id));
        }
        let mut events = self.solver.unjoin(&mut self.vehicles, id);
        let mut vehicle = self.vehicles.remove(&id).ok_or(RailError::UnknownVehicle(id))?;
        if let Some(velocity) = vehicle.follower.detach(self.now) {
            vehicle.velocity = velocity;
            events.push(SimEvent::Detached {
                vehicle: id,
                reason: DetachReason::Removed,
            });
        }
        tracing::debug!(vehicle = %id, "vehicle removed");
        Ok((vehicle, events))
    }

    pub fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.values()
    }

    fn vehicle_mut(&mut self, id: EntityId) -> Result<&mut Vehicle> {
        self.vehicles.get_mut(&id).ok_or(RailError::UnknownVehicle(id))
    }

    /// Pushes the host's free-body pose into a detached vehicle.
    ///
    /// Returns `false` while the vehicle is on the rails.
    pub fn sync_free_body(
        &mut self,
        id: EntityId,
        position: Float3,
        rotation: Quaternion,
        velocity: Float3,
    ) -> Result<bool> {
        Ok(self.vehicle_mut(id)?.set_free_body(position, rotation, velocity))
    }

    /// Applies an external impulse, capped at the velocity limit.
    pub fn apply_impulse(&mut self, id: EntityId, impulse: Float3) -> Result<()> {
        let cap = self.config.velocity_cap;
        let vehicle = self.vehicle_mut(id)?;
        let velocity = vehicle.velocity + impulse / vehicle.mass();
        vehicle.set_velocity(velocity.clamp_magnitude(cap));
        Ok(())
    }

    /// Mounts a rider, excluding it from collisions with the vehicle.
    pub fn set_rider(&mut self, id: EntityId, rider: EntityId) -> Result<Option<EntityId>> {
        Ok(self.vehicle_mut(id)?.set_rider(Some(rider)))
    }

    pub fn clear_rider(&mut self, id: EntityId) -> Result<Option<EntityId>> {
        Ok(self.vehicle_mut(id)?.set_rider(None))
    }

    /// Couples two vehicles if a pair of their sockets qualifies.
    pub fn try_join(&mut self, a: EntityId, b: EntityId) -> bool {
        self.solver.try_join(&mut self.vehicles, a, b)
    }

    pub fn unjoin(&mut self, id: EntityId) -> Vec<SimEvent> {
        self.solver.unjoin(&mut self.vehicles, id)
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step<W, B>(&mut self, world: &W, bodies: &mut B, contacts: &[ContactEvent]) -> Vec<SimEvent>
    where
        W: RailWorld + ?Sized,
        B: BodyAccess + ?Sized,
    {
        let dt = self.config.fixed_timestep;
        self.now += f64::from(dt);
        let now = self.now;
        let mut events = Vec::new();

        let mut graph = SegmentGraph::new(world, &mut self.cache, self.config.endpoint_epsilon);
        for vehicle in self.vehicles.values_mut() {
            if vehicle.follower.can_attach(now, self.config.detach_cooldown) {
                if let Some(event) = try_attach(vehicle, world, &mut graph, self.config.attach_probe_distance) {
                    events.push(event);
                }
            }

            if let StepOutcome::Detached(reason) = self.integrator.step(vehicle, dt, now, &mut graph) {
                events.push(SimEvent::Detached {
                    vehicle: vehicle.id,
                    reason,
                });
            }
        }

        for contact in contacts {
            let both_vehicles = self.vehicles.contains_key(&contact.a) && self.vehicles.contains_key(&contact.b);
            if both_vehicles && self.solver.try_join(&mut self.vehicles, contact.a, contact.b) {
                events.push(SimEvent::JointFormed {
                    owner: contact.a,
                    partner: contact.b,
                });
            }
        }

        events.extend(self.solver.resolve_joints(&mut self.vehicles, dt));
        let resolved = self.solver.resolve_contacts(&mut self.vehicles, bodies, contacts, dt);

        tracing::trace!(now, resolved, events = events.len(), "tick complete");
        events
    }
}

/// Probes straight down for a rail and attaches to the closest segment bound
/// to the hit block.
fn try_attach<W: RailWorld + ?Sized>(
    vehicle: &mut Vehicle,
    world: &W,
    graph: &mut SegmentGraph<'_, W>,
    probe_distance: f32,
) -> Option<SimEvent> {
    let ignore: Vec<EntityId> = std::iter::once(vehicle.id).chain(vehicle.rider).collect();
    let hit = world.cast_ray(vehicle.position, Float3::DOWN, probe_distance, &ignore)?;

    let segment = graph
        .placements_at(hit.block)
        .into_iter()
        .min_by(|a, b| {
            let da = a.point(a.nearest_distance(hit.point)).distance(hit.point);
            let db = b.point(b.nearest_distance(hit.point)).distance(hit.point);
            da.total_cmp(&db)
        })?;

    vehicle.follower.attach(segment, hit.point, vehicle.velocity);
    let state = vehicle.follower.path_state()?;
    vehicle.position = state.position();
    vehicle.rotation = Frame::from_direction_normal(state.heading(), state.normal()).rotation();
    vehicle.velocity = state.velocity();

    tracing::info!(
        vehicle = %vehicle.id,
        block = %hit.block,
        distance = state.distance,
        speed = state.speed,
        "vehicle attached to rail"
    );
    Some(SimEvent::Attached {
        vehicle: vehicle.id,
        block: hit.block,
    })
}
