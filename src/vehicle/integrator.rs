use crate::config::SimConfig;
use crate::network::NeighborResolver;
use crate::sim::physics::{self, decelerate};
use crate::sim::{Float3, Frame};

use super::follower::DetachReason;
use super::profile::AxleLayout;
use super::Vehicle;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Vehicle is not on a path.
    Free,
    Moved,
    Detached(DetachReason),
}

/// Moves attached vehicles along their path for one tick.
#[derive(Debug, Clone)]
pub struct PhysicsIntegrator {
    gravity: f32,
    velocity_cap: f32,
    max_splices: usize,
}

impl PhysicsIntegrator {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            gravity: config.gravity,
            velocity_cap: config.velocity_cap,
            max_splices: config.max_splices_per_advance,
        }
    }

    /// Integrates one tick of length `dt` for an attached vehicle.
    ///
    /// Either the whole pose, velocity and path state is committed or, when
    /// the path cannot continue, the vehicle detaches in place keeping the
    /// velocity it had this tick.
    pub fn step<R: NeighborResolver + ?Sized>(
        &self,
        vehicle: &mut Vehicle,
        dt: f32,
        now: f64,
        resolver: &mut R,
    ) -> StepOutcome {
        let mut follower = vehicle.follower.clone();
        let Some(state) = follower.path_state_mut() else {
            return StepOutcome::Free;
        };

        let heading = state.heading();
        let mut speed = state.speed.clamp(-self.velocity_cap, self.velocity_cap);

        let gravity_tick = Float3::new(0.0, -self.gravity, 0.0) * dt;
        speed += gravity_tick.dot(heading);

        let friction = gravity_tick.dot(state.normal()).abs() * state.segment.friction;
        speed = decelerate(speed, friction);

        if !speed.is_finite() {
            tracing::warn!(vehicle = %vehicle.id, "non-finite path speed reset to zero");
            speed = physics::finite_or_zero(speed);
        }
        state.speed = speed;
        let delta = state.delta_for(speed * dt);

        tracing::trace!(
            vehicle = %vehicle.id,
            speed,
            distance = state.distance,
            delta,
            "integrating path motion"
        );

        if let Err(reason) = follower.advance(delta, resolver, self.max_splices) {
            let velocity = follower.detach(now).unwrap_or(Float3::ZERO);
            vehicle.follower = follower;
            vehicle.velocity = velocity;
            tracing::info!(vehicle = %vehicle.id, %reason, "vehicle left the rails");
            return StepOutcome::Detached(reason);
        }

        let Some(state) = follower.path_state() else {
            return StepOutcome::Free;
        };
        let (position, frame) = match vehicle.profile.axles {
            AxleLayout::Simple => (
                state.position(),
                Frame::from_direction_normal(state.heading(), state.normal()),
            ),
            AxleLayout::MultiAxle { axle_offset } => {
                let front = follower.probe(axle_offset, resolver, self.max_splices);
                let back = follower.probe(-axle_offset, resolver, self.max_splices);
                match (front, back) {
                    (Some(front), Some(back)) if front.distance(back) > f32::EPSILON => (
                        (front + back) * 0.5,
                        Frame::from_direction_normal(front - back, state.normal()),
                    ),
                    _ => (
                        state.position(),
                        Frame::from_direction_normal(state.heading(), state.normal()),
                    ),
                }
            }
        };

        vehicle.position = position;
        vehicle.rotation = frame.rotation();
        vehicle.velocity = state.velocity();
        vehicle.follower = follower;
        StepOutcome::Moved
    }
}
