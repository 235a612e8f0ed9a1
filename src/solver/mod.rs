//! Velocity-level impulse solving for vehicle contacts and couplings.
//!
//! Collisions are one-sided constraints (push apart only), couplings are
//! two-sided distance joints. Both add a Baumgarte bias proportional to the
//! positional error over the tick's `dt`.

mod collision;
mod filter;
mod impulse;
mod joint;

pub use filter::CollisionFilter;
pub use impulse::{collision_impulse, joint_impulse, BodyState, ContactGeometry};

use crate::config::SimConfig;

/// Pairwise constraint resolution over the vehicle registry.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    baumgarte_coeff: f32,
    velocity_cap: f32,
    joint_break_distance: f32,
    character_mass: f32,
}

impl ConstraintSolver {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            baumgarte_coeff: config.baumgarte_coeff,
            velocity_cap: config.velocity_cap,
            joint_break_distance: config.joint_break_distance,
            character_mass: config.character_mass,
        }
    }
}
