//! Tunables for the rail simulation.
//!
//! Every field has a default (see [`crate::sim::physics`]), so a RON file
//! only needs to name what it overrides:
//!
//! ```ignore
//! (velocity_cap: 20.0, detach_cooldown: 2.0)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RailError, Result};
use crate::sim::physics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravitational acceleration, applied along world -Y.
    pub gravity: f32,
    pub velocity_cap: f32,
    pub baumgarte_coeff: f32,
    pub joint_break_distance: f32,
    /// Seconds after a detach before the vehicle may attach again.
    pub detach_cooldown: f64,
    pub attach_probe_distance: f32,
    /// Tolerance when matching segment endpoints in world space.
    pub endpoint_epsilon: f32,
    pub samples_per_curve: usize,
    pub character_mass: f32,
    pub max_splices_per_advance: usize,
    pub fixed_timestep: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: physics::G,
            velocity_cap: physics::VELOCITY_CAP,
            baumgarte_coeff: physics::BAUMGARTE_COEFF,
            joint_break_distance: physics::CART_JOINT_BREAK_DISTANCE,
            detach_cooldown: physics::DETACH_COOLDOWN,
            attach_probe_distance: physics::ATTACH_PROBE_DISTANCE,
            endpoint_epsilon: physics::ENDPOINT_EPSILON,
            samples_per_curve: physics::SAMPLES_PER_CURVE,
            character_mass: physics::PLAYER_MASS,
            max_splices_per_advance: physics::MAX_SPLICES_PER_ADVANCE,
            fixed_timestep: physics::DT,
        }
    }
}

impl SimConfig {
    /// Parses a RON document and validates the result.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("velocity_cap", self.velocity_cap)?;
        positive("joint_break_distance", self.joint_break_distance)?;
        positive("attach_probe_distance", self.attach_probe_distance)?;
        positive("endpoint_epsilon", self.endpoint_epsilon)?;
        positive("character_mass", self.character_mass)?;
        positive("fixed_timestep", self.fixed_timestep)?;
        non_negative("gravity", self.gravity)?;
        non_negative("baumgarte_coeff", self.baumgarte_coeff)?;

        if !(self.detach_cooldown.is_finite() && self.detach_cooldown >= 0.0) {
            return Err(invalid("detach_cooldown", "must be a finite, non-negative duration"));
        }
        if self.samples_per_curve == 0 {
            return Err(invalid("samples_per_curve", "must be at least 1"));
        }
        if self.max_splices_per_advance == 0 {
            return Err(invalid("max_splices_per_advance", "must be at least 1"));
        }
        Ok(())
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and greater than zero"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and non-negative"))
    }
}

pub(crate) fn invalid(field: &'static str, reason: &str) -> RailError {
    tracing::warn!(field, reason, "rejected simulation config");
    RailError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
