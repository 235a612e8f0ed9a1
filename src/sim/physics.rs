//! Physics constants shared by the integrator and the constraint solver.
//!
//! These are the defaults behind [`SimConfig`](crate::config::SimConfig);
//! runtime code reads the config, not these constants directly.

/// Gravitational acceleration, world units per second squared.
pub const G: f32 = 9.81;
/// Simulation ticks per second.
pub const HZ: f32 = 60.0;
/// Fixed timestep in seconds.
pub const DT: f32 = 1.0 / HZ;

/// Maximum speed of a vehicle, path-relative or free, in world units per second.
pub const VELOCITY_CAP: f32 = 15.0;
/// Fraction of penetration or joint error corrected per second of `dt`.
pub const BAUMGARTE_COEFF: f32 = 0.2;
/// Joint length past which a coupling breaks, in world units.
pub const CART_JOINT_BREAK_DISTANCE: f32 = 8.0;
/// Stand-in mass for characters, which carry no rigid-body mass.
pub const PLAYER_MASS: f32 = 10.0;

/// Seconds a detached vehicle waits before it may attach again.
pub const DETACH_COOLDOWN: f64 = 1.5;
/// Length of the downward attach ray, in world units.
pub const ATTACH_PROBE_DISTANCE: f32 = 1.2;
/// Largest gap between two endpoints that still connects them, in world units.
pub const ENDPOINT_EPSILON: f32 = 0.09;
/// Arc-length samples taken per Bezier curve when a segment is built.
pub const SAMPLES_PER_CURVE: usize = 100;
/// Segment boundaries one advance may cross before the vehicle detaches.
pub const MAX_SPLICES_PER_ADVANCE: usize = 8;

/// Returns `value`, or zero when it is NaN or infinite.
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Reduces the magnitude of `speed` by `amount` without letting it change sign.
pub fn decelerate(speed: f32, amount: f32) -> f32 {
    let magnitude = (speed.abs() - amount.abs()).max(0.0);
    magnitude.copysign(speed)
}
