use crate::sim::Float3;

/// Velocity and inverse mass of one side of a constrained pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyState {
    pub velocity: Float3,
    pub inverse_mass: f32,
}

impl BodyState {
    /// `None` for a non-positive or non-finite mass. A non-finite velocity
    /// enters the solve as zero.
    pub fn new(velocity: Float3, mass: f32) -> Option<Self> {
        (mass.is_finite() && mass > 0.0).then(|| Self {
            velocity: velocity.finite_or_zero(),
            inverse_mass: 1.0 / mass,
        })
    }
}

/// Contact geometry for one pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContactGeometry {
    /// Unit solve direction, pointing from A to B.
    pub normal: Float3,
    /// Contact normal as reported by the host, either orientation.
    pub contact_normal: Float3,
    pub depth: f32,
}

/// Solves a non-penetration contact, returning the new velocities of A and B.
///
/// `None` when the pair is already separating fast enough that no impulse
/// is needed.
pub fn collision_impulse(
    a: BodyState,
    b: BodyState,
    contact: ContactGeometry,
    baumgarte_coeff: f32,
    dt: f32,
) -> Option<(Float3, Float3)> {
    let effective = a.inverse_mass + b.inverse_mass;
    if effective <= 0.0 || dt <= 0.0 {
        return None;
    }

    let n = contact.normal;
    let approach = n.dot(a.velocity) - n.dot(b.velocity);
    let alignment = n.dot(contact.contact_normal).abs();
    let bias = baumgarte_coeff / dt * contact.depth.max(0.0) * alignment;
    let lambda = -(approach + bias) / effective;
    if lambda.is_nan() || lambda >= 0.0 {
        return None;
    }

    Some((
        (a.velocity + n * (lambda * a.inverse_mass)).finite_or_zero(),
        (b.velocity - n * (lambda * b.inverse_mass)).finite_or_zero(),
    ))
}

/// Solves a distance joint between A and B.
///
/// `normal` points from A to B and `distance` is their current separation.
pub fn joint_impulse(
    a: BodyState,
    b: BodyState,
    normal: Float3,
    distance: f32,
    rest_length: f32,
    baumgarte_coeff: f32,
    dt: f32,
) -> (Float3, Float3) {
    let effective = a.inverse_mass + b.inverse_mass;
    if effective <= 0.0 || dt <= 0.0 {
        return (a.velocity, b.velocity);
    }

    let separating = b.velocity.dot(normal) - a.velocity.dot(normal);
    let bias = baumgarte_coeff / dt * (distance - rest_length);
    let lambda = -(separating + bias) / effective;

    (
        (a.velocity - normal * (lambda * a.inverse_mass)).finite_or_zero(),
        (b.velocity + normal * (lambda * b.inverse_mass)).finite_or_zero(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;
    const DT: f32 = 1.0 / 60.0;

    fn body(z: f32, mass: f32) -> BodyState {
        BodyState::new(Float3::new(0.0, 0.0, z), mass).unwrap()
    }

    fn along_z(depth: f32) -> ContactGeometry {
        ContactGeometry {
            normal: Float3::FORWARD,
            contact_normal: Float3::FORWARD,
            depth,
        }
    }

    #[test]
    fn equal_masses_closing_stop_relative_motion() {
        let (a, b) = collision_impulse(body(1.0, 10.0), body(-1.0, 10.0), along_z(0.0), 0.0, DT).unwrap();
        assert_relative_eq!(a.z - b.z, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(a.z, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(b.z, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn collision_conserves_momentum_along_normal() {
        let before_a = body(2.0, 10.0);
        let before_b = body(0.0, 10.0);
        let (a, b) = collision_impulse(before_a, before_b, along_z(0.0), 0.0, DT).unwrap();
        assert_relative_eq!(10.0 * a.z + 10.0 * b.z, 20.0, epsilon = TOLERANCE);
        assert_relative_eq!(a.z, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(b.z, 1.0, epsilon = TOLERANCE);
        // Post-impulse separating velocity is non-negative.
        assert!(b.z - a.z >= -TOLERANCE);
    }

    #[test]
    fn unequal_masses_split_impulse_by_inverse_mass() {
        let (a, b) = collision_impulse(body(3.0, 30.0), body(0.0, 10.0), along_z(0.0), 0.0, DT).unwrap();
        assert_relative_eq!(30.0 * a.z + 10.0 * b.z, 90.0, epsilon = 1e-4);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-4);
    }

    #[test]
    fn separating_pair_is_rejected() {
        assert!(collision_impulse(body(-1.0, 10.0), body(1.0, 10.0), along_z(0.0), 0.2, DT).is_none());
        assert!(collision_impulse(body(0.0, 10.0), body(0.0, 10.0), along_z(0.0), 0.2, DT).is_none());
    }

    #[test]
    fn penetration_bias_pushes_resting_pair_apart() {
        let (a, b) = collision_impulse(body(0.0, 10.0), body(0.0, 10.0), along_z(0.05), 0.2, DT).unwrap();
        assert!(a.z < 0.0);
        assert!(b.z > 0.0);
    }

    #[test]
    fn bias_ignores_contact_normal_orientation() {
        let flipped = ContactGeometry {
            contact_normal: Float3::BACK,
            ..along_z(0.05)
        };
        let forward = collision_impulse(body(0.0, 10.0), body(0.0, 10.0), along_z(0.05), 0.2, DT).unwrap();
        let backward = collision_impulse(body(0.0, 10.0), body(0.0, 10.0), flipped, 0.2, DT).unwrap();
        assert_relative_eq!(forward.0.z, backward.0.z, epsilon = TOLERANCE);
    }

    #[test]
    fn stretched_joint_pulls_pair_together() {
        let (a, b) = joint_impulse(body(0.0, 10.0), body(0.0, 10.0), Float3::FORWARD, 2.0, 1.5, 0.2, DT);
        assert!(a.z > 0.0);
        assert!(b.z < 0.0);
        assert_relative_eq!(a.z, -b.z, epsilon = TOLERANCE);
    }

    #[test]
    fn joint_matches_velocities_at_rest_length() {
        let (a, b) = joint_impulse(body(0.0, 10.0), body(1.0, 10.0), Float3::FORWARD, 1.5, 1.5, 0.2, DT);
        assert_relative_eq!(a.z, 0.5, epsilon = TOLERANCE);
        assert_relative_eq!(b.z, 0.5, epsilon = TOLERANCE);
    }

    #[test]
    fn non_finite_velocity_is_not_passed_on() {
        let broken = BodyState::new(Float3::new(0.0, 0.0, f32::NAN), 10.0).unwrap();
        assert_eq!(broken.velocity, Float3::ZERO);

        let (a, b) = collision_impulse(broken, body(-2.0, 10.0), along_z(0.0), 0.2, DT).unwrap();
        assert!(a.is_finite() && b.is_finite());
        assert_relative_eq!(a.z, -1.0, epsilon = TOLERANCE);
        assert_relative_eq!(b.z, -1.0, epsilon = TOLERANCE);

        let runaway = BodyState::new(Float3::new(f32::INFINITY, 0.0, 0.0), 10.0).unwrap();
        let (a, b) = joint_impulse(runaway, body(0.0, 10.0), Float3::FORWARD, 1.5, 1.5, 0.2, DT);
        assert_eq!(a, Float3::ZERO);
        assert_eq!(b, Float3::ZERO);
    }

    #[test]
    fn massless_body_is_rejected() {
        assert!(BodyState::new(Float3::ZERO, 0.0).is_none());
        assert!(BodyState::new(Float3::ZERO, f32::NAN).is_none());
    }
}
