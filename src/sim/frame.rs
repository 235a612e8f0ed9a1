use super::math::{Float3, Quaternion};

/// Orthonormal orientation of a vehicle on a path.
///
/// - `direction`: travel direction (sign-corrected path tangent)
/// - `normal`: path up vector
/// - `lateral`: `normal x direction`, pointing to the vehicle's right
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub direction: Float3,
    pub normal: Float3,
    pub lateral: Float3,
}

impl Frame {
    pub const fn new(direction: Float3, normal: Float3, lateral: Float3) -> Self {
        Self {
            direction,
            normal,
            lateral,
        }
    }

    /// Builds a frame from a travel direction and an approximate up vector.
    ///
    /// The direction is preserved exactly; the normal is orthogonalized
    /// against it. A normal parallel to the direction falls back to world up.
    pub fn from_direction_normal(direction: Float3, normal: Float3) -> Self {
        let dir = direction.normalize();
        let mut up = (normal - dir * dir.dot(normal)).normalize();
        if up == Float3::ZERO {
            up = (Float3::UP - dir * dir.y).normalize();
        }
        let lateral = up.cross(dir).normalize();
        Self::new(dir, up, lateral)
    }

    /// World rotation whose forward axis is `direction` and up axis `normal`.
    pub fn rotation(&self) -> Quaternion {
        Quaternion::look_rotation(self.direction, self.normal)
    }

    pub const DEFAULT: Self = Self::new(Float3::FORWARD, Float3::UP, Float3::RIGHT);
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}
