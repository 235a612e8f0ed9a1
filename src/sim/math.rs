use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 3D vector with f32 components.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Float3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, -1.0);

    pub fn magnitude(self) -> f32 {
        self.sqr_magnitude().sqrt()
    }

    pub fn sqr_magnitude(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag.is_nan() || mag < f32::EPSILON {
            return Self::ZERO;
        }
        self * (1.0 / mag)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).magnitude()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Replaces a vector with any NaN/inf component by zero.
    pub fn finite_or_zero(self) -> Self {
        if self.is_finite() {
            self
        } else {
            Self::ZERO
        }
    }

    /// Scales the vector down so its magnitude does not exceed `max`.
    pub fn clamp_magnitude(self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max && mag > 0.0 {
            self * (max / mag)
        } else {
            self
        }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Add for Float3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Float3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Float3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Float3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<f32> for Float3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f32> for Float3 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Float3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Default for Float3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Unit quaternion for 3D rotations.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub fn from_axis_angle(axis: Float3, angle: f32) -> Self {
        let half_angle = angle * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();
        let normalized = axis.normalize();

        Self::new(normalized.x * s, normalized.y * s, normalized.z * s, c)
    }

    /// Shortest-arc rotation taking direction `from` onto direction `to`.
    ///
    /// Antiparallel inputs rotate half a turn around any axis perpendicular
    /// to `from`. Degenerate inputs yield the identity.
    pub fn from_to_rotation(from: Float3, to: Float3) -> Self {
        let a = from.normalize();
        let b = to.normalize();
        if a == Float3::ZERO || b == Float3::ZERO {
            return Self::IDENTITY;
        }

        let d = a.dot(b);
        if d >= 1.0 - 1e-6 {
            return Self::IDENTITY;
        }
        if d <= -1.0 + 1e-6 {
            let mut axis = Float3::RIGHT.cross(a);
            if axis.sqr_magnitude() < 1e-6 {
                axis = Float3::UP.cross(a);
            }
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }

        let c = a.cross(b);
        Self::new(c.x, c.y, c.z, 1.0 + d).normalize()
    }

    /// Rotation whose local `FORWARD` maps to `forward` and local `UP`
    /// leans toward `up`.
    pub fn look_rotation(forward: Float3, up: Float3) -> Self {
        let f = forward.normalize();
        if f == Float3::ZERO {
            return Self::IDENTITY;
        }
        let mut r = up.cross(f).normalize();
        if r == Float3::ZERO {
            // up parallel to forward, pick any perpendicular
            r = Float3::UP.cross(f).normalize();
            if r == Float3::ZERO {
                r = Float3::RIGHT;
            }
        }
        let u = f.cross(r);

        // Columns (r, u, f) form the rotation matrix.
        let trace = r.x + u.y + f.z;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((u.z - f.y) / s, (f.x - r.z) / s, (r.y - u.x) / s, 0.25 * s)
        } else if r.x > u.y && r.x > f.z {
            let s = (1.0 + r.x - u.y - f.z).sqrt() * 2.0;
            Self::new(0.25 * s, (u.x + r.y) / s, (f.x + r.z) / s, (u.z - f.y) / s)
        } else if u.y > f.z {
            let s = (1.0 + u.y - r.x - f.z).sqrt() * 2.0;
            Self::new((u.x + r.y) / s, 0.25 * s, (f.y + u.z) / s, (f.x - r.z) / s)
        } else {
            let s = (1.0 + f.z - r.x - u.y).sqrt() * 2.0;
            Self::new((f.x + r.z) / s, (f.y + u.z) / s, 0.25 * s, (r.y - u.x) / s)
        };
        q.normalize()
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn normalize(self) -> Self {
        let mag = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if mag.is_nan() || mag < f32::EPSILON {
            return Self::IDENTITY;
        }
        Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
    }

    pub fn mul_vec(self, v: Float3) -> Float3 {
        let qv = Float3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * (2.0 * self.w)) + (uuv * 2.0)
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}
