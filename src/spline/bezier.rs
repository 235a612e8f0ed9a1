use serde::{Deserialize, Serialize};

use crate::sim::Float3;

/// Step used for the secant fallback when the analytic derivative vanishes.
const SECANT_STEP: f32 = 1e-3;

/// Cubic Bezier curve with four control points.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicBezierCurve {
    pub p0: Float3,
    pub p1: Float3,
    pub p2: Float3,
    pub p3: Float3,
}

impl CubicBezierCurve {
    pub const fn new(p0: Float3, p1: Float3, p2: Float3, p3: Float3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight curve from `a` to `b` with evenly spaced handles.
    pub fn line(a: Float3, b: Float3) -> Self {
        Self::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
    }

    pub fn evaluate(&self, t: f32) -> Float3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        self.p0 * b0 + self.p1 * b1 + self.p2 * b2 + self.p3 * b3
    }

    /// Unnormalized first derivative at `t`.
    pub fn derivative(&self, t: f32) -> Float3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Unit tangent at `t`.
    ///
    /// Coincident control points make the derivative vanish at the ends;
    /// a secant around `t` and then the chord stand in. Fully degenerate
    /// curves give zero rather than NaN.
    pub fn tangent(&self, t: f32) -> Float3 {
        let d = self.derivative(t).normalize();
        if d != Float3::ZERO {
            return d;
        }

        let t = t.clamp(0.0, 1.0);
        let lo = (t - SECANT_STEP).max(0.0);
        let hi = (t + SECANT_STEP).min(1.0);
        let secant = (self.evaluate(hi) - self.evaluate(lo)).normalize();
        if secant != Float3::ZERO {
            return secant;
        }

        (self.p3 - self.p0).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    fn arc() -> CubicBezierCurve {
        CubicBezierCurve::new(
            Float3::new(0.0, 0.0, 0.0),
            Float3::new(0.0, 0.0, 1.0),
            Float3::new(1.0, 0.0, 2.0),
            Float3::new(2.0, 0.0, 2.0),
        )
    }

    #[test]
    fn evaluate_hits_endpoints() {
        let c = arc();
        assert_eq!(c.evaluate(0.0), c.p0);
        assert_eq!(c.evaluate(1.0), c.p3);
    }

    #[test]
    fn evaluate_clamps_parameter() {
        let c = arc();
        assert_eq!(c.evaluate(-1.0), c.p0);
        assert_eq!(c.evaluate(2.0), c.p3);
    }

    #[test]
    fn line_midpoint_is_midpoint() {
        let c = CubicBezierCurve::line(Float3::ZERO, Float3::new(0.0, 0.0, 4.0));
        let mid = c.evaluate(0.5);
        assert_relative_eq!(mid.z, 2.0, epsilon = TOLERANCE);
    }

    #[test]
    fn tangent_follows_handles() {
        let c = arc();
        let start = c.tangent(0.0);
        let end = c.tangent(1.0);
        assert_relative_eq!(start.z, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(end.x, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn tangent_with_coincident_handles_is_finite() {
        let a = Float3::ZERO;
        let b = Float3::new(3.0, 0.0, 0.0);
        let c = CubicBezierCurve::new(a, a, b, b);
        let t0 = c.tangent(0.0);
        let t1 = c.tangent(1.0);
        assert!(t0.is_finite() && t1.is_finite());
        assert_relative_eq!(t0.x, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(t1.x, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn fully_degenerate_curve_has_zero_tangent() {
        let p = Float3::new(1.0, 2.0, 3.0);
        let c = CubicBezierCurve::new(p, p, p, p);
        assert_eq!(c.tangent(0.5), Float3::ZERO);
    }
}
