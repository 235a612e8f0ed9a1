use crate::error::{RailError, Result};
use crate::sim::{Float3, Quaternion};

use super::bezier::CubicBezierCurve;

/// World placement of a segment: the rail block's anchor and orientation.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Placement {
    pub position: Float3,
    pub rotation: Quaternion,
}

impl Placement {
    pub const fn new(position: Float3, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    pub fn to_world_point(&self, local: Float3) -> Float3 {
        self.rotation.mul_vec(local) + self.position
    }

    pub fn to_world_vector(&self, local: Float3) -> Float3 {
        self.rotation.mul_vec(local)
    }

    pub fn to_local_point(&self, world: Float3) -> Float3 {
        self.rotation.conjugate().mul_vec(world - self.position)
    }
}

/// Arc-length parameterized chain of cubic Bezier curves.
///
/// `arc_lengths[i]` is the cumulative length up to the end of curve `i`,
/// so the table is non-decreasing and its last entry is the total length.
/// Segments are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    curves: Vec<CubicBezierCurve>,
    start_binormal: Float3,
    arc_lengths: Vec<f32>,
    samples_per_curve: usize,
}

impl PathSegment {
    pub fn new(
        curves: Vec<CubicBezierCurve>,
        start_binormal: Float3,
        samples_per_curve: usize,
    ) -> Result<Self> {
        if curves.is_empty() {
            return Err(RailError::EmptySegment);
        }
        let samples = samples_per_curve.max(1);

        let mut arc_lengths = Vec::with_capacity(curves.len());
        let mut total = 0.0f32;
        for curve in &curves {
            let mut prev = curve.evaluate(0.0);
            for step in 1..=samples {
                let p = curve.evaluate(step as f32 / samples as f32);
                total += p.distance(prev);
                prev = p;
            }
            arc_lengths.push(total);
        }

        Ok(Self {
            curves,
            start_binormal,
            arc_lengths,
            samples_per_curve: samples,
        })
    }

    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    pub fn arc_lengths(&self) -> &[f32] {
        &self.arc_lengths
    }

    /// Maps an arc-length distance to `(curve index, local t)`.
    /// Distances outside `[0, length]` are clamped.
    pub fn distance_to_index(&self, distance: f32) -> (usize, f32) {
        let distance = distance.clamp(0.0, self.length());
        let last = self.arc_lengths.len() - 1;
        let index = self
            .arc_lengths
            .iter()
            .position(|&cum| distance <= cum)
            .unwrap_or(last);

        let prev = if index == 0 {
            0.0
        } else {
            self.arc_lengths[index - 1]
        };
        let span = self.arc_lengths[index] - prev;
        let t = if span > 0.0 {
            (distance - prev) / span
        } else {
            0.0
        };
        (index, t.clamp(0.0, 1.0))
    }

    pub fn local_point(&self, distance: f32) -> Float3 {
        let (index, t) = self.distance_to_index(distance);
        self.curves[index].evaluate(t)
    }

    pub fn local_tangent(&self, distance: f32) -> Float3 {
        let (index, t) = self.distance_to_index(distance);
        self.curves[index].tangent(t)
    }

    pub fn point(&self, distance: f32, placement: &Placement) -> Float3 {
        placement.to_world_point(self.local_point(distance))
    }

    pub fn tangent(&self, distance: f32, placement: &Placement) -> Float3 {
        placement.to_world_vector(self.local_tangent(distance))
    }

    /// Path up vector at `distance`.
    ///
    /// The starting normal (`binormal x start tangent`) is carried along by
    /// the shortest-arc rotation from the start tangent to the local tangent,
    /// so the frame stays continuous without flipping.
    pub fn normal(&self, distance: f32, placement: &Placement) -> Float3 {
        let start_tangent = self.local_tangent(0.0);
        let start_normal = self.start_binormal.cross(start_tangent).normalize();
        let rotation = Quaternion::from_to_rotation(start_tangent, self.local_tangent(distance));
        placement
            .to_world_vector(rotation.mul_vec(start_normal))
            .normalize()
    }

    pub fn start_point(&self, placement: &Placement) -> Float3 {
        self.point(0.0, placement)
    }

    pub fn end_point(&self, placement: &Placement) -> Float3 {
        self.point(self.length(), placement)
    }

    /// Distance along the segment closest to `world_point`.
    ///
    /// Brute-force over the build sampling grid; meant for attach time only.
    pub fn nearest_distance(&self, world_point: Float3, placement: &Placement) -> f32 {
        let local = placement.to_local_point(world_point);
        let samples = self.samples_per_curve;

        let mut best_distance = 0.0;
        let mut best_sq = f32::MAX;
        for (index, curve) in self.curves.iter().enumerate() {
            let prev = if index == 0 {
                0.0
            } else {
                self.arc_lengths[index - 1]
            };
            let span = self.arc_lengths[index] - prev;

            for step in 0..=samples {
                let t = step as f32 / samples as f32;
                let sq = (curve.evaluate(t) - local).sqr_magnitude();
                if sq < best_sq {
                    best_sq = sq;
                    best_distance = prev + span * t;
                }
            }
        }
        best_distance
    }
}
