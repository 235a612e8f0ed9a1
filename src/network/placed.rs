use std::sync::Arc;

use crate::sim::Float3;
use crate::spline::{DescriptorId, PathSegment, Placement};
use crate::world::BlockPos;

/// Identity of one segment in the world: the rail block and which of its
/// path descriptors is meant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RailRef {
    pub block: BlockPos,
    pub descriptor: DescriptorId,
}

/// A built segment together with its world placement and rail friction.
#[derive(Debug, Clone)]
pub struct PlacedSegment {
    pub rail: RailRef,
    pub segment: Arc<PathSegment>,
    pub placement: Placement,
    pub friction: f32,
}

impl PlacedSegment {
    pub fn length(&self) -> f32 {
        self.segment.length()
    }

    pub fn point(&self, distance: f32) -> Float3 {
        self.segment.point(distance, &self.placement)
    }

    pub fn tangent(&self, distance: f32) -> Float3 {
        self.segment.tangent(distance, &self.placement)
    }

    pub fn normal(&self, distance: f32) -> Float3 {
        self.segment.normal(distance, &self.placement)
    }

    pub fn start_point(&self) -> Float3 {
        self.segment.start_point(&self.placement)
    }

    pub fn end_point(&self) -> Float3 {
        self.segment.end_point(&self.placement)
    }

    pub fn nearest_distance(&self, world_point: Float3) -> f32 {
        self.segment.nearest_distance(world_point, &self.placement)
    }

    pub fn contains(&self, distance: f32) -> bool {
        (0.0..=self.length()).contains(&distance)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::spline::CubicBezierCurve;

    /// Straight world-space segment from `a` to `b`, identity placement.
    pub(crate) fn placed_line(id: u32, a: Float3, b: Float3) -> PlacedSegment {
        let mut binormal = (b - a).normalize().cross(Float3::UP);
        if binormal == Float3::ZERO {
            binormal = Float3::RIGHT;
        }
        let segment =
            PathSegment::new(vec![CubicBezierCurve::line(a, b)], binormal, 100).unwrap();
        PlacedSegment {
            rail: RailRef {
                block: BlockPos::new(id as i32, 0, 0),
                descriptor: DescriptorId(id),
            },
            segment: Arc::new(segment),
            placement: Placement::default(),
            friction: 0.0,
        }
    }

    #[test]
    fn contains_covers_closed_range() {
        let p = placed_line(1, Float3::ZERO, Float3::new(0.0, 0.0, 2.0));
        assert!(p.contains(0.0));
        assert!(p.contains(p.length()));
        assert!(!p.contains(-0.01));
        assert!(!p.contains(p.length() + 0.01));
    }
}
