use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{physics, Float3};

use super::bezier::CubicBezierCurve;
use super::segment::PathSegment;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DescriptorId(pub u32);

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorId({})", self.0)
    }
}

/// Reusable spline shape of a rail block, in block-local space.
///
/// `start_offset` and `end_offset` are the asset-defined connection offsets:
/// the block-grid step from this block toward the neighbor continuing the
/// path at that end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub id: DescriptorId,
    pub curves: Vec<CubicBezierCurve>,
    pub start_binormal: Float3,
    pub start_offset: Float3,
    pub end_offset: Float3,
}

/// Built segments keyed by descriptor identity.
///
/// Each descriptor is built once; the returned `Arc`s are shared read-only.
#[derive(Debug)]
pub struct SegmentCache {
    segments: HashMap<DescriptorId, Arc<PathSegment>>,
    samples_per_curve: usize,
}

impl SegmentCache {
    pub fn new(samples_per_curve: usize) -> Self {
        Self {
            segments: HashMap::new(),
            samples_per_curve,
        }
    }

    pub fn get(&self, id: DescriptorId) -> Option<Arc<PathSegment>> {
        self.segments.get(&id).cloned()
    }

    pub fn get_or_build(&mut self, descriptor: &PathDescriptor) -> Result<Arc<PathSegment>> {
        if let Some(segment) = self.segments.get(&descriptor.id) {
            return Ok(Arc::clone(segment));
        }

        let segment = Arc::new(PathSegment::new(
            descriptor.curves.clone(),
            descriptor.start_binormal,
            self.samples_per_curve,
        )?);
        tracing::debug!(
            descriptor = %descriptor.id,
            curves = descriptor.curves.len(),
            length = segment.length(),
            "built path segment"
        );
        self.segments.insert(descriptor.id, Arc::clone(&segment));
        Ok(segment)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new(physics::SAMPLES_PER_CURVE)
    }
}
