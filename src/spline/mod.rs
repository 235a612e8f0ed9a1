//! Spline primitives and arc-length parameterized path segments.

mod bezier;
mod cache;
mod segment;

pub use bezier::CubicBezierCurve;
pub use cache::{DescriptorId, PathDescriptor, SegmentCache};
pub use segment::{PathSegment, Placement};
