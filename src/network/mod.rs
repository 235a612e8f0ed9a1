//! Rail topology: which segment continues another, and how travel maps
//! across the boundary.

mod endpoint;
mod placed;
mod segment_graph;

pub use endpoint::{classify, classify_at, splice, EndpointMatch, SegmentEnd, Splice};
pub use placed::{PlacedSegment, RailRef};
pub use segment_graph::{Neighbor, NeighborResolver, SegmentGraph};

#[cfg(test)]
pub(crate) use placed::tests::placed_line;
#[cfg(test)]
pub(crate) use segment_graph::tests::{
    ramp_descriptor, straight_descriptor, straight_line, TestRails,
};
