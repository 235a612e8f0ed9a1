use crate::sim::Float3;

use super::placed::PlacedSegment;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SegmentEnd {
    Start,
    End,
}

impl SegmentEnd {
    pub fn opposite(self) -> Self {
        match self {
            SegmentEnd::Start => SegmentEnd::End,
            SegmentEnd::End => SegmentEnd::Start,
        }
    }
}

/// Relation between two segments' world-space endpoints.
///
/// The first half names the end of the first segment, the second half the
/// end of the second segment it coincides with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EndpointMatch {
    StartStart,
    StartEnd,
    EndStart,
    EndEnd,
    None,
}

impl EndpointMatch {
    pub fn from_ends(own: SegmentEnd, other: SegmentEnd) -> Self {
        match (own, other) {
            (SegmentEnd::Start, SegmentEnd::Start) => EndpointMatch::StartStart,
            (SegmentEnd::Start, SegmentEnd::End) => EndpointMatch::StartEnd,
            (SegmentEnd::End, SegmentEnd::Start) => EndpointMatch::EndStart,
            (SegmentEnd::End, SegmentEnd::End) => EndpointMatch::EndEnd,
        }
    }

    /// `(own end, other end)`, or `None` for an unmatched pair.
    pub fn ends(self) -> Option<(SegmentEnd, SegmentEnd)> {
        match self {
            EndpointMatch::StartStart => Some((SegmentEnd::Start, SegmentEnd::Start)),
            EndpointMatch::StartEnd => Some((SegmentEnd::Start, SegmentEnd::End)),
            EndpointMatch::EndStart => Some((SegmentEnd::End, SegmentEnd::Start)),
            EndpointMatch::EndEnd => Some((SegmentEnd::End, SegmentEnd::End)),
            EndpointMatch::None => None,
        }
    }

    /// End of the first segment involved in the match.
    pub fn exit_end(self) -> Option<SegmentEnd> {
        self.ends().map(|(own, _)| own)
    }

    /// End of the second segment involved in the match.
    pub fn entry_end(self) -> Option<SegmentEnd> {
        self.ends().map(|(_, other)| other)
    }

    /// The same relation seen from the other segment.
    pub fn mirrored(self) -> Self {
        match self {
            EndpointMatch::StartEnd => EndpointMatch::EndStart,
            EndpointMatch::EndStart => EndpointMatch::StartEnd,
            other => other,
        }
    }

    /// Crossing a same-named pair of ends flips the parameter direction.
    pub fn is_reversing(self) -> bool {
        matches!(self, EndpointMatch::StartStart | EndpointMatch::EndEnd)
    }

    pub fn is_match(self) -> bool {
        self != EndpointMatch::None
    }
}

fn end_point(placed: &PlacedSegment, end: SegmentEnd) -> Float3 {
    match end {
        SegmentEnd::Start => placed.start_point(),
        SegmentEnd::End => placed.end_point(),
    }
}

/// Classifies how `a` and `b` touch, checking every pair of ends.
pub fn classify(a: &PlacedSegment, b: &PlacedSegment, epsilon: f32) -> EndpointMatch {
    [SegmentEnd::Start, SegmentEnd::End]
        .into_iter()
        .map(|own| classify_at(a, own, b, epsilon))
        .find(|m| m.is_match())
        .unwrap_or(EndpointMatch::None)
}

/// Classifies only the pairs involving end `own` of `a`.
///
/// A neighbor continuing in the same parameter direction wins over one that
/// reverses it when both ends coincide.
pub fn classify_at(
    a: &PlacedSegment,
    own: SegmentEnd,
    b: &PlacedSegment,
    epsilon: f32,
) -> EndpointMatch {
    let point = end_point(a, own);
    [own.opposite(), own]
        .into_iter()
        .find(|&other| point.distance(end_point(b, other)) <= epsilon)
        .map(|other| EndpointMatch::from_ends(own, other))
        .unwrap_or(EndpointMatch::None)
}

/// Where a vehicle lands on the neighbor after crossing a matched boundary.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Splice {
    /// Distance on the neighbor. May fall outside `[0, length]` when the
    /// overflow is longer than the neighbor, in which case another splice
    /// follows.
    pub distance: f32,
    /// Parameter direction flips across this boundary.
    pub reversed: bool,
}

/// Remaps travel across a boundary.
///
/// `overflow` is the non-negative travel past the exit end. Entering the
/// neighbor at its Start lands at `overflow`; entering at its End lands at
/// `neighbor_length - overflow`.
pub fn splice(link: EndpointMatch, overflow: f32, neighbor_length: f32) -> Option<Splice> {
    let entry = link.entry_end()?;
    let overflow = overflow.max(0.0);
    let distance = match entry {
        SegmentEnd::Start => overflow,
        SegmentEnd::End => neighbor_length - overflow,
    };
    Some(Splice {
        distance,
        reversed: link.is_reversing(),
    })
}
