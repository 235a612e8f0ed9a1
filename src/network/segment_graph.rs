use crate::spline::{PathDescriptor, SegmentCache};
use crate::world::{BlockPos, RailAssociation, RailWorld};

use super::endpoint::{classify_at, EndpointMatch, SegmentEnd};
use super::placed::{PlacedSegment, RailRef};

/// Segment continuing another one, and how their endpoints meet.
///
/// `link` is seen from the segment being left: its first half is the exit
/// end, its second half the neighbor's entry end.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub segment: PlacedSegment,
    pub link: EndpointMatch,
}

/// Read-only rail topology queries used while following a path.
pub trait NeighborResolver {
    /// Current segment for `rail`; `None` once its association is gone.
    fn placed(&mut self, rail: RailRef) -> Option<PlacedSegment>;

    /// Segment continuing `current` past `end`.
    fn resolve_neighbor(&mut self, current: &PlacedSegment, end: SegmentEnd) -> Option<Neighbor>;
}

/// Neighbor resolution over a voxel world.
///
/// The candidate neighbor block is found from the descriptor's connection
/// offset for the requested end, rotated into the block's frame. A vertical
/// offset steps up or down and then back along the opposite end's horizontal
/// offset, continuing the climb instead of going straight through. A
/// horizontal offset with nothing matching also tries one block lower, where
/// a ramp climbing towards this rail ends.
pub struct SegmentGraph<'a, W: RailWorld + ?Sized> {
    world: &'a W,
    cache: &'a mut SegmentCache,
    epsilon: f32,
}

impl<'a, W: RailWorld + ?Sized> SegmentGraph<'a, W> {
    pub fn new(world: &'a W, cache: &'a mut SegmentCache, epsilon: f32) -> Self {
        Self {
            world,
            cache,
            epsilon,
        }
    }

    /// Every segment bound to `block`.
    pub fn placements_at(&mut self, block: BlockPos) -> Vec<PlacedSegment> {
        let Some(association) = self.world.resolve_association(block) else {
            return Vec::new();
        };
        association
            .descriptors
            .iter()
            .filter_map(|descriptor| self.place(block, &association, descriptor))
            .collect()
    }

    fn place(
        &mut self,
        block: BlockPos,
        association: &RailAssociation,
        descriptor: &PathDescriptor,
    ) -> Option<PlacedSegment> {
        let segment = match self.cache.get_or_build(descriptor) {
            Ok(segment) => segment,
            Err(err) => {
                tracing::warn!(descriptor = %descriptor.id, %block, error = %err, "skipping unusable path descriptor");
                return None;
            }
        };
        Some(PlacedSegment {
            rail: RailRef {
                block,
                descriptor: descriptor.id,
            },
            segment,
            placement: association.placement(block),
            friction: association.friction,
        })
    }

    /// Candidate block past `end`, and whether the end's offset is vertical.
    fn neighbor_block(
        block: BlockPos,
        association: &RailAssociation,
        descriptor: &PathDescriptor,
        end: SegmentEnd,
    ) -> (BlockPos, bool) {
        let (own, opposite) = match end {
            SegmentEnd::Start => (descriptor.start_offset, descriptor.end_offset),
            SegmentEnd::End => (descriptor.end_offset, descriptor.start_offset),
        };
        let step = BlockPos::round(association.rotation.mul_vec(own));
        if step.is_vertical() {
            let back = BlockPos::round(association.rotation.mul_vec(opposite)).horizontal();
            (block + step - back, true)
        } else {
            (block + step, false)
        }
    }

    /// First segment bound to `block` whose endpoint meets `end` of `current`.
    fn continuing(&mut self, current: &PlacedSegment, end: SegmentEnd, block: BlockPos) -> Option<Neighbor> {
        let epsilon = self.epsilon;
        self.placements_at(block)
            .into_iter()
            .filter(|placed| placed.rail != current.rail)
            .find_map(|placed| {
                let link = classify_at(current, end, &placed, epsilon);
                link.is_match().then_some(Neighbor {
                    segment: placed,
                    link,
                })
            })
    }
}

impl<W: RailWorld + ?Sized> NeighborResolver for SegmentGraph<'_, W> {
    fn placed(&mut self, rail: RailRef) -> Option<PlacedSegment> {
        let association = self.world.resolve_association(rail.block)?;
        let descriptor = association
            .descriptors
            .iter()
            .find(|d| d.id == rail.descriptor)?
            .clone();
        self.place(rail.block, &association, &descriptor)
    }

    fn resolve_neighbor(&mut self, current: &PlacedSegment, end: SegmentEnd) -> Option<Neighbor> {
        let association = self.world.resolve_association(current.rail.block)?;
        let descriptor = association
            .descriptors
            .iter()
            .find(|d| d.id == current.rail.descriptor)?
            .clone();

        let (candidate, vertical) = Self::neighbor_block(current.rail.block, &association, &descriptor, end);
        let mut found = self.continuing(current, end, candidate);
        if found.is_none() && !vertical {
            // A ramp's top end sits one level below the flat rail it meets.
            found = self.continuing(current, end, candidate - BlockPos::UP);
        }

        if found.is_none() {
            tracing::trace!(
                block = %current.rail.block,
                ?end,
                %candidate,
                "no continuing segment"
            );
        }
        found
    }
}
