use thiserror::Error;

use crate::network::{splice, NeighborResolver, PlacedSegment, SegmentEnd};
use crate::sim::{physics, Float3};

/// Why a vehicle left its path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DetachReason {
    #[error("no segment continues the path")]
    DeadEnd,
    #[error("rail association no longer valid")]
    AssociationLost,
    #[error("too many segment boundaries crossed in one step")]
    SpliceLimit,
    #[error("vehicle removed")]
    Removed,
}

/// Path-following state of an attached vehicle.
#[derive(Debug, Clone)]
pub struct PathState {
    pub segment: PlacedSegment,
    /// Arc-length coordinate on `segment`.
    pub distance: f32,
    /// `+1.0` when the heading runs with increasing distance, `-1.0` against it.
    pub direction: f32,
    /// Signed speed along the heading.
    pub speed: f32,
}

impl PathState {
    /// Sign-corrected path tangent.
    pub fn heading(&self) -> Float3 {
        self.segment.tangent(self.distance) * self.direction
    }

    pub fn velocity(&self) -> Float3 {
        (self.heading() * self.speed).finite_or_zero()
    }

    pub fn position(&self) -> Float3 {
        self.segment.point(self.distance)
    }

    pub fn normal(&self) -> Float3 {
        self.segment.normal(self.distance)
    }

    /// Distance delta for moving `travel` units along the heading.
    pub fn delta_for(&self, travel: f32) -> f32 {
        travel * self.direction
    }
}

#[derive(Debug, Clone, Default)]
pub enum FollowerState {
    #[default]
    Detached,
    Attached(PathState),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Nothing to do, the vehicle is detached.
    Idle,
    Moved,
    /// Crossed this many segment boundaries.
    Spliced(usize),
}

/// Where a walk along the graph ended up.
struct Walk {
    segment: PlacedSegment,
    distance: f32,
    direction: f32,
    splices: usize,
}

/// Tracks which segment a vehicle rides and where on it.
#[derive(Debug, Clone, Default)]
pub struct VehiclePathFollower {
    state: FollowerState,
    detached_at: Option<f64>,
}

impl VehiclePathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FollowerState {
        &self.state
    }

    pub fn path_state(&self) -> Option<&PathState> {
        match &self.state {
            FollowerState::Attached(state) => Some(state),
            FollowerState::Detached => None,
        }
    }

    pub fn path_state_mut(&mut self) -> Option<&mut PathState> {
        match &mut self.state {
            FollowerState::Attached(state) => Some(state),
            FollowerState::Detached => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, FollowerState::Attached(_))
    }

    pub fn detached_at(&self) -> Option<f64> {
        self.detached_at
    }

    /// Detached, and the cooldown since the last detach has run out.
    pub fn can_attach(&self, now: f64, cooldown: f64) -> bool {
        !self.is_attached() && self.detached_at.is_none_or(|t| now - t >= cooldown)
    }

    /// Attaches at the point of `segment` nearest `contact`, seeding the
    /// path speed from the free velocity.
    pub fn attach(&mut self, segment: PlacedSegment, contact: Float3, velocity: Float3) {
        let distance = segment.nearest_distance(contact);
        let heading = segment.tangent(distance);
        let speed = velocity.dot(heading);
        self.state = FollowerState::Attached(PathState {
            segment,
            distance,
            direction: 1.0,
            speed: physics::finite_or_zero(speed),
        });
    }

    /// Moves `delta_distance` along the current segment, splicing onto
    /// neighbors at the ends. Nothing is committed on failure.
    pub fn advance<R: NeighborResolver + ?Sized>(
        &mut self,
        delta_distance: f32,
        resolver: &mut R,
        max_splices: usize,
    ) -> Result<AdvanceOutcome, DetachReason> {
        let FollowerState::Attached(state) = &mut self.state else {
            return Ok(AdvanceOutcome::Idle);
        };

        let walk = walk(state, delta_distance, resolver, max_splices)?;
        if walk.splices > 0 {
            tracing::debug!(
                block = %walk.segment.rail.block,
                distance = walk.distance,
                splices = walk.splices,
                "spliced onto neighbor segment"
            );
        }

        state.segment = walk.segment;
        state.distance = walk.distance;
        state.direction = walk.direction;

        Ok(match walk.splices {
            0 => AdvanceOutcome::Moved,
            n => AdvanceOutcome::Spliced(n),
        })
    }

    /// World point `travel` units ahead along the heading (behind when
    /// negative), following the graph without moving the vehicle.
    pub fn probe<R: NeighborResolver + ?Sized>(
        &self,
        travel: f32,
        resolver: &mut R,
        max_splices: usize,
    ) -> Option<Float3> {
        let state = self.path_state()?;
        let walk = walk(state, state.delta_for(travel), resolver, max_splices).ok()?;
        Some(walk.segment.point(walk.distance))
    }

    /// Leaves the path, returning the free velocity to continue with.
    pub fn detach(&mut self, now: f64) -> Option<Float3> {
        let FollowerState::Attached(state) = std::mem::take(&mut self.state) else {
            return None;
        };
        self.detached_at = Some(now);
        Some(state.velocity())
    }
}

fn walk<R: NeighborResolver + ?Sized>(
    state: &PathState,
    delta_distance: f32,
    resolver: &mut R,
    max_splices: usize,
) -> Result<Walk, DetachReason> {
    let mut segment = resolver
        .placed(state.segment.rail)
        .ok_or(DetachReason::AssociationLost)?;
    let mut distance = state.distance + delta_distance;
    let mut direction = state.direction;
    let mut splices = 0;

    while !segment.contains(distance) {
        if splices >= max_splices {
            return Err(DetachReason::SpliceLimit);
        }

        let (end, boundary, overflow) = if distance > segment.length() {
            (SegmentEnd::End, segment.length(), distance - segment.length())
        } else {
            (SegmentEnd::Start, 0.0, -distance)
        };
        let exit_heading = segment.tangent(boundary) * direction;

        let neighbor = resolver
            .resolve_neighbor(&segment, end)
            .ok_or(DetachReason::DeadEnd)?;
        let landing =
            splice(neighbor.link, overflow, neighbor.segment.length()).ok_or(DetachReason::DeadEnd)?;

        segment = neighbor.segment;
        distance = landing.distance;
        let entry_tangent = segment.tangent(distance.clamp(0.0, segment.length()));
        let alignment = entry_tangent.dot(exit_heading);
        direction = if alignment > 0.0 {
            1.0
        } else if alignment < 0.0 {
            -1.0
        } else if landing.reversed {
            -direction
        } else {
            direction
        };
        splices += 1;
    }

    Ok(Walk {
        segment,
        distance,
        direction,
        splices,
    })
}
