use crate::world::EntityId;

use super::profile::SocketSpec;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SocketSide {
    Front,
    Back,
}

impl SocketSide {
    pub const BOTH: [SocketSide; 2] = [SocketSide::Front, SocketSide::Back];

    /// `+1.0` for the front, `-1.0` for the back.
    pub fn sign(self) -> f32 {
        match self {
            SocketSide::Front => 1.0,
            SocketSide::Back => -1.0,
        }
    }
}

/// Coupling held by one socket of a joined pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Joint {
    pub partner: EntityId,
    pub partner_side: SocketSide,
    /// Exactly one side of a pair owns the joint and solves it.
    pub owning: bool,
    /// Center distance the joint holds the pair at.
    pub rest_length: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Socket {
    pub spec: SocketSpec,
    pub joint: Option<Joint>,
}

impl Socket {
    pub fn new(spec: SocketSpec) -> Self {
        Self { spec, joint: None }
    }

    pub fn is_free(&self) -> bool {
        self.joint.is_none()
    }

    pub fn partner(&self) -> Option<EntityId> {
        self.joint.map(|joint| joint.partner)
    }

    /// Clears the joint if it points at `partner`.
    pub fn release(&mut self, partner: EntityId) -> Option<Joint> {
        if self.partner() == Some(partner) {
            self.joint.take()
        } else {
            None
        }
    }
}
