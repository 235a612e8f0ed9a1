use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::sim::Float3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Integer voxel coordinate. Block centers sit on integer world coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const UP: Self = Self::new(0, 1, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Rounds a world-space offset or position to the nearest block.
    pub fn round(v: Float3) -> Self {
        Self::new(v.x.round() as i32, v.y.round() as i32, v.z.round() as i32)
    }

    pub fn center(self) -> Float3 {
        Float3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn is_vertical(self) -> bool {
        self.x == 0 && self.z == 0 && self.y != 0
    }

    pub fn horizontal(self) -> Self {
        Self::new(self.x, 0, self.z)
    }
}

impl Add for BlockPos {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for BlockPos {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_snaps_to_nearest_block() {
        let p = BlockPos::round(Float3::new(0.9999, -1.2, 2.5001));
        assert_eq!(p, BlockPos::new(1, -1, 3));
    }

    #[test]
    fn vertical_offsets() {
        assert!(BlockPos::new(0, 1, 0).is_vertical());
        assert!(!BlockPos::new(0, 1, 1).is_vertical());
        assert!(!BlockPos::new(0, 0, 0).is_vertical());
        assert_eq!(BlockPos::new(2, 5, -1).horizontal(), BlockPos::new(2, 0, -1));
    }
}
