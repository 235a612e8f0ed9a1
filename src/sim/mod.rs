//! Math primitives and physics constants.
//!
//! Leaf module: no dependencies on the rest of the crate.

mod frame;
mod math;

pub mod physics;

pub use frame::Frame;
pub use math::{Float3, Quaternion};
pub use physics::{decelerate, finite_or_zero, DT, G, HZ};
