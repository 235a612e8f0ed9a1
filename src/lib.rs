//! Railcart - spline-rail vehicle simulation for voxel worlds.
//!
//! # Architecture
//!
//! Layered modules with inward-only dependencies:
//!
//! - **sim**: Math primitives (Float3, Quaternion, Frame) and physics constants
//! - **spline**: Bezier curves, arc-length parameterized segments, segment cache
//! - **network**: Endpoint matching, splicing, neighbor resolution
//! - **vehicle**: Path following, per-tick integration, coupling sockets
//! - **solver**: Collision and joint impulses
//! - **world**: Contracts with the host (rays, rail bindings, free bodies)
//! - **simulation**: Fixed-timestep driver and vehicle registry
//!
//! # Usage
//!
//! ```ignore
//! use railcart::{RailSimulation, SimConfig, VehicleProfile};
//!
//! let mut sim = RailSimulation::new(SimConfig::default())?;
//! sim.add_vehicle(cart, VehicleProfile::default(), spawn)?;
//! for event in sim.step(&world, &mut bodies, &contacts) {
//!     // play sounds, sparks, ...
//! }
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod error;
pub mod network;
pub mod sim;
pub mod simulation;
pub mod solver;
pub mod spline;
pub mod vehicle;
pub mod world;

// Re-export commonly used types at crate root
pub use config::SimConfig;
pub use error::{RailError, Result};
pub use sim::{Float3, Frame, Quaternion};
pub use simulation::{RailSimulation, SimEvent};
pub use vehicle::{Vehicle, VehicleProfile};
pub use world::{BlockPos, BodyAccess, ContactEvent, EntityId, RailWorld};
