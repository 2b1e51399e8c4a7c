//! Hand-driven 2D physics
//!
//! Single-threaded and synchronous: one `tick` per render frame, no state
//! outside the world itself.

pub mod collision;
pub mod object;
pub mod world;

pub use collision::{CollisionResult, WallContact, object_overlap, resolve_walls, separate};
pub use object::{ObjectSnapshot, PhysicsObject};
pub use world::{PhysicsWorld, step_scale};
