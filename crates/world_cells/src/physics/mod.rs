//! Physics module for collision filtering and hit testing
//!
//! Holds the shapes sweeps are built from, the capability surface the cell
//! core expects from simulated objects, and the registry those objects live
//! in.

pub mod attack;
pub mod object;
pub mod outcome;
pub mod primitives;
pub mod registry;

pub use attack::{AttackCone, AttackInfo, HitLocation};
pub use object::{Body, ObjectId, PhysicsState, SimObject};
pub use outcome::TransitionState;
pub use primitives::{Aabb, CylSphere, Sphere};
pub use registry::{ObjectKey, ObjectRegistry};
