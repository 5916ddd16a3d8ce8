//! Physics and collision systems
//!
//! Leaves first: [`shape`] → [`broad_phase`] → [`gjk`] → [`collision`] →
//! [`effectors`] / [`body`]. [`PhysicsContext`] ties them into a per-tick
//! collision pass over any host implementing the traits in [`host`].

pub mod area;
pub mod body;
pub mod broad_phase;
pub mod collision;
pub mod context;
pub mod effectors;
pub mod gjk;
pub mod host;
pub mod integrator;
pub mod resolution;
pub mod shape;

#[cfg(test)]
mod tests;

pub use area::Area;
pub use body::{ground_on_collision, Body, BodyEvent, BodyKind};
pub use broad_phase::{CandidatePairs, SweepAndPrune};
pub use collision::{CollidePhase, Collision, CollisionPair};
pub use context::{PassStats, PhysicsContext};
pub use effectors::{
    apply_effector, AreaEffector, BuoyancyEffector, ConstantForce, Effector, EffectorInput, ForceMode, PointEffector,
    SurfaceEffector,
};
pub use gjk::{GjkSettings, Penetration};
pub use host::{CollideDispatch, HasArea, HasBody, HasEffectors, LifecycleSource};
pub use integrator::{apply_constant_forces, integrate_bodies};
pub use resolution::push_out;
pub use shape::{Aabb, Shape, SupportMap};
