//! # Rust Physics
//!
//! A 2D collision and physics core for tile and sprite games.
//!
//! ## Features
//!
//! - **Shapes**: points, lines, circles, rectangles, ellipses and convex polygons
//! - **Broad Phase**: incremental sweep and prune over world bounding boxes
//! - **Narrow Phase**: GJK overlap test with EPA penetration depth
//! - **Collision Events**: begin, update and end listeners with gravity-relative queries
//! - **Effectors**: conveyor, wind, magnet, buoyancy and constant forces
//! - **Bodies**: fixed-step integration with grounding and jumping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let config = PhysicsConfig::default().with_gravity(Vec2::new(0.0, 300.0));
//!     let mut sim = Simulation::new(config)?;
//!
//!     let player = sim.world.spawn()
//!         .with(Area::rect(16.0, 16.0))
//!         .with(Body::new())
//!         .id();
//!     sim.world.spawn()
//!         .at(Vec2::new(-100.0, 64.0))
//!         .with(Area::rect(200.0, 16.0))
//!         .with(Body::static_body());
//!
//!     sim.world.on_collide_update(player, |world, col| {
//!         push_out(world, col);
//!     })?;
//!
//!     for _ in 0..60 {
//!         sim.frame(1.0 / 60.0);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod foundation;
pub mod physics;

mod simulation;

pub use error::PhysicsError;
pub use simulation::Simulation;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{Config, PhysicsConfig},
        ecs::{Entity, SystemPhase, World},
        foundation::{
            math::{Transform2D, Vec2},
            time::FixedTimestep,
        },
        physics::{
            push_out, Area, AreaEffector, Body, BuoyancyEffector, CollidePhase, Collision, ConstantForce,
            BodyEvent, Effector, ForceMode, HasArea, HasBody, PhysicsContext, PointEffector, Shape, SurfaceEffector,
        },
        PhysicsError, Simulation,
    };
}
