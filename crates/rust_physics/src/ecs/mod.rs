//! Minimal entity-component container hosting the physics core

pub mod component;
pub mod entity;
pub mod events;
pub mod scheduler;
pub mod world;

mod host;

pub use component::{Component, ComponentKind};
pub use entity::Entity;
pub use events::{BodyListener, CollideListener, LifecycleEvent, SeparateListener};
pub use scheduler::{Scheduler, SystemPhase};
pub use world::{EntityBuilder, World};
