//! Capabilities the physics core needs from its entity container
//!
//! The broad phase, narrow phase, effectors and integrator are written against
//! these narrow traits rather than a concrete world type. [`World`] implements
//! all of them.
//!
//! [`World`]: crate::ecs::World

use crate::ecs::{Entity, LifecycleEvent};
use crate::foundation::math::{Transform2D, Vec2};

use super::area::Area;
use super::body::{Body, BodyEvent};
use super::collision::{CollidePhase, Collision};
use super::effectors::{ConstantForce, Effector};
use super::shape::{Aabb, Shape};

/// Access to colliders
pub trait HasArea {
    /// Entity is alive
    fn exists(&self, entity: Entity) -> bool;

    /// Entity is paused and should not collide
    fn is_paused(&self, entity: Entity) -> bool;

    /// Entity carries `tag`
    fn has_tag(&self, entity: Entity, tag: &str) -> bool;

    /// Collider of an entity
    fn area(&self, entity: Entity) -> Option<&Area>;

    /// All entities currently carrying a collider
    fn area_entities(&self) -> Vec<Entity>;

    /// Any entity carries a collider
    fn uses_area(&self) -> bool;

    /// Recompute the cached world shape from the entity's current transform.
    /// Returns false if the entity has no collider.
    fn refresh_world_area(&mut self, entity: Entity) -> bool;

    /// Cached world shape
    fn world_shape(&self, entity: Entity) -> Option<&Shape> {
        self.area(entity).and_then(Area::world_shape)
    }

    /// Cached world bounding box
    fn world_bbox(&self, entity: Entity) -> Option<Aabb> {
        self.area(entity).and_then(Area::world_bbox)
    }

    /// `entity` lists one of `other`'s tags in its ignore list
    fn ignores(&self, entity: Entity, other: Entity) -> bool {
        self.area(entity).is_some_and(|area| {
            area.collision_ignore()
                .iter()
                .any(|tag| self.has_tag(other, tag))
        })
    }
}

/// Access to bodies and transforms
pub trait HasBody {
    /// Body of an entity
    fn body(&self, entity: Entity) -> Option<&Body>;

    /// Mutable body of an entity
    fn body_mut(&mut self, entity: Entity) -> Option<&mut Body>;

    /// All entities carrying a body
    fn body_entities(&self) -> Vec<Entity>;

    /// Transform of an entity
    fn transform(&self, entity: Entity) -> Option<&Transform2D>;

    /// Move an entity. Returns false if it has no transform.
    fn translate(&mut self, entity: Entity, delta: Vec2) -> bool;

    /// World position of an entity
    fn position(&self, entity: Entity) -> Option<Vec2> {
        self.transform(entity).map(|t| t.position)
    }

    /// Deliver a landing, falling or headbutt notification
    fn emit_body_event(&mut self, entity: Entity, event: BodyEvent) {
        let _ = (entity, event);
    }
}

/// Access to force generators
pub trait HasEffectors {
    /// Collision-driven effector of an entity
    fn effector(&self, entity: Entity) -> Option<&Effector>;

    /// Constant force of an entity
    fn constant_force(&self, entity: Entity) -> Option<&ConstantForce>;

    /// All entities carrying a constant force
    fn constant_force_entities(&self) -> Vec<Entity>;
}

/// Delivery of collision events to entity listeners
pub trait CollideDispatch {
    /// Deliver `collision` to its source entity
    fn dispatch_collide(&mut self, phase: CollidePhase, collision: &Collision);

    /// Tell `entity` it no longer overlaps `other`
    fn dispatch_separate(&mut self, entity: Entity, other: Entity);
}

/// Queued entity lifecycle notifications
pub trait LifecycleSource {
    /// Take every event queued since the last call
    fn drain_lifecycle(&mut self) -> Vec<LifecycleEvent>;
}
