//! Collision events
//!
//! A [`Collision`] is built by the collision pass for every overlapping pair,
//! delivered to the source entity, then mirrored with [`Collision::reverse`]
//! and delivered to the target. It is never stored past delivery.

use std::cell::Cell;
use std::rc::Rc;

use crate::ecs::Entity;
use crate::foundation::math::{cross, gravity_direction, Vec2};

/// Which collide listeners an event is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollidePhase {
    /// First pass in which the pair overlaps
    Begin,
    /// Every pass in which the pair overlaps
    Update,
}

/// Unordered pair of entities (smaller key stored first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Entity with the smaller key
    pub entity_a: Entity,
    /// Entity with the larger key
    pub entity_b: Entity,
}

impl CollisionPair {
    /// Create a new collision pair (always stores smaller entity key first for consistency)
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        if entity_a < entity_b {
            Self { entity_a, entity_b }
        } else {
            Self { entity_a: entity_b, entity_b: entity_a }
        }
    }

    /// Check if the pair involves `entity`
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// The partner of `entity` in this pair
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.entity_a == entity {
            Some(self.entity_b)
        } else if self.entity_b == entity {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

/// One direction of an overlapping pair
///
/// `normal` points from `source` towards `target`, so moving the source by
/// `-displacement()` separates the two. Clones and the reversed event share
/// the same resolved flag.
#[derive(Debug, Clone)]
pub struct Collision {
    /// Entity receiving this event
    pub source: Entity,
    /// Entity it overlaps
    pub target: Entity,
    /// Unit contact normal from source to target
    pub normal: Vec2,
    /// Penetration depth along `normal`
    pub distance: f32,
    gravity: Vec2,
    resolved: Rc<Cell<bool>>,
}

impl Collision {
    /// Create an unresolved collision. `gravity` is the global gravity at
    /// detection time and orients the direction queries.
    pub fn new(source: Entity, target: Entity, normal: Vec2, distance: f32, gravity: Vec2) -> Self {
        Self {
            source,
            target,
            normal,
            distance,
            gravity,
            resolved: Rc::new(Cell::new(false)),
        }
    }

    /// `normal * distance`
    pub fn displacement(&self) -> Vec2 {
        self.normal * self.distance
    }

    /// Same contact seen from the target
    pub fn reverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            normal: -self.normal,
            distance: self.distance,
            gravity: self.gravity,
            resolved: Rc::clone(&self.resolved),
        }
    }

    /// True when the displacement is non-zero
    pub fn has_overlap(&self) -> bool {
        self.displacement() != Vec2::zeros()
    }

    /// Gravity in effect when the collision was detected
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Unit "down" direction used by the side queries
    pub fn down(&self) -> Vec2 {
        gravity_direction(&self.gravity)
    }

    /// Source is on the left of the target
    pub fn is_left(&self) -> bool {
        cross(&self.displacement(), &self.down()) > 0.0
    }

    /// Source is on the right of the target
    pub fn is_right(&self) -> bool {
        cross(&self.displacement(), &self.down()) < 0.0
    }

    /// Source is on top of the target
    pub fn is_top(&self) -> bool {
        self.displacement().dot(&self.down()) > 0.0
    }

    /// Source is below the target
    pub fn is_bottom(&self) -> bool {
        self.displacement().dot(&self.down()) < 0.0
    }

    /// Ask later listeners not to separate this pair this tick
    pub fn prevent_resolution(&self) {
        self.resolved.set(true);
    }

    /// Whether resolution was prevented or already performed
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }
}
