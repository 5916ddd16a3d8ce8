//! Entity lifecycle notifications and collide listeners
//!
//! Lifecycle events are queued by the [`World`] and drained by the physics
//! context at the start of its next pass; nothing mutates the broad phase
//! while it is being swept.

use std::cell::RefCell;
use std::rc::Rc;

use super::{ComponentKind, Entity, World};
use crate::physics::{BodyEvent, CollidePhase, Collision};

/// Structural change to the entity set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Entity spawned
    Created(Entity),
    /// Entity destroyed
    Destroyed(Entity),
    /// Component attached to a live entity
    Attached(Entity, ComponentKind),
    /// Component detached from a live entity
    Detached(Entity, ComponentKind),
    /// Every entity of the scene was discarded
    SceneLeave,
}

/// Listener for collide begin/update events
pub type CollideListener = Rc<RefCell<dyn FnMut(&mut World, &Collision)>>;

/// Listener for collide end events, called with `(entity, other)`
pub type SeparateListener = Rc<RefCell<dyn FnMut(&mut World, Entity, Entity)>>;

/// Listener for landing, falling and headbutt notifications
pub type BodyListener = Rc<RefCell<dyn FnMut(&mut World, BodyEvent)>>;

/// Per-entity listener lists
#[derive(Default, Clone)]
pub(crate) struct Listeners {
    pub(crate) begin: Vec<CollideListener>,
    pub(crate) update: Vec<CollideListener>,
    pub(crate) end: Vec<SeparateListener>,
    pub(crate) body: Vec<BodyListener>,
}

impl Listeners {
    pub(crate) fn collide(&self, phase: CollidePhase) -> &[CollideListener] {
        match phase {
            CollidePhase::Begin => &self.begin,
            CollidePhase::Update => &self.update,
        }
    }
}

/// Listener bound to a pair of tags rather than an entity
#[derive(Clone)]
pub(crate) struct TagPair<L> {
    pub(crate) source: String,
    pub(crate) target: String,
    pub(crate) listener: L,
}

impl<L: Clone> TagPair<L> {
    fn listener_for(&self, world: &World, source: Entity, target: Entity) -> Option<L> {
        (world.has_tag(source, &self.source) && world.has_tag(target, &self.target)).then(|| self.listener.clone())
    }
}

/// Scene-wide listeners selected by the tags of both colliders
#[derive(Default, Clone)]
pub(crate) struct TagListeners {
    pub(crate) begin: Vec<TagPair<CollideListener>>,
    pub(crate) update: Vec<TagPair<CollideListener>>,
    pub(crate) end: Vec<TagPair<SeparateListener>>,
}

impl TagListeners {
    pub(crate) fn collide(&self, world: &World, phase: CollidePhase, collision: &Collision) -> Vec<CollideListener> {
        let pairs = match phase {
            CollidePhase::Begin => &self.begin,
            CollidePhase::Update => &self.update,
        };
        pairs
            .iter()
            .filter_map(|pair| pair.listener_for(world, collision.source, collision.target))
            .collect()
    }

    pub(crate) fn separate(&self, world: &World, entity: Entity, other: Entity) -> Vec<SeparateListener> {
        self.end.iter().filter_map(|pair| pair.listener_for(world, entity, other)).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.begin.clear();
        self.update.clear();
        self.end.clear();
    }
}
