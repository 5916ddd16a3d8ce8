//! ECS World implementation

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, info, warn};
use slotmap::{SecondaryMap, SlotMap};

use super::events::{BodyListener, CollideListener, LifecycleEvent, Listeners, SeparateListener, TagListeners, TagPair};
use super::{Component, Entity};
use crate::error::PhysicsError;
use crate::foundation::math::{Transform2D, Vec2};
use crate::physics::{Area, Body, BodyEvent, Collision, ConstantForce, Effector};

#[derive(Debug, Default, Clone)]
struct EntityData {
    tags: HashSet<String>,
    paused: bool,
}

/// ECS World containing all entities and components
pub struct World {
    entities: SlotMap<Entity, EntityData>,
    pub(super) transforms: SecondaryMap<Entity, Transform2D>,
    pub(super) areas: SecondaryMap<Entity, Area>,
    pub(super) bodies: SecondaryMap<Entity, Body>,
    pub(super) effectors: SecondaryMap<Entity, Effector>,
    pub(super) constant_forces: SecondaryMap<Entity, ConstantForce>,
    pub(super) listeners: SecondaryMap<Entity, Listeners>,
    pub(super) tag_listeners: TagListeners,
    pub(super) lifecycle: Vec<LifecycleEvent>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            transforms: SecondaryMap::new(),
            areas: SecondaryMap::new(),
            bodies: SecondaryMap::new(),
            effectors: SecondaryMap::new(),
            constant_forces: SecondaryMap::new(),
            listeners: SecondaryMap::new(),
            tag_listeners: TagListeners::default(),
            lifecycle: Vec::new(),
        }
    }

    /// Create a new entity at the origin
    pub fn spawn(&mut self) -> EntityBuilder<'_> {
        let entity = self.entities.insert(EntityData::default());
        self.transforms.insert(entity, Transform2D::default());
        self.lifecycle.push(LifecycleEvent::Created(entity));
        EntityBuilder {
            world: self,
            entity,
            error: None,
        }
    }

    /// Destroy an entity and all of its components
    ///
    /// Safe to call from inside the entity's own listener; listeners that
    /// have not run yet for the current event are skipped.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if self.entities.remove(entity).is_none() {
            return false;
        }
        self.transforms.remove(entity);
        self.areas.remove(entity);
        self.bodies.remove(entity);
        self.effectors.remove(entity);
        self.constant_forces.remove(entity);
        self.listeners.remove(entity);
        self.lifecycle.push(LifecycleEvent::Destroyed(entity));
        debug!("Destroyed {entity:?}");
        true
    }

    /// Entity is alive
    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// No live entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate live entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Discard every entity and tell the physics context the scene changed
    pub fn clear_scene(&mut self) {
        let count = self.entities.len();
        self.entities.clear();
        self.transforms.clear();
        self.areas.clear();
        self.bodies.clear();
        self.effectors.clear();
        self.constant_forces.clear();
        self.listeners.clear();
        self.tag_listeners.clear();
        self.lifecycle.clear();
        self.lifecycle.push(LifecycleEvent::SceneLeave);
        info!("Scene cleared ({count} entities)");
    }

    /// Attach a component, replacing and returning any previous one
    ///
    /// Fails with [`PhysicsError::InvalidShape`] for a collider with
    /// non-finite or negative dimensions.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> Result<Option<C>, PhysicsError> {
        if !self.exists(entity) {
            return Err(PhysicsError::EntityNotFound(entity));
        }
        component.validate()?;
        Ok(self.attach(entity, component))
    }

    fn attach<C: Component>(&mut self, entity: Entity, component: C) -> Option<C> {
        let previous = C::storage_mut(self).insert(entity, component);
        if previous.is_none() {
            self.lifecycle.push(LifecycleEvent::Attached(entity, C::KIND));
        }
        previous
    }

    /// Detach a component
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        let removed = C::storage_mut(self).remove(entity);
        if removed.is_some() {
            self.lifecycle.push(LifecycleEvent::Detached(entity, C::KIND));
        }
        removed
    }

    /// Get a component from an entity
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        C::storage(self).get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        C::storage_mut(self).get_mut(entity)
    }

    /// Entity has a component of type `C`
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        C::storage(self).contains_key(entity)
    }

    /// Get a component or report which one is missing
    pub fn require<C: Component>(&self, entity: Entity) -> Result<&C, PhysicsError> {
        if !self.exists(entity) {
            return Err(PhysicsError::EntityNotFound(entity));
        }
        self.get(entity).ok_or(PhysicsError::MissingComponent {
            entity,
            component: C::KIND,
        })
    }

    /// Iterate every entity carrying `C`
    pub fn query<C: Component>(&self) -> impl Iterator<Item = (Entity, &C)> + '_ {
        C::storage(self).iter()
    }

    /// Add a tag
    pub fn add_tag(&mut self, entity: Entity, tag: impl Into<String>) -> Result<(), PhysicsError> {
        let data = self.entities.get_mut(entity).ok_or(PhysicsError::EntityNotFound(entity))?;
        data.tags.insert(tag.into());
        Ok(())
    }

    /// Remove a tag
    pub fn remove_tag(&mut self, entity: Entity, tag: &str) -> bool {
        self.entities.get_mut(entity).is_some_and(|data| data.tags.remove(tag))
    }

    /// Entity carries `tag`
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.entities.get(entity).is_some_and(|data| data.tags.contains(tag))
    }

    /// Pause or resume an entity. Paused entities take no part in collisions.
    pub fn set_paused(&mut self, entity: Entity, paused: bool) -> Result<(), PhysicsError> {
        let data = self.entities.get_mut(entity).ok_or(PhysicsError::EntityNotFound(entity))?;
        data.paused = paused;
        Ok(())
    }

    /// Entity is paused
    pub fn is_paused(&self, entity: Entity) -> bool {
        self.entities.get(entity).is_some_and(|data| data.paused)
    }

    /// Call `listener` when `entity` starts overlapping another collider
    pub fn on_collide<F>(&mut self, entity: Entity, listener: F) -> Result<(), PhysicsError>
    where
        F: FnMut(&mut World, &Collision) + 'static,
    {
        let listener: CollideListener = Rc::new(RefCell::new(listener));
        self.listeners_mut(entity)?.begin.push(listener);
        Ok(())
    }

    /// Call `listener` on every pass in which `entity` overlaps another collider
    pub fn on_collide_update<F>(&mut self, entity: Entity, listener: F) -> Result<(), PhysicsError>
    where
        F: FnMut(&mut World, &Collision) + 'static,
    {
        let listener: CollideListener = Rc::new(RefCell::new(listener));
        self.listeners_mut(entity)?.update.push(listener);
        Ok(())
    }

    /// Call `listener` with `(entity, other)` when an overlap ends
    pub fn on_collide_end<F>(&mut self, entity: Entity, listener: F) -> Result<(), PhysicsError>
    where
        F: FnMut(&mut World, Entity, Entity) + 'static,
    {
        let listener: SeparateListener = Rc::new(RefCell::new(listener));
        self.listeners_mut(entity)?.end.push(listener);
        Ok(())
    }

    /// Call `listener` when an entity tagged `source_tag` starts overlapping
    /// one tagged `target_tag`
    ///
    /// Tag listeners run after the source entity's own listeners and are
    /// discarded by [`World::clear_scene`].
    pub fn on_collide_tags<F>(&mut self, source_tag: &str, target_tag: &str, listener: F)
    where
        F: FnMut(&mut World, &Collision) + 'static,
    {
        let listener: CollideListener = Rc::new(RefCell::new(listener));
        self.tag_listeners.begin.push(tag_pair(source_tag, target_tag, listener));
    }

    /// Tag-pair form of [`World::on_collide_update`]
    pub fn on_collide_update_tags<F>(&mut self, source_tag: &str, target_tag: &str, listener: F)
    where
        F: FnMut(&mut World, &Collision) + 'static,
    {
        let listener: CollideListener = Rc::new(RefCell::new(listener));
        self.tag_listeners.update.push(tag_pair(source_tag, target_tag, listener));
    }

    /// Tag-pair form of [`World::on_collide_end`]
    ///
    /// Not called when `other` was destroyed, since its tags are gone.
    pub fn on_collide_end_tags<F>(&mut self, source_tag: &str, target_tag: &str, listener: F)
    where
        F: FnMut(&mut World, Entity, Entity) + 'static,
    {
        let listener: SeparateListener = Rc::new(RefCell::new(listener));
        self.tag_listeners.end.push(tag_pair(source_tag, target_tag, listener));
    }

    /// Call `listener` when `entity`'s body lands, starts falling or headbutts
    pub fn on_body_event<F>(&mut self, entity: Entity, listener: F) -> Result<(), PhysicsError>
    where
        F: FnMut(&mut World, BodyEvent) + 'static,
    {
        let listener: BodyListener = Rc::new(RefCell::new(listener));
        self.listeners_mut(entity)?.body.push(listener);
        Ok(())
    }

    fn listeners_mut(&mut self, entity: Entity) -> Result<&mut Listeners, PhysicsError> {
        if !self.exists(entity) {
            return Err(PhysicsError::EntityNotFound(entity));
        }
        if !self.listeners.contains_key(entity) {
            self.listeners.insert(entity, Listeners::default());
        }
        self.listeners.get_mut(entity).ok_or(PhysicsError::EntityNotFound(entity))
    }
}

fn tag_pair<L>(source: &str, target: &str, listener: L) -> TagPair<L> {
    TagPair {
        source: source.to_string(),
        target: target.to_string(),
        listener,
    }
}

/// Fluent entity construction returned by [`World::spawn`]
///
/// Components that fail validation are not attached. [`EntityBuilder::build`]
/// reports the first such failure; [`EntityBuilder::id`] only logs it.
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    entity: Entity,
    error: Option<PhysicsError>,
}

impl EntityBuilder<'_> {
    /// Attach a component
    pub fn with<C: Component>(mut self, component: C) -> Self {
        match component.validate() {
            Ok(()) => {
                self.world.attach(self.entity, component);
            }
            Err(e) => {
                warn!("Not attaching {} to {:?}: {e}", C::KIND, self.entity);
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Place the entity at `position`
    pub fn at(self, position: Vec2) -> Self {
        if let Some(transform) = self.world.transforms.get_mut(self.entity) {
            transform.position = position;
        }
        self
    }

    /// Add a tag
    pub fn tag(self, tag: impl Into<String>) -> Self {
        if let Some(data) = self.world.entities.get_mut(self.entity) {
            data.tags.insert(tag.into());
        }
        self
    }

    /// Finish and return the entity
    pub fn id(self) -> Entity {
        self.entity
    }

    /// Finish, or destroy the entity again if a component was rejected
    pub fn build(self) -> Result<Entity, PhysicsError> {
        match self.error {
            None => Ok(self.entity),
            Some(e) => {
                self.world.destroy(self.entity);
                Err(e)
            }
        }
    }
}
