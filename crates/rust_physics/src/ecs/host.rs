//! Physics capability traits implemented for [`World`]

use log::warn;

use super::{Entity, LifecycleEvent, World};
use crate::foundation::math::{Transform2D, Vec2};
use crate::physics::{
    apply_effector, ground_on_collision, Area, Body, BodyEvent, CollideDispatch, CollidePhase, Collision, ConstantForce,
    Effector, HasArea, HasBody, HasEffectors, LifecycleSource,
};

impl HasArea for World {
    fn exists(&self, entity: Entity) -> bool {
        World::exists(self, entity)
    }

    fn is_paused(&self, entity: Entity) -> bool {
        World::is_paused(self, entity)
    }

    fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        World::has_tag(self, entity, tag)
    }

    fn area(&self, entity: Entity) -> Option<&Area> {
        self.areas.get(entity)
    }

    fn area_entities(&self) -> Vec<Entity> {
        self.areas.keys().collect()
    }

    fn uses_area(&self) -> bool {
        !self.areas.is_empty()
    }

    fn refresh_world_area(&mut self, entity: Entity) -> bool {
        let transform = self.transforms.get(entity).copied().unwrap_or_default();
        match self.areas.get_mut(entity) {
            Some(area) => {
                area.update_world(&transform);
                true
            }
            None => false,
        }
    }
}

impl HasBody for World {
    fn body(&self, entity: Entity) -> Option<&Body> {
        self.bodies.get(entity)
    }

    fn body_mut(&mut self, entity: Entity) -> Option<&mut Body> {
        self.bodies.get_mut(entity)
    }

    fn body_entities(&self) -> Vec<Entity> {
        self.bodies.keys().collect()
    }

    fn transform(&self, entity: Entity) -> Option<&Transform2D> {
        self.transforms.get(entity)
    }

    fn translate(&mut self, entity: Entity, delta: Vec2) -> bool {
        match self.transforms.get_mut(entity) {
            Some(transform) => {
                transform.translate(delta);
                true
            }
            None => false,
        }
    }

    fn emit_body_event(&mut self, entity: Entity, event: BodyEvent) {
        let listeners = match self.listeners.get(entity) {
            Some(listeners) => listeners.body.clone(),
            None => return,
        };
        for listener in listeners {
            if !self.exists(entity) {
                break;
            }
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(self, event),
                Err(_) => warn!("Skipping re-entrant body listener on {entity:?}"),
            }
        }
    }
}

impl HasEffectors for World {
    fn effector(&self, entity: Entity) -> Option<&Effector> {
        self.effectors.get(entity)
    }

    fn constant_force(&self, entity: Entity) -> Option<&ConstantForce> {
        self.constant_forces.get(entity)
    }

    fn constant_force_entities(&self) -> Vec<Entity> {
        self.constant_forces.keys().collect()
    }
}

impl CollideDispatch for World {
    fn dispatch_collide(&mut self, phase: CollidePhase, collision: &Collision) {
        let entity = collision.source;
        if !self.exists(entity) {
            return;
        }
        if phase == CollidePhase::Update {
            apply_effector(self, collision);
            ground_on_collision(self, collision);
        }

        // Listeners may register more listeners or destroy the entity
        let mut listeners = match self.listeners.get(entity) {
            Some(listeners) => listeners.collide(phase).to_vec(),
            None => Vec::new(),
        };
        listeners.extend(self.tag_listeners.collide(self, phase, collision));
        for listener in listeners {
            if !self.exists(entity) {
                break;
            }
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(self, collision),
                Err(_) => warn!("Skipping re-entrant collide listener on {entity:?}"),
            }
        }
    }

    fn dispatch_separate(&mut self, entity: Entity, other: Entity) {
        let mut listeners = match self.listeners.get(entity) {
            Some(listeners) => listeners.end.clone(),
            None => Vec::new(),
        };
        listeners.extend(self.tag_listeners.separate(self, entity, other));
        for listener in listeners {
            if !self.exists(entity) {
                break;
            }
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(self, entity, other),
                Err(_) => warn!("Skipping re-entrant collide end listener on {entity:?}"),
            }
        }
    }
}

impl LifecycleSource for World {
    fn drain_lifecycle(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.lifecycle)
    }
}
