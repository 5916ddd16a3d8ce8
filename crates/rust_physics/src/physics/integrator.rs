//! Fixed-step integration of bodies and constant forces

use log::trace;

use super::body::BodyEvent;
use super::host::{HasBody, HasEffectors};
use crate::foundation::math::Vec2;

/// Step every body once and move its entity
///
/// Airborne bodies that turn from rising or resting to falling raise
/// [`BodyEvent::Fall`]. Returns the number of entities that moved.
pub fn integrate_bodies<H: HasBody + ?Sized>(host: &mut H, gravity: Vec2, dt: f32) -> usize {
    let mut moved = 0;
    for entity in host.body_entities() {
        let Some(body) = host.body_mut(entity) else {
            continue;
        };
        let was_falling = body.is_grounded() || body.is_falling(&gravity);
        let delta = body.step(gravity, dt);
        if !was_falling && body.is_falling(&gravity) {
            host.emit_body_event(entity, BodyEvent::Fall);
        }
        if delta == Vec2::zeros() {
            continue;
        }
        if host.translate(entity, delta) {
            moved += 1;
        } else {
            trace!("{entity:?} has a body but no transform");
        }
    }
    moved
}

/// Push each constant force into its entity's body
pub fn apply_constant_forces<H: HasBody + HasEffectors + ?Sized>(host: &mut H) {
    for entity in host.constant_force_entities() {
        let Some(force) = host.constant_force(entity).map(|c| c.force) else {
            continue;
        };
        if let Some(body) = host.body_mut(entity) {
            body.add_force(force);
        }
    }
}
