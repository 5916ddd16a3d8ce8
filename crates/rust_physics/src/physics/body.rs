//! Body component: force accumulation and fixed-step integration
//!
//! Forces pushed with [`Body::add_force`] during a tick are consumed by the
//! next [`Body::step`], never the one in progress.

use log::warn;

use super::collision::Collision;
use super::host::HasBody;
use crate::ecs::Entity;
use crate::foundation::math::{gravity_direction, is_finite, Vec2};

/// Initial speed used by [`Body::jump`] when no force is given
pub const DEFAULT_JUMP_FORCE: f32 = 640.0;

/// Notification raised by a body's movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEvent {
    /// Landed on the given platform, not standing on it the step before
    Ground(Entity),
    /// Started moving along gravity while airborne
    Fall,
    /// Hit the given body from below while moving against gravity
    Headbutt(Entity),
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyKind {
    /// Never moves; acts only as an obstacle
    Static,
    /// Affected by gravity and forces
    #[default]
    Dynamic,
    /// Moves with its velocity but ignores gravity and forces
    Kinematic,
}

/// Dynamic physics state of an entity
#[derive(Debug, Clone)]
pub struct Body {
    /// Linear velocity in units per second
    pub vel: Vec2,

    /// Gravity multiplier
    pub weight: f32,

    /// Simulation role
    pub kind: BodyKind,

    /// Initial speed for [`Body::jump`]
    pub jump_force: f32,

    /// Speed cap applied after integrating forces
    pub max_velocity: Option<f32>,

    mass: f32,
    force: Vec2,
    grounded: bool,
    cur_platform: Option<Entity>,
    last_platform: Option<Entity>,
    can_double_jump: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// Create a dynamic body with unit mass and weight
    pub fn new() -> Self {
        Self {
            vel: Vec2::zeros(),
            weight: 1.0,
            kind: BodyKind::Dynamic,
            jump_force: DEFAULT_JUMP_FORCE,
            max_velocity: None,
            mass: 1.0,
            force: Vec2::zeros(),
            grounded: false,
            cur_platform: None,
            last_platform: None,
            can_double_jump: false,
        }
    }

    /// Create an immovable body
    pub fn static_body() -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::new()
        }
    }

    /// Create a body moved only by its velocity
    pub fn kinematic() -> Self {
        Self {
            kind: BodyKind::Kinematic,
            ..Self::new()
        }
    }

    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Set gravity multiplier
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set initial velocity
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Set jump speed
    pub fn with_jump_force(mut self, jump_force: f32) -> Self {
        self.jump_force = jump_force;
        self
    }

    /// Set speed cap
    pub fn with_max_velocity(mut self, max_velocity: f32) -> Self {
        self.max_velocity = Some(max_velocity.max(0.0));
        self
    }

    /// Mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set mass. Non-positive or non-finite values are rejected.
    pub fn set_mass(&mut self, mass: f32) {
        if mass.is_finite() && mass > 0.0 {
            self.mass = mass;
        } else {
            warn!("Rejecting invalid body mass {mass}, keeping {}", self.mass);
        }
    }

    /// Queue a force for the next integration step
    ///
    /// Returns false if the force was dropped because it is not finite or the
    /// body does not respond to forces.
    pub fn add_force(&mut self, force: Vec2) -> bool {
        if !is_finite(&force) {
            warn!("Rejecting non-finite force {force:?}");
            return false;
        }
        if self.kind != BodyKind::Dynamic {
            return false;
        }
        self.force += force;
        true
    }

    /// Force accumulated since the last step
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Static body
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// Dynamic body
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Resting on a platform this tick
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Platform the body landed on this tick
    pub fn cur_platform(&self) -> Option<Entity> {
        self.cur_platform
    }

    /// Moving along gravity
    pub fn is_falling(&self, gravity: &Vec2) -> bool {
        self.vel.dot(&gravity_direction(gravity)) > 0.0
    }

    /// Moving against gravity
    pub fn is_jumping(&self, gravity: &Vec2) -> bool {
        self.vel.dot(&gravity_direction(gravity)) < 0.0
    }

    /// Launch against gravity at `force` (or [`Body::jump_force`])
    pub fn jump(&mut self, force: Option<f32>, gravity: &Vec2) {
        self.vel = -gravity_direction(gravity) * force.unwrap_or(self.jump_force);
        self.grounded = false;
        self.cur_platform = None;
        self.last_platform = None;
    }

    /// Jump from the ground, or once more while airborne after such a jump
    ///
    /// Returns false when neither is possible.
    pub fn double_jump(&mut self, force: Option<f32>, gravity: &Vec2) -> bool {
        if self.grounded {
            self.jump(force, gravity);
            self.can_double_jump = true;
            true
        } else if self.can_double_jump {
            self.jump(force, gravity);
            self.can_double_jump = false;
            true
        } else {
            false
        }
    }

    /// Mark the body as standing on `platform`
    ///
    /// Returns true when this is a new landing rather than continued contact
    /// with the platform the body stood on during the previous step.
    pub fn land(&mut self, platform: Entity) -> bool {
        let landed = self.cur_platform != Some(platform) && self.last_platform != Some(platform);
        self.grounded = true;
        self.cur_platform = Some(platform);
        self.can_double_jump = false;
        landed
    }

    /// Advance one fixed step and return the position change
    ///
    /// Dynamic: adds gravity, integrates the accumulated force into velocity
    /// (semi-implicit Euler), then clears the force. Kinematic: velocity only.
    /// Static: nothing.
    pub fn step(&mut self, gravity: Vec2, dt: f32) -> Vec2 {
        match self.kind {
            BodyKind::Static => {
                self.force = Vec2::zeros();
                return Vec2::zeros();
            }
            BodyKind::Kinematic => self.force = Vec2::zeros(),
            BodyKind::Dynamic => self.force += gravity * self.weight * self.mass,
        }

        self.vel += self.force / self.mass * dt;
        if let Some(max) = self.max_velocity {
            self.vel = self.vel.cap_magnitude(max);
        }
        self.force = Vec2::zeros();
        self.grounded = false;
        self.last_platform = self.cur_platform.take();

        if !is_finite(&self.vel) {
            warn!("Body velocity became non-finite, resetting to zero");
            self.vel = Vec2::zeros();
        }
        self.vel * dt
    }
}

/// Ground the source body when it rests on top of another body
///
/// Runs for every update event. A body moving against gravity (jumping up
/// through a platform) is not grounded; if it hits a body from below it
/// raises [`BodyEvent::Headbutt`]. New landings raise [`BodyEvent::Ground`].
pub fn ground_on_collision<H: HasBody + ?Sized>(host: &mut H, collision: &Collision) {
    if host.body(collision.target).is_none() {
        return;
    }
    let down = collision.down();
    let Some(body) = host.body_mut(collision.source) else {
        return;
    };
    if body.is_static() {
        return;
    }

    let rising = body.vel.dot(&down) < 0.0;
    let event = if collision.is_top() && !rising {
        body.land(collision.target).then_some(BodyEvent::Ground(collision.target))
    } else if collision.is_bottom() && rising {
        Some(BodyEvent::Headbutt(collision.target))
    } else {
        None
    };
    if let Some(event) = event {
        host.emit_body_event(collision.source, event);
    }
}
