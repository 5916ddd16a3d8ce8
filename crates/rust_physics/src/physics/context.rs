//! Simulation context
//!
//! [`PhysicsContext`] owns the state that is global for a physics session:
//! gravity, the broad-phase index and the set of pairs that overlapped in
//! the last pass. It is passed explicitly to every operation instead of
//! living in ambient globals, and it resets itself when the host reports a
//! scene change.

use std::collections::HashSet;

use log::{debug, info, trace, warn};

use super::broad_phase::SweepAndPrune;
use super::collision::{CollidePhase, Collision, CollisionPair};
use super::gjk::{self, GjkSettings};
use super::host::{CollideDispatch, HasArea, HasBody, HasEffectors, LifecycleSource};
use super::integrator;
use super::resolution::push_out;
use super::shape::Shape;
use crate::config::{Config, PhysicsConfig};
use crate::ecs::{ComponentKind, Entity, LifecycleEvent};
use crate::error::PhysicsError;
use crate::foundation::math::{gravity_direction, is_finite, Vec2};

/// Counters from the most recent collision pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Pairs produced by the broad phase
    pub candidates: usize,
    /// Pairs that overlapped and were delivered
    pub collisions: usize,
}

/// Owned physics session state
#[derive(Debug)]
pub struct PhysicsContext {
    config: PhysicsConfig,
    settings: GjkSettings,
    gravity: Option<Vec2>,
    broad_phase: SweepAndPrune,
    initialized: bool,
    contacts: HashSet<CollisionPair>,
    last_pass: PassStats,
}

impl PhysicsContext {
    /// Create a context from a validated configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        info!(
            "Physics context created (gravity: {:?}, fixed_dt: {:.4}s)",
            config.gravity, config.fixed_dt
        );
        Ok(Self {
            settings: GjkSettings::from(&config),
            gravity: config.gravity,
            broad_phase: SweepAndPrune::new(config.sweep_y_axis),
            initialized: false,
            contacts: HashSet::new(),
            last_pass: PassStats::default(),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Narrow-phase limits
    pub fn settings(&self) -> &GjkSettings {
        &self.settings
    }

    /// Gravity vector, zero when unset
    pub fn gravity(&self) -> Vec2 {
        self.gravity.unwrap_or_else(Vec2::zeros)
    }

    /// Unit "down" direction used by collision side queries
    pub fn gravity_direction(&self) -> Vec2 {
        gravity_direction(&self.gravity())
    }

    /// Set gravity. Non-finite vectors are rejected.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        if is_finite(&gravity) {
            self.gravity = Some(gravity);
        } else {
            warn!("Rejecting non-finite gravity {gravity:?}");
        }
    }

    /// Disable gravity
    pub fn clear_gravity(&mut self) {
        self.gravity = None;
    }

    /// Broad-phase index
    pub fn broad_phase(&self) -> &SweepAndPrune {
        &self.broad_phase
    }

    /// The index has been populated for the current scene
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Counters from the last collision pass
    pub fn last_pass(&self) -> PassStats {
        self.last_pass
    }

    /// Forget the index and contacts; rebuilt lazily on the next pass
    pub fn reset(&mut self) {
        self.broad_phase.clear();
        self.contacts.clear();
        self.initialized = false;
        debug!("Physics context reset, broad phase will reinitialize");
    }

    /// Step all bodies by one fixed interval
    pub fn integrate<H: HasBody + ?Sized>(&self, host: &mut H, dt: f32) -> usize {
        integrator::integrate_bodies(host, self.gravity(), dt)
    }

    /// Push every constant force into its body
    pub fn apply_constant_forces<H: HasBody + HasEffectors + ?Sized>(&self, host: &mut H) {
        integrator::apply_constant_forces(host);
    }

    /// Run broad and narrow phase and deliver collision events
    ///
    /// Queued lifecycle events are applied to the index first, so listeners
    /// that spawn or destroy entities only affect the next pass.
    pub fn collision_pass<H>(&mut self, host: &mut H) -> PassStats
    where
        H: HasArea + CollideDispatch + LifecycleSource + ?Sized,
    {
        let mut stats = PassStats::default();
        let previous = std::mem::take(&mut self.contacts);
        let mut current = HashSet::new();

        self.sync(host);
        if host.uses_area() {
            self.broad_phase.update(|entity| {
                if host.refresh_world_area(entity) {
                    host.world_bbox(entity)
                } else {
                    None
                }
            });

            let gravity = self.gravity();
            for (a, b) in self.broad_phase.pairs() {
                stats.candidates += 1;
                let Some(collision) = narrow_phase(host, a, b, &self.settings, gravity) else {
                    continue;
                };
                stats.collisions += 1;

                let pair = CollisionPair::new(a, b);
                let began = !previous.contains(&pair);
                current.insert(pair);
                deliver(host, &collision, began);
            }
        }

        for pair in previous.difference(&current) {
            for (entity, other) in [(pair.entity_a, pair.entity_b), (pair.entity_b, pair.entity_a)] {
                if host.exists(entity) {
                    host.dispatch_separate(entity, other);
                }
            }
        }

        self.contacts = current;
        self.last_pass = stats;
        trace!("Collision pass: {} candidates, {} collisions", stats.candidates, stats.collisions);
        stats
    }

    fn sync<H: HasArea + LifecycleSource + ?Sized>(&mut self, host: &mut H) {
        for event in host.drain_lifecycle() {
            match event {
                LifecycleEvent::SceneLeave => self.reset(),
                _ if !self.initialized => {}
                LifecycleEvent::Created(entity) | LifecycleEvent::Attached(entity, ComponentKind::Area) => {
                    if host.exists(entity) && host.area(entity).is_some() {
                        self.broad_phase.add(entity);
                    }
                }
                LifecycleEvent::Destroyed(entity) | LifecycleEvent::Detached(entity, ComponentKind::Area) => {
                    self.broad_phase.remove(entity);
                }
                LifecycleEvent::Attached(..) | LifecycleEvent::Detached(..) => {}
            }
        }

        if !self.initialized {
            for entity in host.area_entities() {
                self.broad_phase.add(entity);
            }
            self.initialized = true;
            debug!("Broad phase initialized with {} colliders", self.broad_phase.len());
        }
    }

    /// Pair overlapped during the last completed pass
    pub fn is_colliding<H: HasArea + ?Sized>(&self, host: &H, entity: Entity, other: Entity) -> Result<bool, PhysicsError> {
        require_area(host, entity)?;
        Ok(self.contacts.contains(&CollisionPair::new(entity, other)))
    }

    /// Entities `entity` overlapped during the last completed pass
    pub fn contacts_of(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.contacts.iter().filter_map(move |pair| pair.other(entity))
    }

    /// Current world-space collider shape
    pub fn world_area<H: HasArea + ?Sized>(&self, host: &mut H, entity: Entity) -> Result<Shape, PhysicsError> {
        require_area(host, entity)?;
        host.refresh_world_area(entity);
        host.world_shape(entity)
            .cloned()
            .ok_or(PhysicsError::MissingComponent { entity, component: ComponentKind::Area })
    }

    /// World point lies inside the collider
    pub fn has_point<H: HasArea + ?Sized>(&self, host: &mut H, entity: Entity, point: &Vec2) -> Result<bool, PhysicsError> {
        Ok(self.world_area(host, entity)?.contains_point(point))
    }

    /// Test two colliders right now, outside the collision pass
    ///
    /// Ignores pause state and ignore lists. The returned event is not
    /// delivered to anyone.
    pub fn check_collision<H: HasArea + ?Sized>(
        &self,
        host: &mut H,
        entity: Entity,
        other: Entity,
    ) -> Result<Option<Collision>, PhysicsError> {
        require_area(host, entity)?;
        require_area(host, other)?;
        Ok(self.test_pair(host, entity, other))
    }

    /// Separate `entity` from every other overlapping body
    ///
    /// Returns the number of bodies it was pushed out of.
    pub fn push_out_all<H: HasArea + HasBody + ?Sized>(&self, host: &mut H, entity: Entity) -> Result<usize, PhysicsError> {
        require_area(host, entity)?;
        let mut pushed = 0;
        for other in host.area_entities() {
            if other == entity
                || host.body(other).is_none()
                || host.is_paused(other)
                || host.ignores(entity, other)
                || host.ignores(other, entity)
            {
                continue;
            }
            if let Some(collision) = self.test_pair(host, entity, other) {
                if push_out(host, &collision) {
                    pushed += 1;
                }
            }
        }
        Ok(pushed)
    }

    fn test_pair<H: HasArea + ?Sized>(&self, host: &mut H, entity: Entity, other: Entity) -> Option<Collision> {
        if !(host.refresh_world_area(entity) && host.refresh_world_area(other)) {
            return None;
        }
        let penetration = gjk::intersect(host.world_shape(entity)?, host.world_shape(other)?, &self.settings)?;
        Some(Collision::new(entity, other, penetration.normal, penetration.distance, self.gravity()))
    }
}

fn require_area<H: HasArea + ?Sized>(host: &H, entity: Entity) -> Result<(), PhysicsError> {
    if !host.exists(entity) {
        return Err(PhysicsError::EntityNotFound(entity));
    }
    if host.area(entity).is_none() {
        return Err(PhysicsError::MissingComponent { entity, component: ComponentKind::Area });
    }
    Ok(())
}

/// Filter a candidate pair and run GJK on it
///
/// Existence, pause state and both ignore lists are checked every time,
/// since listeners earlier in the pass may have changed any of them.
fn narrow_phase<H: HasArea + ?Sized>(
    host: &mut H,
    a: Entity,
    b: Entity,
    settings: &GjkSettings,
    gravity: Vec2,
) -> Option<Collision> {
    if !(host.exists(a) && host.exists(b)) {
        trace!("Skipping pair ({a:?}, {b:?}): entity destroyed this pass");
        return None;
    }
    if host.is_paused(a) || host.is_paused(b) {
        return None;
    }
    if host.ignores(a, b) || host.ignores(b, a) {
        return None;
    }
    if !(host.refresh_world_area(a) && host.refresh_world_area(b)) {
        return None;
    }

    let penetration = gjk::intersect(host.world_shape(a)?, host.world_shape(b)?, settings)?;
    Some(Collision::new(a, b, penetration.normal, penetration.distance, gravity))
}

/// Source side first, then the mirrored event
fn deliver<H: HasArea + CollideDispatch + ?Sized>(host: &mut H, collision: &Collision, began: bool) {
    if began {
        host.dispatch_collide(CollidePhase::Begin, collision);
    }
    host.dispatch_collide(CollidePhase::Update, collision);

    if !(host.exists(collision.source) && host.exists(collision.target)) {
        return;
    }
    let mirrored = collision.reverse();
    if began {
        host.dispatch_collide(CollidePhase::Begin, &mirrored);
    }
    host.dispatch_collide(CollidePhase::Update, &mirrored);
}
