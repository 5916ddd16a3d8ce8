//! Frame driver tying the world, the physics context and user systems together

use std::path::Path;

use log::{debug, info};

use crate::config::{Config, PhysicsConfig};
use crate::ecs::{Scheduler, SystemPhase, World};
use crate::error::PhysicsError;
use crate::foundation::time::FixedTimestep;
use crate::physics::PhysicsContext;

/// Owns everything needed to advance a scene
///
/// Each call to [`Simulation::frame`] runs as many fixed steps as the
/// accumulated time allows, then one regular update:
///
/// 1. per fixed step: `FixedUpdate` systems, body integration, collision
///    pass, `AfterFixedUpdate` systems
/// 2. once: `Update` systems, constant forces, collision pass,
///    `AfterUpdate` systems
pub struct Simulation {
    /// Entities and components
    pub world: World,

    /// Physics session state
    pub physics: PhysicsContext,

    scheduler: Scheduler<PhysicsContext>,
    clock: FixedTimestep,
}

impl Simulation {
    /// Create a simulation from a configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        let clock = FixedTimestep::new(config.fixed_dt, config.max_substeps);
        let physics = PhysicsContext::new(config)?;
        info!("Simulation ready");
        Ok(Self {
            world: World::new(),
            physics,
            scheduler: Scheduler::new(),
            clock,
        })
    }

    /// Create a simulation from a `.toml` or `.ron` configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let path = path.as_ref();
        let config = PhysicsConfig::load_from_file(path)?;
        debug!("Loaded physics config from {}", path.display());
        Self::new(config)
    }

    /// Registered systems
    pub fn scheduler(&self) -> &Scheduler<PhysicsContext> {
        &self.scheduler
    }

    /// Fixed step clock
    pub fn clock(&self) -> &FixedTimestep {
        &self.clock
    }

    /// Register a system for `phase`
    pub fn add_system<F>(&mut self, phase: SystemPhase, name: impl Into<String>, system: F)
    where
        F: FnMut(&mut World, &mut PhysicsContext, f32) + 'static,
    {
        self.scheduler.add_system(phase, name, system);
    }

    /// Run one fixed step regardless of accumulated time
    pub fn fixed_step(&mut self) {
        let dt = self.clock.step();
        self.scheduler.run_phase(SystemPhase::FixedUpdate, &mut self.world, &mut self.physics, dt);
        self.physics.integrate(&mut self.world, dt);
        self.physics.collision_pass(&mut self.world);
        self.scheduler.run_phase(SystemPhase::AfterFixedUpdate, &mut self.world, &mut self.physics, dt);
    }

    /// Advance by `delta_time` seconds of wall time
    ///
    /// Returns the number of fixed steps that ran.
    pub fn frame(&mut self, delta_time: f32) -> u32 {
        let steps = self.clock.advance(delta_time);
        for _ in 0..steps {
            self.fixed_step();
        }

        self.scheduler.run_phase(SystemPhase::Update, &mut self.world, &mut self.physics, delta_time);
        self.physics.apply_constant_forces(&mut self.world);
        self.physics.collision_pass(&mut self.world);
        self.scheduler.run_phase(SystemPhase::AfterUpdate, &mut self.world, &mut self.physics, delta_time);
        steps
    }
}
