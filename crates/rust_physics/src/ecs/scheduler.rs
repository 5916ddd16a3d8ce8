//! System scheduling by phase
//!
//! A frame runs zero or more fixed steps followed by one variable update.
//! User systems register for the phase they belong to and run in
//! registration order within it.

use log::trace;

use super::World;

/// System execution phases with explicit ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemPhase {
    /// Once per fixed step, before body integration
    FixedUpdate = 0,
    /// Once per fixed step, after the collision pass
    AfterFixedUpdate = 1,
    /// Once per frame, before constant forces and the collision pass
    Update = 2,
    /// Once per frame, after the collision pass
    AfterUpdate = 3,
}

/// Boxed system callback, called with the frame or step delta
pub type SystemFn<C> = Box<dyn FnMut(&mut World, &mut C, f32)>;

struct ScheduledSystem<C> {
    phase: SystemPhase,
    name: String,
    run: SystemFn<C>,
}

/// Ordered list of user systems over a shared context `C`
pub struct Scheduler<C> {
    systems: Vec<ScheduledSystem<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self { systems: Vec::new() }
    }

    /// Register a system for `phase`
    pub fn add_system<F>(&mut self, phase: SystemPhase, name: impl Into<String>, system: F)
    where
        F: FnMut(&mut World, &mut C, f32) + 'static,
    {
        self.systems.push(ScheduledSystem {
            phase,
            name: name.into(),
            run: Box::new(system),
        });
    }

    /// Run every system of `phase` in registration order
    pub fn run_phase(&mut self, phase: SystemPhase, world: &mut World, context: &mut C, delta_time: f32) {
        for system in self.systems.iter_mut().filter(|s| s.phase == phase) {
            trace!("Running system '{}' in {:?}", system.name, phase);
            (system.run)(world, context, delta_time);
        }
    }

    /// Names of the systems registered for `phase`
    pub fn system_names(&self, phase: SystemPhase) -> Vec<&str> {
        self.systems
            .iter()
            .filter(|s| s.phase == phase)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// No systems registered
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_only_requested_phase_in_order() {
        let mut scheduler: Scheduler<Vec<&'static str>> = Scheduler::new();
        scheduler.add_system(SystemPhase::Update, "first", |_, log, _| log.push("first"));
        scheduler.add_system(SystemPhase::AfterUpdate, "late", |_, log, _| log.push("late"));
        scheduler.add_system(SystemPhase::Update, "second", |_, log, _| log.push("second"));

        let mut world = World::new();
        let mut log = Vec::new();
        scheduler.run_phase(SystemPhase::Update, &mut world, &mut log, 0.016);

        assert_eq!(log, ["first", "second"]);
        assert_eq!(scheduler.system_names(SystemPhase::AfterUpdate), ["late"]);
        assert_eq!(scheduler.len(), 3);
    }
}
