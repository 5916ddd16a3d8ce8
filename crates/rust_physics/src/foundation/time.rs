//! Time management utilities

use log::warn;

/// Fixed-step accumulator decoupling simulation steps from frame time
///
/// Each frame feeds its variable delta into [`FixedTimestep::advance`], which
/// reports how many whole fixed steps are due. Leftover time carries over to
/// the next frame.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_substeps: u32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Create an accumulator with the given step length and substep cap
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_substeps: max_substeps.max(1),
            total_steps: 0,
        }
    }

    /// Feed a frame delta and return the number of fixed steps to run
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!("Ignoring invalid frame delta {delta_time}");
            return 0;
        }

        self.accumulator += delta_time;
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            warn!(
                "Fixed timestep fell behind, dropping {:.4}s of simulation time",
                self.accumulator
            );
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Fixed step length in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Fraction of a step currently accumulated, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Total fixed steps reported since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}
