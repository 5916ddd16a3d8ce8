//! Tunables for the physics core
//!
//! Loaded from `.toml` or `.ron` through the [`Config`] trait. Every field has
//! a default, so a config file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec2;

/// Physics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Global gravity in units per second squared. `None` disables gravity;
    /// collision direction queries then assume "down" is `(0, 1)`.
    pub gravity: Option<Vec2>,

    /// Length of one fixed update step in seconds
    pub fixed_dt: f32,

    /// Most fixed steps run for a single frame
    pub max_substeps: u32,

    /// Penetration depths below this count as no overlap
    pub epsilon: f32,

    /// Iteration cap for the GJK simplex search
    pub gjk_max_iterations: usize,

    /// Iteration cap for the EPA polytope expansion
    pub epa_max_iterations: usize,

    /// Also reject broad-phase candidates whose y intervals are disjoint
    pub sweep_y_axis: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: None,
            fixed_dt: 1.0 / 60.0,
            max_substeps: 8,
            epsilon: 1e-4,
            gjk_max_iterations: 64,
            epa_max_iterations: 64,
            sweep_y_axis: true,
        }
    }
}

impl Config for PhysicsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_dt must be a positive number, got {}",
                self.fixed_dt
            )));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".to_string()));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if self.gjk_max_iterations == 0 || self.epa_max_iterations == 0 {
            return Err(ConfigError::Invalid("iteration limits must be at least 1".to_string()));
        }
        if let Some(gravity) = self.gravity {
            if !(gravity.x.is_finite() && gravity.y.is_finite()) {
                return Err(ConfigError::Invalid("gravity must be finite".to_string()));
            }
        }
        Ok(())
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Set the fixed step length
    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    /// Set the substep cap
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Set the overlap epsilon
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enable or disable the y-axis broad-phase check
    pub fn with_sweep_y_axis(mut self, enabled: bool) -> Self {
        self.sweep_y_axis = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.gravity.is_none());
        assert_relative_eq!(config.fixed_dt, 1.0 / 60.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PhysicsConfig = toml::from_str("fixed_dt = 0.02\nsweep_y_axis = false\n").unwrap();
        assert_relative_eq!(config.fixed_dt, 0.02);
        assert!(!config.sweep_y_axis);
        assert_eq!(config.max_substeps, 8);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            PhysicsConfig::default().with_fixed_dt(0.0).validate(),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PhysicsConfig::default().with_max_substeps(0).validate(),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PhysicsConfig::default().with_gravity(Vec2::new(f32::NAN, 0.0)).validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("rust_physics_config_{}.ron", std::process::id()));
        let config = PhysicsConfig::default().with_gravity(Vec2::new(0.0, 300.0));

        config.save_to_file(&path).unwrap();
        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_validates() {
        assert!(PhysicsConfig::parse("gravity = [0.0, 300.0]\n", ConfigFormat::Toml).is_ok());
        assert!(matches!(
            PhysicsConfig::parse("max_substeps = 0\n", ConfigFormat::Toml),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PhysicsConfig::parse("(fixed_dt: ", ConfigFormat::Ron),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            PhysicsConfig::default().save_to_file("physics.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
