//! Error types for the physics core

use crate::config::ConfigError;
use crate::ecs::{ComponentKind, Entity};

/// Physics errors
///
/// "No overlap" is never an error; these cover programmer mistakes such as
/// querying collision state on an entity that has no collider.
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// The entity was destroyed or never existed
    #[error("Entity {0:?} does not exist")]
    EntityNotFound(Entity),

    /// The entity lacks a component the operation needs
    #[error("Entity {entity:?} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Component it is missing
        component: ComponentKind,
    },

    /// Degenerate or malformed geometry
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
