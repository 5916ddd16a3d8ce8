//! Configuration loading
//!
//! Configs are plain serde structs. The file extension picks the format:
//! `.toml` or `.ron`. Loaded values are validated before they are returned.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

mod physics_config;

pub use physics_config::PhysicsConfig;

/// On-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// Rusty Object Notation
    Ron,
}

impl ConfigFormat {
    /// Format for a file path, judged by its extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serializable settings with file round-tripping
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Check value ranges. Called after every load.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Parse and validate a config from text
    fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?,
            ConfigFormat::Ron => ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Render the config as text
    fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new().struct_names(true))
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, format)
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.render(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text is not valid for the chosen format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value could not be rendered
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
