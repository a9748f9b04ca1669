//! # Unified Configuration System
//!
//! Configuration structures for the engine slice: logging and the skinning
//! pipeline. Everything is serializable through the [`Config`] trait, so a
//! single TOML or RON file can drive an application.
//!
//! ```toml
//! application_name = "skinning_demo"
//!
//! [logging]
//! filter = "info"
//!
//! [skinning]
//! skinning_type = "dqs"
//!
//! [skinning.center_of_rotation]
//! similarity_sigma = 0.1
//! weight_epsilon = 0.1
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};
use crate::skinning::SkinningType;

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    pub filter: String,
    /// Whether log lines carry a timestamp
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            timestamps: true,
        }
    }
}

/// # Center-of-Rotation Precomputation Parameters
///
/// `similarity_sigma` controls how quickly the weight similarity between a
/// vertex and a triangle falls off; `weight_epsilon` prunes negligible bone
/// influences before the similarity integral is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorConfig {
    /// Width of the gaussian weight-similarity kernel
    pub similarity_sigma: f32,
    /// Influences below this value are dropped before precomputation
    pub weight_epsilon: f32,
}

impl Default for CorConfig {
    fn default() -> Self {
        Self {
            similarity_sigma: 0.1,
            weight_epsilon: 0.1,
        }
    }
}

/// # Skinning Configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinningConfig {
    /// Algorithm newly created skinning components start with
    pub skinning_type: SkinningType,
    /// Center-of-rotation precomputation parameters
    pub center_of_rotation: CorConfig,
}

impl SkinningConfig {
    /// Set the default skinning algorithm
    pub fn with_skinning_type(mut self, skinning_type: SkinningType) -> Self {
        self.skinning_type = skinning_type;
        self
    }
}

/// # Engine Configuration
///
/// Top-level configuration for applications built on the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, used in log output
    pub application_name: String,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Skinning configuration
    pub skinning: SkinningConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults for the given application
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            ..Default::default()
        }
    }

    /// Set the skinning configuration
    pub fn with_skinning(mut self, skinning: SkinningConfig) -> Self {
        self.skinning = skinning;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            application_name: "skinning_engine".to_string(),
            logging: LoggingConfig::default(),
            skinning: SkinningConfig::default(),
        }
    }
}

impl Config for EngineConfig {}
impl Config for SkinningConfig {}
