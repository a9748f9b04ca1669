//! # Core Engine Module
//!
//! Shared abstractions used by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for logging and skinning
//! - **Foundation**: Low-level utilities (math, shared handles, logging)
//! - **ECS**: Entities and the component message bus

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;
pub use crate::ecs;

// Re-export commonly used config types
pub use config::{
    EngineConfig,
    LoggingConfig,
    SkinningConfig,
    CorConfig,
    Config,
    ConfigError,
};
