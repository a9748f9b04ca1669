//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Shared handles for cross-component data
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
