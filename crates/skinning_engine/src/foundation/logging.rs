//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default filter.
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_with_config(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.filter.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp(if config.timestamps {
        Some(env_logger::fmt::TimestampPrecision::Millis)
    } else {
        None
    });
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
