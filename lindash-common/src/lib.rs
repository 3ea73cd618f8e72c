//! LinDash Common Library
//!
//! This crate provides shared, UI-free types and utilities for the LinDash
//! chart core:
//!
//! - [`result_set`] - Raw query result model (`ResultSet`, `ResultSeries`)
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod result_set;
pub mod serialization;

// Re-export commonly used types at the crate root
pub use config::{
    ChartConfig, DashboardConfig, DemoConfig, GroupConfig, LogFormat, LoggingConfig, ValueFormat,
    default_config_path, load_config, parse_config,
};
pub use error::{Error, Result};
pub use result_set::{MAX_SLOTS, ResultSeries, ResultSet};
pub use serialization::{Format, decode, decode_result_sets, encode};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
