//! services/reminders/src/error.rs
//!
//! Defines the primary error type for the reminders service.

use crate::config::ConfigError;
use practice_reminders_core::ports::PortError;

/// The primary error type for the `reminders` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying database migrations at startup.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: ApiError = PortError::NotFound("Reminder 1".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Service Port Error: Item not found: Reminder 1"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ApiError =
            ConfigError::InvalidValue("RUST_LOG".to_string(), "bad".to_string()).into();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
