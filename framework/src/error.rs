//! Framework-wide error types
//!
//! Resolution itself never fails: missing or malformed variables are left for
//! the ORM to reject. The variants below cover the explicit builder API, the
//! service container and the single initialization attempt.

use thiserror::Error;

/// Framework-wide error type
///
/// # Example
///
/// ```rust,ignore
/// use datasource::{Container, FrameworkError};
///
/// fn config(container: &Container) -> Result<ConfigService, FrameworkError> {
///     container.resolve::<ConfigService>() // ServiceNotFound when unregistered
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameworkError {
    /// Service not found in the dependency injection container
    #[error("Service '{type_name}' not registered in container")]
    ServiceNotFound {
        /// The type name of the service that was not found
        type_name: &'static str,
    },

    /// Database error reported by the ORM or driver
    #[error("Database error: {0}")]
    Database(String),

    /// A descriptor was assembled with both or neither connection targets
    #[error("Invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    /// A required environment variable is absent or cannot be parsed
    #[error("Required environment variable {key} is not set or invalid")]
    MissingVariable {
        /// The variable name
        key: String,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl FrameworkError {
    /// Create a ServiceNotFound error for a given type
    pub fn service_not_found<T: ?Sized>() -> Self {
        Self::ServiceNotFound {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an InvalidDescriptor error
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor(message.into())
    }

    /// Create a MissingVariable error
    pub fn missing_variable(key: impl Into<String>) -> Self {
        Self::MissingVariable { key: key.into() }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Implement From<DbErr> for automatic error conversion with ?
impl From<sea_orm::DbErr> for FrameworkError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Missing;

    #[test]
    fn test_service_not_found_names_type() {
        let err = FrameworkError::service_not_found::<Missing>();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_db_err_converts() {
        let err: FrameworkError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, FrameworkError::Database(ref m) if m.contains("boom")));
    }
}
