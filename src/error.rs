//! Error types for the service injector

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while resolving, checking or shutting down services
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// No service is registered under the name, or the slot holds another type
    #[error("Service not found: `{name}` (available services: [{}])", .available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },

    /// A service was declared twice under the same name
    #[error("Service `{name}` has already been declared")]
    AlreadyDeclared { name: String },

    /// The provider panicked while building the service
    #[error("Failed to create service `{name}`: {reason}")]
    CreationFailed { name: String, reason: String },

    /// Free-form error raised by a provider or a lifecycle hook
    #[error("{0}")]
    Message(String),

    /// Error raised by a provider or a lifecycle hook
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync>),

    /// One or more services failed during a shutdown sweep
    #[error("{} service(s) failed to shut down: {}", .failures.len(), format_failures(.failures))]
    Shutdown { failures: Vec<(String, DiError)> },
}

fn format_failures(failures: &[(String, DiError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("`{name}`: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DiError {
    /// Create a NotFound error for a service name
    #[inline]
    pub fn not_found(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            available,
        }
    }

    /// Create an AlreadyDeclared error
    #[inline]
    pub fn already_declared(name: impl Into<String>) -> Self {
        Self::AlreadyDeclared { name: name.into() }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an error from a message
    #[inline]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap any error raised by user code
    #[inline]
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Arc::new(err))
    }

    /// Whether this is a not-found error
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for injector operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available() {
        let err = DiError::not_found("db", vec!["cache".into(), "queue".into()]);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Service not found: `db` (available services: [cache, queue])"
        );
    }

    #[test]
    fn test_other_is_transparent() {
        let io = std::io::Error::other("disk on fire");
        let err = DiError::other(io);
        assert_eq!(err.to_string(), "disk on fire");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_shutdown_aggregate_message() {
        let err = DiError::Shutdown {
            failures: vec![
                ("db".into(), DiError::msg("still connected")),
                ("cache".into(), DiError::msg("flush failed")),
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 service(s) failed to shut down: `db`: still connected; `cache`: flush failed"
        );
    }
}
