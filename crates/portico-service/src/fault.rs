//! Service fault types
//!
//! Fault definitions with a machine-checkable category so callers branch on
//! structure instead of message text.

use thiserror::Error;

use crate::types::FaultKind;

/// Fault raised by the identity service boundary.
#[derive(Debug, Error)]
pub enum ServiceFault {
    /// No object matched the given criteria.
    #[error("no matching object: {message}")]
    NotFound { message: String },

    /// The service could not build a server-side query from the submitted
    /// criteria. Certain characters in anchor values trigger this defect
    /// class; the resolver falls back to the read path when it sees it.
    #[error("query construction failed: {message}")]
    QueryConstruction { message: String },

    /// The caller lacks permission for the operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Any other fault.
    #[error("service fault: {message}")]
    Other {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServiceFault {
    /// Get the fault category.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            ServiceFault::NotFound { .. } => FaultKind::NotFound,
            ServiceFault::QueryConstruction { .. } => FaultKind::QueryConstruction,
            ServiceFault::PermissionDenied { .. } => FaultKind::PermissionDenied,
            ServiceFault::Other { .. } => FaultKind::Other,
        }
    }

    /// Check if this is a not-found fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == FaultKind::NotFound
    }

    // Convenience constructors

    /// Create a not-found fault.
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceFault::NotFound {
            message: message.into(),
        }
    }

    /// Create a query construction fault.
    pub fn query_construction(message: impl Into<String>) -> Self {
        ServiceFault::QueryConstruction {
            message: message.into(),
        }
    }

    /// Create a permission-denied fault.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        ServiceFault::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create an uncategorized fault.
    pub fn other(message: impl Into<String>) -> Self {
        ServiceFault::Other {
            message: message.into(),
            source: None,
        }
    }

    /// Create an uncategorized fault with source.
    pub fn other_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ServiceFault::Other {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for service boundary operations.
pub type ServiceResult<T> = Result<T, ServiceFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kinds() {
        assert_eq!(ServiceFault::not_found("x").kind(), FaultKind::NotFound);
        assert_eq!(
            ServiceFault::query_construction("x").kind(),
            FaultKind::QueryConstruction
        );
        assert_eq!(
            ServiceFault::permission_denied("x").kind(),
            FaultKind::PermissionDenied
        );
        assert_eq!(ServiceFault::other("x").kind(), FaultKind::Other);
    }

    #[test]
    fn test_is_not_found() {
        assert!(ServiceFault::not_found("x").is_not_found());
        assert!(!ServiceFault::other("x").is_not_found());
    }

    #[test]
    fn test_fault_display() {
        let fault = ServiceFault::query_construction("unescaped apostrophe in filter");
        assert_eq!(
            fault.to_string(),
            "query construction failed: unescaped apostrophe in filter"
        );
    }

    #[test]
    fn test_fault_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let fault = ServiceFault::other_with_source("endpoint unreachable", io);
        if let ServiceFault::Other { source, .. } = &fault {
            assert!(source.is_some());
        } else {
            panic!("expected Other variant");
        }
    }
}
