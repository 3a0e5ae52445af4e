//! Pipeline error types
//!
//! Error taxonomy for request construction and completion waiting. Builder
//! failures abort the whole build; no partial request escapes.

use thiserror::Error;

use portico_service::fault::ServiceFault;
use portico_service::ids::ObjectId;

/// Error raised by the request pipeline.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Resolution matched no object. Recoverable; callers decide (the
    /// duplicate guard treats it as "safe to create").
    #[error("no {object_type} found with {attribute}={value}")]
    NotFound {
        object_type: String,
        attribute: String,
        value: String,
    },

    /// The service faulted during resolution for a reason other than
    /// not-found. Never retried automatically.
    #[error("resolution failed: {source}")]
    Resolution {
        #[source]
        source: ServiceFault,
    },

    /// Malformed input to the builder. Fails fast; no network call is
    /// attempted.
    #[error("invalid request input: {message}")]
    Validation { message: String },

    /// The completion waiter's deadline elapsed with requests still
    /// outstanding. The remote requests keep processing.
    #[error("timed out after {waited_secs}s waiting for requests targeting {target}")]
    WaitTimedOut { target: ObjectId, waited_secs: u64 },

    /// Any other service boundary fault, surfaced as-is.
    #[error(transparent)]
    Service(#[from] ServiceFault),
}

impl RequestError {
    /// Check if this error means "no matching object".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RequestError::NotFound { .. })
    }

    /// Get an error code for classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::Resolution { .. } => "RESOLUTION_FAILED",
            RequestError::Validation { .. } => "INVALID_INPUT",
            RequestError::WaitTimedOut { .. } => "WAIT_TIMED_OUT",
            RequestError::Service(_) => "SERVICE_FAULT",
        }
    }

    /// Create a not-found error for a resolution triple.
    pub fn not_found(
        object_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        RequestError::NotFound {
            object_type: object_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        RequestError::Validation {
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type RequestResult<T> = Result<T, RequestError>;
