//! Identity service type definitions
//!
//! Closed enums for request lifecycle states, change operations, request
//! statuses, and fault categories. Invalid strings fail at parse time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Create a new object in the service.
    Create,
    /// Update an existing object.
    Put,
    /// Delete an existing object.
    Delete,
    /// Resolve anchor criteria to a durable identifier without mutating.
    Resolve,
    /// No lifecycle transition.
    None,
}

impl RequestState {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Create => "create",
            RequestState::Put => "put",
            RequestState::Delete => "delete",
            RequestState::Resolve => "resolve",
            RequestState::None => "none",
        }
    }

    /// Check whether this state addresses an existing object, making it a
    /// candidate for anchor-based target resolution.
    #[must_use]
    pub fn needs_target(&self) -> bool {
        matches!(self, RequestState::Put | RequestState::Delete)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestState {
    type Err = ParseRequestStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(RequestState::Create),
            "put" => Ok(RequestState::Put),
            "delete" => Ok(RequestState::Delete),
            "resolve" => Ok(RequestState::Resolve),
            "none" => Ok(RequestState::None),
            _ => Err(ParseRequestStateError(s.to_string())),
        }
    }
}

/// Error parsing request state from string.
#[derive(Debug, Clone)]
pub struct ParseRequestStateError(String);

impl fmt::Display for ParseRequestStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid request state '{}', expected one of: create, put, delete, resolve, none",
            self.0
        )
    }
}

impl std::error::Error for ParseRequestStateError {}

/// Operation applied by a single change entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    /// Add a value to a (typically multi-valued) attribute.
    Add,
    /// Replace the attribute value entirely.
    Replace,
    /// Delete a value from the attribute.
    Delete,
    /// No operation; used for initial values on create requests.
    None,
}

impl ChangeOperation {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Add => "add",
            ChangeOperation::Replace => "replace",
            ChangeOperation::Delete => "delete",
            ChangeOperation::None => "none",
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeOperation {
    type Err = ParseChangeOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(ChangeOperation::Add),
            "replace" => Ok(ChangeOperation::Replace),
            "delete" => Ok(ChangeOperation::Delete),
            "none" => Ok(ChangeOperation::None),
            _ => Err(ParseChangeOperationError(s.to_string())),
        }
    }
}

/// Error parsing change operation from string.
#[derive(Debug, Clone)]
pub struct ParseChangeOperationError(String);

impl fmt::Display for ParseChangeOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid change operation '{}', expected one of: add, replace, delete, none",
            self.0
        )
    }
}

impl std::error::Error for ParseChangeOperationError {}

/// Processing status of a submitted request, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Request is queued and has not started processing.
    #[default]
    Pending,
    /// Request is in the authorization workflow.
    Authorizing,
    /// Request was applied and post-processing workflows are running.
    PostProcessing,
    /// Request was denied by an authorization workflow.
    Denied,
    /// Request processing failed.
    Failed,
    /// Request was canceled before being applied.
    Canceled,
    /// Request was canceled during post-processing.
    CanceledPostProcessing,
    /// A post-processing workflow failed.
    PostProcessingError,
    /// Request completed successfully.
    Completed,
}

impl RequestStatus {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Authorizing => "authorizing",
            RequestStatus::PostProcessing => "post_processing",
            RequestStatus::Denied => "denied",
            RequestStatus::Failed => "failed",
            RequestStatus::Canceled => "canceled",
            RequestStatus::CanceledPostProcessing => "canceled_post_processing",
            RequestStatus::PostProcessingError => "post_processing_error",
            RequestStatus::Completed => "completed",
        }
    }

    /// Check if the request is in a terminal state.
    ///
    /// A terminal request will receive no further processing, regardless of
    /// whether it succeeded.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Denied
                | RequestStatus::Failed
                | RequestStatus::Canceled
                | RequestStatus::CanceledPostProcessing
                | RequestStatus::PostProcessingError
                | RequestStatus::Completed
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseRequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "authorizing" => Ok(RequestStatus::Authorizing),
            "post_processing" => Ok(RequestStatus::PostProcessing),
            "denied" => Ok(RequestStatus::Denied),
            "failed" => Ok(RequestStatus::Failed),
            "canceled" => Ok(RequestStatus::Canceled),
            "canceled_post_processing" => Ok(RequestStatus::CanceledPostProcessing),
            "post_processing_error" => Ok(RequestStatus::PostProcessingError),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(ParseRequestStatusError(s.to_string())),
        }
    }
}

/// Error parsing request status from string.
#[derive(Debug, Clone)]
pub struct ParseRequestStatusError(String);

impl fmt::Display for ParseRequestStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid request status '{}', expected one of: pending, authorizing, post_processing, denied, failed, canceled, canceled_post_processing, post_processing_error, completed",
            self.0
        )
    }
}

impl std::error::Error for ParseRequestStatusError {}

/// Machine-checkable category of a service fault.
///
/// Callers branch on the category, never on fault message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// No object matched the given criteria.
    NotFound,
    /// The service failed to construct a server-side query from the
    /// submitted criteria (a known defect class for certain characters in
    /// anchor values).
    QueryConstruction,
    /// The caller lacks permission for the operation.
    PermissionDenied,
    /// Any other fault.
    Other,
}

impl FaultKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::NotFound => "not_found",
            FaultKind::QueryConstruction => "query_construction",
            FaultKind::PermissionDenied => "permission_denied",
            FaultKind::Other => "other",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
