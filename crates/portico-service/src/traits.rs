//! Identity service capability trait
//!
//! The abstract boundary to the external service: request submission, the
//! read-only query path, pending-request lookup, and object snapshots.
//! This is a capability set, not a wire format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::fault::ServiceResult;
use crate::ids::{ObjectId, RequestId};
use crate::model::ChangeRequest;
use crate::types::RequestStatus;

/// Read-only type/attribute/value lookup criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectQuery {
    /// Schema type to search.
    pub object_type: String,
    /// Attribute to match.
    pub attribute: String,
    /// Value to match exactly.
    pub value: String,
}

impl ObjectQuery {
    /// Create an equality query.
    pub fn eq(
        object_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ObjectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}={}]", self.object_type, self.attribute, self.value)
    }
}

/// Point-in-time attribute view of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// Durable identifier of the object.
    pub id: ObjectId,
    /// Attribute name to value map at read time.
    pub attributes: HashMap<String, String>,
}

impl ObjectSnapshot {
    /// Create an empty snapshot for the given object.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute using builder pattern.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    /// Get an attribute value.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    /// Check if an attribute exists.
    pub fn has(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }
}

/// Point-in-time view of a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    /// Identifier of the request.
    pub id: RequestId,
    /// Object the request addresses.
    pub target: ObjectId,
    /// Current processing status.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl RequestSnapshot {
    /// Create a snapshot for a freshly submitted request.
    pub fn new(id: RequestId, target: ObjectId) -> Self {
        Self {
            id,
            target,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Set the status using builder pattern.
    #[must_use]
    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }
}

/// Result of submitting a change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Identifier assigned to the request by the service.
    pub request_id: RequestId,
    /// Target identifier, populated for `Resolve` requests and for creates
    /// where the service reports the new object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ObjectId>,
}

impl SubmissionOutcome {
    /// Create an outcome without a target identifier.
    pub fn accepted(request_id: RequestId) -> Self {
        Self {
            request_id,
            target: None,
        }
    }

    /// Create an outcome carrying a resolved or created target.
    pub fn resolved(request_id: RequestId, target: ObjectId) -> Self {
        Self {
            request_id,
            target: Some(target),
        }
    }
}

/// Capability set exposed by the external identity service.
///
/// All request construction and idempotency logic lives above this trait;
/// implementations only move data to and from the actual product API.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Apply a `Create`/`Put`/`Delete`/`Resolve`/`None` request.
    ///
    /// For `Resolve`, a successful outcome carries the resolved target
    /// identifier. Faults carry a machine-checkable [`FaultKind`]
    /// category.
    ///
    /// [`FaultKind`]: crate::types::FaultKind
    async fn submit(&self, request: &ChangeRequest) -> ServiceResult<SubmissionOutcome>;

    /// Read-only lookup by a type/attribute/value filter.
    ///
    /// Returns an empty vec, never a fault, when nothing matches.
    async fn query_objects(&self, query: &ObjectQuery) -> ServiceResult<Vec<ObjectSnapshot>>;

    /// Requests addressing the given target, with their current status.
    async fn pending_requests(&self, target: ObjectId) -> ServiceResult<Vec<RequestSnapshot>>;

    /// Current attribute map of one object.
    async fn object_snapshot(&self, id: ObjectId) -> ServiceResult<ObjectSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::ServiceFault;
    use crate::model::AnchorPair;
    use crate::types::RequestState;

    // Minimal stub holding one resolvable object.
    struct StubService {
        known: ObjectSnapshot,
    }

    #[async_trait]
    impl IdentityService for StubService {
        async fn submit(&self, request: &ChangeRequest) -> ServiceResult<SubmissionOutcome> {
            if request.state == RequestState::Resolve {
                return Ok(SubmissionOutcome::resolved(RequestId::new(), self.known.id));
            }
            Ok(SubmissionOutcome::accepted(RequestId::new()))
        }

        async fn query_objects(&self, _query: &ObjectQuery) -> ServiceResult<Vec<ObjectSnapshot>> {
            Ok(vec![self.known.clone()])
        }

        async fn pending_requests(
            &self,
            _target: ObjectId,
        ) -> ServiceResult<Vec<RequestSnapshot>> {
            Ok(Vec::new())
        }

        async fn object_snapshot(&self, id: ObjectId) -> ServiceResult<ObjectSnapshot> {
            if id == self.known.id {
                Ok(self.known.clone())
            } else {
                Err(ServiceFault::not_found(format!("object {id}")))
            }
        }
    }

    #[tokio::test]
    async fn test_trait_object_usable() {
        let known = ObjectSnapshot::new(ObjectId::new()).with("AccountName", "bob");
        let id = known.id;
        let service: Box<dyn IdentityService> = Box::new(StubService { known });

        let request = ChangeRequest::resolve("Person", AnchorPair::new("AccountName", "bob"));
        let outcome = service.submit(&request).await.unwrap();
        assert_eq!(outcome.target, Some(id));

        let snapshot = service.object_snapshot(id).await.unwrap();
        assert_eq!(snapshot.get("AccountName"), Some("bob"));

        let missing = service.object_snapshot(ObjectId::new()).await;
        assert!(matches!(missing, Err(ServiceFault::NotFound { .. })));
    }

    #[test]
    fn test_object_query_display() {
        let query = ObjectQuery::eq("Person", "AccountName", "bob");
        assert_eq!(query.to_string(), "Person[AccountName=bob]");
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = ObjectSnapshot::new(ObjectId::new())
            .with("FirstName", "Bob")
            .with("LastName", "Builder");
        assert!(snapshot.has("FirstName"));
        assert_eq!(snapshot.get("LastName"), Some("Builder"));
        assert_eq!(snapshot.get("Email"), None);
    }
}
