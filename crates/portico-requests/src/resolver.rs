//! Anchor resolution
//!
//! Turns a (type, attribute, value) triple into a durable object identifier
//! by submitting a resolve-state request, with a read-path fallback for the
//! service's query-construction defect.

use std::sync::Arc;
use tracing::{debug, warn};

use portico_service::ids::ObjectId;
use portico_service::model::{AnchorPair, ChangeRequest};
use portico_service::traits::{IdentityService, ObjectQuery};
use portico_service::types::FaultKind;

use crate::error::{RequestError, RequestResult};

/// Resolves anchor criteria to durable identifiers via the service.
///
/// Every call performs a live resolution; callers needing memoization must
/// add it above this layer.
#[derive(Clone)]
pub struct Resolver {
    service: Arc<dyn IdentityService>,
}

impl Resolver {
    /// Create a resolver over the given service.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self { service }
    }

    /// Resolve a (type, attribute, value) triple to an object identifier.
    ///
    /// Submits a `Resolve`-state request with a single anchor pair. When
    /// the service reports a query-construction fault, a known defect
    /// class for certain characters in anchor values, resolution retries
    /// once through the read-only query path with an equivalent filter.
    /// The fallback is keyed on the structured fault category, never on
    /// fault message text.
    ///
    /// # Errors
    ///
    /// [`RequestError::NotFound`] when no object matches;
    /// [`RequestError::Resolution`] for any other service fault.
    pub async fn resolve(
        &self,
        object_type: &str,
        attribute: &str,
        value: &str,
    ) -> RequestResult<ObjectId> {
        let request = ChangeRequest::resolve(object_type, AnchorPair::new(attribute, value));

        match self.service.submit(&request).await {
            Ok(outcome) => match outcome.target {
                Some(id) => {
                    debug!(object_type, attribute, value, id = %id, "anchor resolved");
                    Ok(id)
                }
                None => Err(RequestError::not_found(object_type, attribute, value)),
            },
            Err(fault) => match fault.kind() {
                FaultKind::NotFound => {
                    Err(RequestError::not_found(object_type, attribute, value))
                }
                FaultKind::QueryConstruction => {
                    warn!(
                        object_type,
                        attribute,
                        value,
                        fault = %fault,
                        "resolve request rejected by query construction; falling back to read path"
                    );
                    self.resolve_via_query(object_type, attribute, value).await
                }
                _ => Err(RequestError::Resolution { source: fault }),
            },
        }
    }

    /// Resolve without treating "not found" as an error.
    ///
    /// Used by the duplicate guard, where an absent object means "safe to
    /// create".
    pub async fn try_resolve(
        &self,
        object_type: &str,
        attribute: &str,
        value: &str,
    ) -> RequestResult<Option<ObjectId>> {
        match self.resolve(object_type, attribute, value).await {
            Ok(id) => Ok(Some(id)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Read-path fallback with an equivalent type/attribute/value filter.
    async fn resolve_via_query(
        &self,
        object_type: &str,
        attribute: &str,
        value: &str,
    ) -> RequestResult<ObjectId> {
        let query = ObjectQuery::eq(object_type, attribute, value);
        let matches = self
            .service
            .query_objects(&query)
            .await
            .map_err(|fault| RequestError::Resolution { source: fault })?;

        matches
            .first()
            .map(|snapshot| snapshot.id)
            .ok_or_else(|| RequestError::not_found(object_type, attribute, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_service::async_trait;
    use portico_service::fault::{ServiceFault, ServiceResult};
    use portico_service::ids::RequestId;
    use portico_service::traits::{ObjectSnapshot, RequestSnapshot, SubmissionOutcome};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted service: submit behavior is fixed per instance, the read
    /// path serves a single known object.
    struct ScriptedService {
        submit_result: fn() -> ServiceResult<SubmissionOutcome>,
        query_hit: Option<ObjectSnapshot>,
        query_calls: AtomicU32,
    }

    impl ScriptedService {
        fn new(submit_result: fn() -> ServiceResult<SubmissionOutcome>) -> Self {
            Self {
                submit_result,
                query_hit: None,
                query_calls: AtomicU32::new(0),
            }
        }

        fn with_query_hit(mut self, snapshot: ObjectSnapshot) -> Self {
            self.query_hit = Some(snapshot);
            self
        }
    }

    #[async_trait]
    impl IdentityService for ScriptedService {
        async fn submit(&self, _request: &ChangeRequest) -> ServiceResult<SubmissionOutcome> {
            (self.submit_result)()
        }

        async fn query_objects(&self, _query: &ObjectQuery) -> ServiceResult<Vec<ObjectSnapshot>> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.query_hit.clone().into_iter().collect())
        }

        async fn pending_requests(
            &self,
            _target: ObjectId,
        ) -> ServiceResult<Vec<RequestSnapshot>> {
            Ok(Vec::new())
        }

        async fn object_snapshot(&self, id: ObjectId) -> ServiceResult<ObjectSnapshot> {
            Err(ServiceFault::not_found(format!("object {id}")))
        }
    }

    fn resolver_over(service: ScriptedService) -> Resolver {
        Resolver::new(Arc::new(service))
    }

    #[tokio::test]
    async fn test_resolve_returns_populated_target() {
        let id = ObjectId::parse("7fbf093e-47d8-4f19-b97b-7bbd9d3265c6").unwrap();
        let resolver = resolver_over(ScriptedService::new(|| {
            Ok(SubmissionOutcome::resolved(
                RequestId::new(),
                ObjectId::parse("urn:uuid:7fbf093e-47d8-4f19-b97b-7bbd9d3265c6").unwrap(),
            ))
        }));

        let resolved = resolver.resolve("Person", "AccountName", "bob").await.unwrap();
        assert_eq!(resolved, id);
    }

    #[tokio::test]
    async fn test_resolve_not_found_fault() {
        let resolver = resolver_over(ScriptedService::new(|| {
            Err(ServiceFault::not_found("no such person"))
        }));

        let err = resolver
            .resolve("Person", "AccountName", "ghost")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_empty_target_is_not_found() {
        let resolver = resolver_over(ScriptedService::new(|| {
            Ok(SubmissionOutcome::accepted(RequestId::new()))
        }));

        let err = resolver
            .resolve("Person", "AccountName", "ghost")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_query_construction_falls_back_to_read_path() {
        let snapshot = ObjectSnapshot::new(ObjectId::new());
        let id = snapshot.id;
        let service = ScriptedService::new(|| {
            Err(ServiceFault::query_construction("bad filter"))
        })
        .with_query_hit(snapshot);
        let resolver = resolver_over(service);

        let resolved = resolver
            .resolve("Person", "DisplayName", "O'Brien, Bob")
            .await
            .unwrap();
        assert_eq!(resolved, id);
    }

    #[tokio::test]
    async fn test_fallback_miss_is_not_found() {
        let resolver = resolver_over(ScriptedService::new(|| {
            Err(ServiceFault::query_construction("bad filter"))
        }));

        let err = resolver
            .resolve("Person", "DisplayName", "O'Brien, Bob")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_other_faults_are_not_retried() {
        let service = ScriptedService::new(|| Err(ServiceFault::other("workflow host down")))
            .with_query_hit(ObjectSnapshot::new(ObjectId::new()));
        let service = Arc::new(service);
        let resolver = Resolver::new(service.clone());

        let err = resolver
            .resolve("Person", "AccountName", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Resolution { .. }));
        // The read path must not have been consulted.
        assert_eq!(service.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_try_resolve_maps_not_found_to_none() {
        let resolver = resolver_over(ScriptedService::new(|| {
            Err(ServiceFault::not_found("no such person"))
        }));

        let resolved = resolver
            .try_resolve("Person", "DisplayName", "Bob the Builder")
            .await
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_try_resolve_propagates_other_errors() {
        let resolver = resolver_over(ScriptedService::new(|| {
            Err(ServiceFault::permission_denied("resolve denied"))
        }));

        let err = resolver
            .try_resolve("Person", "DisplayName", "Bob")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Resolution { .. }));
    }
}
