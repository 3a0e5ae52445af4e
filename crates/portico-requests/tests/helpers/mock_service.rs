//! In-memory identity service for integration testing.
//!
//! Plays the role of the external product: stores objects, answers
//! resolve/query/snapshot reads, applies mutations, and serves scripted
//! pending-request responses for completion-wait scenarios.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};

use portico_service::async_trait;
use portico_service::fault::{ServiceFault, ServiceResult};
use portico_service::ids::{ObjectId, RequestId};
use portico_service::model::{ChangeRequest, ChangeValue};
use portico_service::traits::{
    IdentityService, ObjectQuery, ObjectSnapshot, RequestSnapshot, SubmissionOutcome,
};
use portico_service::types::{ChangeOperation, RequestState};

struct StoredObject {
    object_type: String,
    snapshot: ObjectSnapshot,
}

/// A mock identity service that tracks submissions and supports various
/// test scenarios.
pub struct MockService {
    objects: RwLock<Vec<StoredObject>>,
    pending_script: Mutex<VecDeque<Vec<RequestSnapshot>>>,
    submissions: Mutex<Vec<ChangeRequest>>,
    resolve_submits: AtomicU32,
    pending_calls: AtomicU32,
    reject_resolve_submits: AtomicBool,
}

impl MockService {
    /// Create an empty mock service.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(Vec::new()),
            pending_script: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            resolve_submits: AtomicU32::new(0),
            pending_calls: AtomicU32::new(0),
            reject_resolve_submits: AtomicBool::new(false),
        }
    }

    /// Seed an object.
    pub fn add_object(&self, object_type: &str, snapshot: ObjectSnapshot) {
        self.objects.write().unwrap().push(StoredObject {
            object_type: object_type.to_string(),
            snapshot,
        });
    }

    /// Queue responses for `pending_requests`; once the queue drains, the
    /// service reports nothing pending.
    pub fn script_pending(&self, responses: Vec<Vec<RequestSnapshot>>) {
        self.pending_script.lock().unwrap().extend(responses);
    }

    /// Make every `Resolve` submission fail with a query-construction
    /// fault, simulating the server-side filter-escaping defect. The read
    /// path stays functional.
    pub fn reject_resolve_submissions(&self) {
        self.reject_resolve_submits.store(true, Ordering::SeqCst);
    }

    /// Number of `Resolve` submissions seen.
    pub fn resolve_submit_count(&self) -> u32 {
        self.resolve_submits.load(Ordering::SeqCst)
    }

    /// Number of `pending_requests` calls seen.
    pub fn pending_call_count(&self) -> u32 {
        self.pending_calls.load(Ordering::SeqCst)
    }

    /// All requests submitted so far.
    pub fn submissions(&self) -> Vec<ChangeRequest> {
        self.submissions.lock().unwrap().clone()
    }

    /// Look up an object id by type and attribute value.
    pub fn find_id(&self, object_type: &str, attribute: &str, value: &str) -> Option<ObjectId> {
        self.objects
            .read()
            .unwrap()
            .iter()
            .find(|o| o.object_type == object_type && o.snapshot.get(attribute) == Some(value))
            .map(|o| o.snapshot.id)
    }

    fn apply_create(&self, request: &ChangeRequest) -> ObjectId {
        let mut snapshot = ObjectSnapshot::new(ObjectId::new());
        for change in &request.changes {
            if let ChangeValue::Literal(value) = &change.value {
                snapshot
                    .attributes
                    .insert(change.attribute.clone(), value.clone());
            }
        }
        let id = snapshot.id;
        self.add_object(&request.object_type, snapshot);
        id
    }

    fn apply_put(&self, request: &ChangeRequest) -> ServiceResult<()> {
        let target = request
            .target
            .ok_or_else(|| ServiceFault::other("put request without target"))?;
        let mut objects = self.objects.write().unwrap();
        let stored = objects
            .iter_mut()
            .find(|o| o.snapshot.id == target)
            .ok_or_else(|| ServiceFault::not_found(format!("object {target}")))?;
        for change in &request.changes {
            let Some(value) = change.value.as_literal() else {
                continue;
            };
            match change.operation {
                ChangeOperation::Add | ChangeOperation::Replace | ChangeOperation::None => {
                    stored
                        .snapshot
                        .attributes
                        .insert(change.attribute.clone(), value.to_string());
                }
                ChangeOperation::Delete => {
                    stored.snapshot.attributes.remove(&change.attribute);
                }
            }
        }
        Ok(())
    }

    fn apply_delete(&self, request: &ChangeRequest) -> ServiceResult<()> {
        let target = request
            .target
            .ok_or_else(|| ServiceFault::other("delete request without target"))?;
        let mut objects = self.objects.write().unwrap();
        let before = objects.len();
        objects.retain(|o| o.snapshot.id != target);
        if objects.len() == before {
            return Err(ServiceFault::not_found(format!("object {target}")));
        }
        Ok(())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityService for MockService {
    async fn submit(&self, request: &ChangeRequest) -> ServiceResult<SubmissionOutcome> {
        self.submissions.lock().unwrap().push(request.clone());
        let request_id = RequestId::new();

        match request.state {
            RequestState::Resolve => {
                self.resolve_submits.fetch_add(1, Ordering::SeqCst);
                if self.reject_resolve_submits.load(Ordering::SeqCst) {
                    return Err(ServiceFault::query_construction(
                        "cannot build filter from anchor value",
                    ));
                }
                let anchor = request
                    .anchors
                    .first()
                    .ok_or_else(|| ServiceFault::other("resolve request without anchor"))?;
                match self.find_id(&request.object_type, &anchor.attribute, &anchor.value) {
                    Some(id) => Ok(SubmissionOutcome::resolved(request_id, id)),
                    None => Err(ServiceFault::not_found(format!(
                        "{}[{anchor}]",
                        request.object_type
                    ))),
                }
            }
            RequestState::Create => {
                let id = self.apply_create(request);
                Ok(SubmissionOutcome::resolved(request_id, id))
            }
            RequestState::Put => {
                self.apply_put(request)?;
                Ok(SubmissionOutcome::accepted(request_id))
            }
            RequestState::Delete => {
                self.apply_delete(request)?;
                Ok(SubmissionOutcome::accepted(request_id))
            }
            RequestState::None => Ok(SubmissionOutcome::accepted(request_id)),
        }
    }

    async fn query_objects(&self, query: &ObjectQuery) -> ServiceResult<Vec<ObjectSnapshot>> {
        Ok(self
            .objects
            .read()
            .unwrap()
            .iter()
            .filter(|o| {
                o.object_type == query.object_type
                    && o.snapshot.get(&query.attribute) == Some(query.value.as_str())
            })
            .map(|o| o.snapshot.clone())
            .collect())
    }

    async fn pending_requests(&self, _target: ObjectId) -> ServiceResult<Vec<RequestSnapshot>> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pending_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn object_snapshot(&self, id: ObjectId) -> ServiceResult<ObjectSnapshot> {
        self.objects
            .read()
            .unwrap()
            .iter()
            .find(|o| o.snapshot.id == id)
            .map(|o| o.snapshot.clone())
            .ok_or_else(|| ServiceFault::not_found(format!("object {id}")))
    }
}
