//! Change request construction
//!
//! Assembles a normalized request from heterogeneous input shapes, resolves
//! anchors and embedded references to durable identifiers, and suppresses
//! additive changes the target already carries.

use std::sync::Arc;
use tracing::{debug, warn};

use portico_service::ids::ObjectId;
use portico_service::model::{AnchorPair, Change, ChangeRequest, ChangeValue};
use portico_service::traits::{IdentityService, ObjectSnapshot};
use portico_service::types::{ChangeOperation, RequestState};

use crate::advisory::Advisory;
use crate::error::{RequestError, RequestResult};
use crate::resolver::Resolver;

/// Change input accepted by the builder.
///
/// Callers hand over pre-built changes, a single change, or a plain
/// name/value mapping; the union is normalized to one change sequence at
/// entry. Each mapping entry becomes a `Replace` change.
#[derive(Debug, Clone)]
pub enum ChangesInput {
    /// Pre-built changes, kept in order.
    List(Vec<Change>),
    /// A single pre-built change.
    Single(Change),
    /// Attribute name/value pairs, each becoming a `Replace` change.
    Map(Vec<(String, String)>),
}

impl ChangesInput {
    /// Input carrying no changes.
    pub fn empty() -> Self {
        ChangesInput::List(Vec::new())
    }

    pub(crate) fn normalize(self) -> Vec<Change> {
        match self {
            ChangesInput::List(changes) => changes,
            ChangesInput::Single(change) => vec![change],
            ChangesInput::Map(entries) => entries
                .into_iter()
                .map(|(attribute, value)| Change::replace(attribute, value))
                .collect(),
        }
    }
}

impl From<Vec<Change>> for ChangesInput {
    fn from(changes: Vec<Change>) -> Self {
        ChangesInput::List(changes)
    }
}

impl From<Change> for ChangesInput {
    fn from(change: Change) -> Self {
        ChangesInput::Single(change)
    }
}

impl From<Vec<(String, String)>> for ChangesInput {
    fn from(entries: Vec<(String, String)>) -> Self {
        ChangesInput::Map(entries)
    }
}

impl From<Vec<(&str, &str)>> for ChangesInput {
    fn from(entries: Vec<(&str, &str)>) -> Self {
        ChangesInput::Map(
            entries
                .into_iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Anchor input accepted by the builder, normalized like [`ChangesInput`].
#[derive(Debug, Clone)]
pub enum AnchorsInput {
    /// Pre-built anchor pairs, kept in order.
    List(Vec<AnchorPair>),
    /// A single pre-built anchor pair.
    Single(AnchorPair),
    /// Attribute name/value pairs.
    Map(Vec<(String, String)>),
}

impl AnchorsInput {
    /// Input carrying no anchors.
    pub fn empty() -> Self {
        AnchorsInput::List(Vec::new())
    }

    pub(crate) fn normalize(self) -> Vec<AnchorPair> {
        match self {
            AnchorsInput::List(anchors) => anchors,
            AnchorsInput::Single(anchor) => vec![anchor],
            AnchorsInput::Map(entries) => entries
                .into_iter()
                .map(|(attribute, value)| AnchorPair::new(attribute, value))
                .collect(),
        }
    }
}

impl From<Vec<AnchorPair>> for AnchorsInput {
    fn from(anchors: Vec<AnchorPair>) -> Self {
        AnchorsInput::List(anchors)
    }
}

impl From<AnchorPair> for AnchorsInput {
    fn from(anchor: AnchorPair) -> Self {
        AnchorsInput::Single(anchor)
    }
}

impl From<Vec<(String, String)>> for AnchorsInput {
    fn from(entries: Vec<(String, String)>) -> Self {
        AnchorsInput::Map(entries)
    }
}

impl From<Vec<(&str, &str)>> for AnchorsInput {
    fn from(entries: Vec<(&str, &str)>) -> Self {
        AnchorsInput::Map(
            entries
                .into_iter()
                .map(|(a, v)| (a.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// A normalized request plus the advisories raised while building it.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    /// The normalized request, ready for the guard and submission.
    pub request: ChangeRequest,
    /// Non-fatal decisions made during construction.
    pub advisories: Vec<Advisory>,
}

impl BuiltRequest {
    /// Check whether this is an update whose change list ended up empty,
    /// i.e. submitting it would be a no-op.
    pub fn is_noop_update(&self) -> bool {
        self.request.state == RequestState::Put && !self.request.has_changes()
    }
}

/// Builds normalized change requests against the service.
///
/// The builder resolves but never submits; its only network traffic is
/// anchor/reference resolution and the duplicate-check snapshot read.
#[derive(Clone)]
pub struct ChangeRequestBuilder {
    service: Arc<dyn IdentityService>,
    resolver: Resolver,
}

impl ChangeRequestBuilder {
    /// Create a builder over the given service.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        let resolver = Resolver::new(service.clone());
        Self { service, resolver }
    }

    /// Build a normalized request.
    ///
    /// For `Put` and `Delete` with exactly one anchor pair, the target
    /// identifier is resolved automatically; resolver failures abort the
    /// whole build. For `Put` with a resolved target, additive changes the
    /// target already carries are dropped with an advisory.
    pub async fn build(
        &self,
        object_type: &str,
        state: RequestState,
        anchors: impl Into<AnchorsInput>,
        changes: impl Into<ChangesInput>,
    ) -> RequestResult<BuiltRequest> {
        self.build_with(object_type, state, anchors, changes, None, None)
            .await
    }

    /// Build a normalized request with explicit source/target seeds.
    ///
    /// A pre-seeded target disables anchor-based auto-resolution.
    pub async fn build_with(
        &self,
        object_type: &str,
        state: RequestState,
        anchors: impl Into<AnchorsInput>,
        changes: impl Into<ChangesInput>,
        source: Option<ObjectId>,
        target: Option<ObjectId>,
    ) -> RequestResult<BuiltRequest> {
        let anchors = anchors.into().normalize();
        let changes = changes.into().normalize();
        validate(object_type, state, &anchors, &changes)?;

        let mut advisories = Vec::new();
        let changes = self.resolve_references(changes).await?;

        let mut request = ChangeRequest {
            object_type: object_type.to_string(),
            state,
            source,
            target,
            anchors,
            changes,
        };

        if state.needs_target() && request.target.is_none() {
            if let Some(anchor) = request.single_anchor().cloned() {
                let target = self
                    .resolver
                    .resolve(object_type, &anchor.attribute, &anchor.value)
                    .await?;
                debug!(object_type, anchor = %anchor, target_id = %target, "target auto-resolved");
                request.target = Some(target);
            }
        }

        if state == RequestState::Put {
            if let Some(target) = request.target {
                request.changes = self
                    .suppress_present_values(target, request.changes, &mut advisories)
                    .await?;
            }
            if !request.has_changes() {
                warn!(
                    object_type,
                    target_id = ?request.target,
                    "update request carries no changes after suppression"
                );
                advisories.push(Advisory::EmptyRequest {
                    object_type: object_type.to_string(),
                });
            }
        }

        Ok(BuiltRequest {
            request,
            advisories,
        })
    }

    /// Resolve embedded cross-object references to literal identifiers.
    ///
    /// Resolution happens at construction time; a reference that matches no
    /// object fails the whole build.
    async fn resolve_references(&self, changes: Vec<Change>) -> RequestResult<Vec<Change>> {
        let mut resolved = Vec::with_capacity(changes.len());
        for mut change in changes {
            if let ChangeValue::Reference {
                object_type,
                attribute,
                value,
            } = &change.value
            {
                let id = self.resolver.resolve(object_type, attribute, value).await?;
                change.value = ChangeValue::Literal(id.to_string());
                change.fully_resolved = true;
            }
            resolved.push(change);
        }
        Ok(resolved)
    }

    /// Drop additive changes whose value the target already carries.
    ///
    /// The decision is based on a snapshot read that may be stale by
    /// submission time; when the snapshot cannot be read at all, the
    /// changes are kept as-is rather than failing the build.
    async fn suppress_present_values(
        &self,
        target: ObjectId,
        changes: Vec<Change>,
        advisories: &mut Vec<Advisory>,
    ) -> RequestResult<Vec<Change>> {
        let snapshot = match self.service.object_snapshot(target).await {
            Ok(snapshot) => snapshot,
            Err(fault) => {
                warn!(
                    target_id = %target,
                    fault = %fault,
                    "snapshot read failed; keeping all changes unsuppressed"
                );
                return Ok(changes);
            }
        };
        Ok(suppress_duplicates(changes, &snapshot, advisories))
    }
}

/// Keep every change except `Add` entries whose literal value equals the
/// current value on the snapshot. Idempotent: a second pass over the
/// surviving changes drops nothing further.
fn suppress_duplicates(
    changes: Vec<Change>,
    snapshot: &ObjectSnapshot,
    advisories: &mut Vec<Advisory>,
) -> Vec<Change> {
    changes
        .into_iter()
        .filter(|change| {
            if change.operation != ChangeOperation::Add {
                return true;
            }
            let proposed = match change.value.as_literal() {
                Some(value) => value,
                None => return true,
            };
            if snapshot.get(&change.attribute) == Some(proposed) {
                warn!(
                    attribute = %change.attribute,
                    value = proposed,
                    target_id = %snapshot.id,
                    "skipping add: target already carries the value"
                );
                advisories.push(Advisory::DuplicateValueSkipped {
                    attribute: change.attribute.clone(),
                    value: proposed.to_string(),
                });
                false
            } else {
                true
            }
        })
        .collect()
}

fn validate(
    object_type: &str,
    state: RequestState,
    anchors: &[AnchorPair],
    changes: &[Change],
) -> RequestResult<()> {
    if object_type.trim().is_empty() {
        return Err(RequestError::validation("object type must not be empty"));
    }
    for change in changes {
        if change.attribute.trim().is_empty() {
            return Err(RequestError::validation(
                "change attribute name must not be empty",
            ));
        }
    }
    for anchor in anchors {
        if anchor.attribute.trim().is_empty() {
            return Err(RequestError::validation(
                "anchor attribute name must not be empty",
            ));
        }
    }
    if state == RequestState::Resolve {
        if anchors.is_empty() {
            return Err(RequestError::validation(
                "resolve requests require at least one anchor pair",
            ));
        }
        if !changes.is_empty() {
            return Err(RequestError::validation(
                "resolve requests must not carry changes",
            ));
        }
    }
    Ok(())
}
