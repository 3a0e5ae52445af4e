//! Duplicate creation guard
//!
//! Client-side uniqueness check for create requests. The service does not
//! enforce uniqueness on most object types, so repeated configuration-load
//! runs can silently create duplicates; this guard resolves a configurable
//! anchor attribute before submission and suppresses the request when an
//! equivalent object already exists.

use std::sync::Arc;
use tracing::warn;

use portico_service::ids::ObjectId;
use portico_service::model::ChangeRequest;
use portico_service::traits::IdentityService;
use portico_service::types::RequestState;

use crate::advisory::Advisory;
use crate::error::RequestResult;
use crate::resolver::Resolver;

/// Default anchor attribute used to detect duplicates.
pub const DEFAULT_GUARD_ANCHOR: &str = "DisplayName";

/// Decision made by the guard for one request.
#[derive(Debug, Clone)]
pub enum GuardOutcome {
    /// Submit the request. Carries any advisories raised while deciding.
    Pass {
        request: ChangeRequest,
        advisories: Vec<Advisory>,
    },
    /// Do not submit; an equivalent object already exists.
    Suppressed {
        existing: ObjectId,
        advisory: Advisory,
    },
}

impl GuardOutcome {
    /// Check whether the request was suppressed.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, GuardOutcome::Suppressed { .. })
    }

    /// Get the request when it passed, consuming the outcome.
    pub fn into_request(self) -> Option<ChangeRequest> {
        match self {
            GuardOutcome::Pass { request, .. } => Some(request),
            GuardOutcome::Suppressed { .. } => None,
        }
    }
}

/// Suppresses create requests for objects that already exist.
///
/// The existence check is a snapshot read that may be stale by submission
/// time; the guard is advisory, not an isolation guarantee.
#[derive(Clone)]
pub struct DuplicateGuard {
    resolver: Resolver,
    anchor_attribute: String,
}

impl DuplicateGuard {
    /// Create a guard using the default anchor attribute.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self {
            resolver: Resolver::new(service),
            anchor_attribute: DEFAULT_GUARD_ANCHOR.to_string(),
        }
    }

    /// Set the anchor attribute used to detect duplicates.
    #[must_use]
    pub fn with_anchor_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.anchor_attribute = attribute.into();
        self
    }

    /// Decide whether the request should be submitted.
    ///
    /// Only `Create` requests are inspected; everything else passes through
    /// unchanged. A create request without the anchor attribute in its
    /// change list passes through too, fail-open: without an anchor value
    /// there is nothing to resolve against.
    pub async fn filter(&self, request: ChangeRequest) -> RequestResult<GuardOutcome> {
        if request.state != RequestState::Create {
            return Ok(GuardOutcome::Pass {
                request,
                advisories: Vec::new(),
            });
        }

        let Some(anchor_value) = request.change_value(&self.anchor_attribute) else {
            warn!(
                object_type = %request.object_type,
                attribute = %self.anchor_attribute,
                "cannot detect duplicates without anchor; passing request through"
            );
            let advisory = Advisory::MissingGuardAnchor {
                attribute: self.anchor_attribute.clone(),
            };
            return Ok(GuardOutcome::Pass {
                request,
                advisories: vec![advisory],
            });
        };
        let anchor_value = anchor_value.to_string();

        match self
            .resolver
            .try_resolve(&request.object_type, &self.anchor_attribute, &anchor_value)
            .await?
        {
            Some(existing) => {
                warn!(
                    object_type = %request.object_type,
                    attribute = %self.anchor_attribute,
                    value = %anchor_value,
                    existing = %existing,
                    "equivalent object already exists; suppressing creation"
                );
                Ok(GuardOutcome::Suppressed {
                    existing,
                    advisory: Advisory::DuplicateObject {
                        object_type: request.object_type,
                        attribute: self.anchor_attribute.clone(),
                        value: anchor_value,
                        existing,
                    },
                })
            }
            None => Ok(GuardOutcome::Pass {
                request,
                advisories: Vec::new(),
            }),
        }
    }
}
