//! Request pipeline
//!
//! The explicit per-process context object: one service handle plus one
//! config, from which resolver, builder, guard, and waiter are drawn. There
//! is no ambient global session state.

use std::sync::Arc;
use tracing::{debug, info, warn};

use portico_service::ids::{ObjectId, RequestId};
use portico_service::model::Change;
use portico_service::traits::IdentityService;
use portico_service::types::RequestState;

use crate::advisory::Advisory;
use crate::builder::{AnchorsInput, BuiltRequest, ChangeRequestBuilder, ChangesInput};
use crate::config::PipelineConfig;
use crate::error::RequestResult;
use crate::guard::{DuplicateGuard, GuardOutcome};
use crate::resolver::Resolver;
use crate::waiter::CompletionWaiter;

/// What happened to a built request handed to [`RequestPipeline::apply`].
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// The request was submitted.
    Submitted {
        request_id: RequestId,
        target: Option<ObjectId>,
        advisories: Vec<Advisory>,
    },
    /// The duplicate guard found an equivalent existing object.
    SuppressedDuplicate {
        existing: ObjectId,
        advisories: Vec<Advisory>,
    },
    /// The request was a no-op update and the config says not to submit
    /// those.
    Skipped { advisories: Vec<Advisory> },
}

impl ApplyOutcome {
    /// Advisories raised across build and apply.
    pub fn advisories(&self) -> &[Advisory] {
        match self {
            ApplyOutcome::Submitted { advisories, .. }
            | ApplyOutcome::SuppressedDuplicate { advisories, .. }
            | ApplyOutcome::Skipped { advisories } => advisories,
        }
    }
}

/// Pipeline over one service connection.
#[derive(Clone)]
pub struct RequestPipeline {
    service: Arc<dyn IdentityService>,
    config: PipelineConfig,
}

impl RequestPipeline {
    /// Create a pipeline with the default configuration.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self::with_config(service, PipelineConfig::default())
    }

    /// Create a pipeline with an explicit configuration.
    pub fn with_config(service: Arc<dyn IdentityService>, config: PipelineConfig) -> Self {
        Self { service, config }
    }

    /// Get the underlying service handle.
    pub fn service(&self) -> Arc<dyn IdentityService> {
        self.service.clone()
    }

    /// Get the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Create a resolver over this pipeline's service.
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.service.clone())
    }

    /// Create a builder over this pipeline's service.
    pub fn builder(&self) -> ChangeRequestBuilder {
        ChangeRequestBuilder::new(self.service.clone())
    }

    /// Create a duplicate guard using the configured anchor attribute.
    pub fn guard(&self) -> DuplicateGuard {
        DuplicateGuard::new(self.service.clone())
            .with_anchor_attribute(self.config.guard_anchor_attribute.clone())
    }

    /// Create a completion waiter using the configured interval/deadline.
    pub fn waiter(&self) -> CompletionWaiter {
        CompletionWaiter::with_config(self.service.clone(), self.config.waiter_config())
    }

    /// Guard, submit, and optionally wait for a built request.
    ///
    /// The linear flow: no-op updates are skipped (configurable), create
    /// requests pass the duplicate guard, the survivor is submitted, and
    /// when the config asks for it the call blocks until the submitted
    /// request reaches a terminal status.
    pub async fn apply(&self, built: BuiltRequest) -> RequestResult<ApplyOutcome> {
        self.apply_with_guard(built, self.guard()).await
    }

    /// Resolve an object by anchor, creating it when absent.
    ///
    /// The idempotent configuration-load primitive: repeated calls with the
    /// same anchor converge on one object. When creation is suppressed by
    /// the guard (another run got there first), the existing identifier is
    /// returned instead.
    pub async fn resolve_or_create(
        &self,
        object_type: &str,
        anchor_attribute: &str,
        anchor_value: &str,
        initial: impl Into<ChangesInput>,
    ) -> RequestResult<ObjectId> {
        if let Some(id) = self
            .resolver()
            .try_resolve(object_type, anchor_attribute, anchor_value)
            .await?
        {
            debug!(object_type, anchor_attribute, anchor_value, id = %id, "object already exists");
            return Ok(id);
        }

        // Make sure the anchor lands on the new object so a later resolve
        // can find it.
        let mut changes = initial.into().normalize();
        if !changes
            .iter()
            .any(|change| change.attribute == anchor_attribute)
        {
            changes.push(Change::replace(anchor_attribute, anchor_value));
        }

        let built = self
            .builder()
            .build(object_type, RequestState::Create, AnchorsInput::empty(), changes)
            .await?;

        let guard =
            DuplicateGuard::new(self.service.clone()).with_anchor_attribute(anchor_attribute);
        match self.apply_with_guard(built, guard).await? {
            ApplyOutcome::SuppressedDuplicate { existing, .. } => Ok(existing),
            ApplyOutcome::Submitted { .. } | ApplyOutcome::Skipped { .. } => {
                self.resolver()
                    .resolve(object_type, anchor_attribute, anchor_value)
                    .await
            }
        }
    }

    async fn apply_with_guard(
        &self,
        built: BuiltRequest,
        guard: DuplicateGuard,
    ) -> RequestResult<ApplyOutcome> {
        let skip_noop = built.is_noop_update() && !self.config.submit_empty_requests;
        let BuiltRequest {
            request,
            mut advisories,
        } = built;

        if skip_noop {
            warn!(
                object_type = %request.object_type,
                target_id = ?request.target,
                "skipping no-op update request"
            );
            return Ok(ApplyOutcome::Skipped { advisories });
        }

        let request = match guard.filter(request).await? {
            GuardOutcome::Pass {
                request,
                advisories: guard_advisories,
            } => {
                advisories.extend(guard_advisories);
                request
            }
            GuardOutcome::Suppressed { existing, advisory } => {
                advisories.push(advisory);
                return Ok(ApplyOutcome::SuppressedDuplicate {
                    existing,
                    advisories,
                });
            }
        };

        let outcome = self.service.submit(&request).await?;
        let target = request.target.or(outcome.target);
        info!(
            request_id = %outcome.request_id,
            object_type = %request.object_type,
            state = %request.state,
            target_id = ?target,
            "request submitted"
        );

        if self.config.wait_for_completion {
            if let Some(target) = target {
                self.waiter().wait(target).await?;
            }
        }

        Ok(ApplyOutcome::Submitted {
            request_id: outcome.request_id,
            target,
            advisories,
        })
    }
}
