//! # Request Pipeline
//!
//! Change-request construction and idempotent apply against an external
//! identity service.
//!
//! The pipeline takes loosely shaped change intent, normalizes it into a
//! [`ChangeRequest`], resolves anchors and cross-object references to
//! durable identifiers, suppresses duplicate mutations against the current
//! remote state, and polls the service until submitted requests reach a
//! terminal status.
//!
//! ## Architecture
//!
//! ```text
//! caller intent ──► ChangeRequestBuilder ──► DuplicateGuard ──► submit
//!                        │    │                   │               │
//!                        │    └── Resolver ◄──────┘               ▼
//!                        │         (anchors, references,   CompletionWaiter
//!                        │          existence checks)      (poll to terminal)
//!                        └── snapshot read (duplicate-value suppression)
//! ```
//!
//! Everything is synchronous-in-order: a request is built, filtered, then
//! handed off linearly. The service is the only source of truth; snapshot
//! based suppression decisions are advisory and may be stale by submission
//! time.
//!
//! ## Example
//!
//! ```ignore
//! use portico_requests::prelude::*;
//! use portico_service::prelude::*;
//!
//! let pipeline = RequestPipeline::new(service);
//!
//! let built = pipeline
//!     .builder()
//!     .build(
//!         "Person",
//!         RequestState::Create,
//!         AnchorsInput::empty(),
//!         vec![("AccountName", "bob"), ("DisplayName", "Bob the Builder")],
//!     )
//!     .await?;
//!
//! match pipeline.apply(built).await? {
//!     ApplyOutcome::Submitted { request_id, .. } => println!("submitted {request_id}"),
//!     ApplyOutcome::SuppressedDuplicate { existing, .. } => println!("already exists: {existing}"),
//!     ApplyOutcome::Skipped { .. } => println!("nothing to do"),
//! }
//! ```
//!
//! [`ChangeRequest`]: portico_service::model::ChangeRequest

pub mod advisory;
pub mod builder;
pub mod config;
pub mod error;
pub mod guard;
pub mod pipeline;
pub mod resolver;
pub mod waiter;

pub use advisory::Advisory;
pub use builder::{AnchorsInput, BuiltRequest, ChangeRequestBuilder, ChangesInput};
pub use config::{PipelineConfig, WaiterConfig};
pub use error::{RequestError, RequestResult};
pub use guard::{DuplicateGuard, GuardOutcome, DEFAULT_GUARD_ANCHOR};
pub use pipeline::{ApplyOutcome, RequestPipeline};
pub use resolver::Resolver;
pub use waiter::{CancelHandle, CompletionWaiter, WaitOutcome};

/// Prelude module for convenient imports.
///
/// ```
/// use portico_requests::prelude::*;
/// ```
pub mod prelude {
    pub use crate::advisory::Advisory;
    pub use crate::builder::{AnchorsInput, BuiltRequest, ChangeRequestBuilder, ChangesInput};
    pub use crate::config::{PipelineConfig, WaiterConfig};
    pub use crate::error::{RequestError, RequestResult};
    pub use crate::guard::{DuplicateGuard, GuardOutcome};
    pub use crate::pipeline::{ApplyOutcome, RequestPipeline};
    pub use crate::resolver::Resolver;
    pub use crate::waiter::{CancelHandle, CompletionWaiter, WaitOutcome};
}
