//! # Identity Service Boundary
//!
//! Types and traits for talking to an external identity-management service:
//! the normalized change-request model, type-safe identifiers, closed status
//! enums, and the [`IdentityService`] capability trait the request pipeline
//! is built against.
//!
//! The service itself (wire format, storage, authorization workflows)
//! is out of scope; implementations of [`IdentityService`]
//! adapt the actual product API to this capability set.
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`ObjectId`, `RequestId`)
//! - [`types`] - Closed enums (`RequestState`, `ChangeOperation`,
//!   `RequestStatus`, `FaultKind`)
//! - [`model`] - Request model (`Change`, `AnchorPair`, `ChangeRequest`)
//! - [`fault`] - Fault taxonomy with machine-checkable categories
//! - [`traits`] - The [`IdentityService`] capability trait and snapshots
//!
//! [`IdentityService`]: traits::IdentityService

pub mod fault;
pub mod ids;
pub mod model;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use portico_service::prelude::*;
/// ```
pub mod prelude {
    // IDs
    pub use crate::ids::{ObjectId, RequestId};

    // Types and enums
    pub use crate::types::{ChangeOperation, FaultKind, RequestState, RequestStatus};

    // Model
    pub use crate::model::{AnchorPair, Change, ChangeRequest, ChangeValue, INVARIANT_LOCALE};

    // Faults
    pub use crate::fault::{ServiceFault, ServiceResult};

    // Boundary
    pub use crate::traits::{
        IdentityService, ObjectQuery, ObjectSnapshot, RequestSnapshot, SubmissionOutcome,
    };
}

// Re-export async_trait for service implementors
pub use async_trait::async_trait;
