//! Advisory diagnostics
//!
//! Non-fatal signals emitted when the pipeline suppresses or rewrites part
//! of a request. Every advisory is also logged at warning level where the
//! decision is made, so operators can audit why a request was or wasn't
//! submitted.
//!
//! Suppression decisions are based on a snapshot read that may be stale by
//! submission time. That race is accepted: advisories surface it, and it is
//! never escalated to a hard failure.

use serde::{Deserialize, Serialize};
use std::fmt;

use portico_service::ids::ObjectId;

/// Non-fatal pipeline decision worth surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Advisory {
    /// An additive change was dropped because the target already carries
    /// the proposed value.
    DuplicateValueSkipped {
        attribute: String,
        value: String,
    },

    /// After suppression the request carries no changes; submitting it
    /// would be a no-op.
    EmptyRequest { object_type: String },

    /// The duplicate guard could not find its anchor attribute in the
    /// request's changes; duplicates cannot be detected, the request passes
    /// through unchanged.
    MissingGuardAnchor { attribute: String },

    /// An object equivalent to the one being created already exists;
    /// submission was suppressed.
    DuplicateObject {
        object_type: String,
        attribute: String,
        value: String,
        existing: ObjectId,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::DuplicateValueSkipped { attribute, value } => {
                write!(f, "skipped add of {attribute}={value}: value already present")
            }
            Advisory::EmptyRequest { object_type } => {
                write!(f, "request against {object_type} carries no changes")
            }
            Advisory::MissingGuardAnchor { attribute } => {
                write!(f, "cannot detect duplicates without anchor attribute {attribute}")
            }
            Advisory::DuplicateObject {
                object_type,
                attribute,
                value,
                existing,
            } => write!(
                f,
                "{object_type} with {attribute}={value} already exists as {existing}; creation suppressed"
            ),
        }
    }
}
