//! Change request data model
//!
//! The normalized request shape handed to the service: anchor pairs that
//! locate an object, and change entries that mutate its attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ObjectId;
use crate::types::{ChangeOperation, RequestState};

/// Locale used for change entries that do not carry a specific culture.
pub const INVARIANT_LOCALE: &str = "Invariant";

/// Value carried by a change entry.
///
/// A `Reference` value names another object by a (type, attribute, value)
/// triple and must be resolved to a durable identifier before the request
/// is submitted; the builder performs that resolution at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeValue {
    /// A plain scalar value.
    Literal(String),
    /// A cross-object reference to resolve before use.
    Reference {
        /// Schema type of the referenced object.
        object_type: String,
        /// Anchor attribute used to locate it.
        attribute: String,
        /// Anchor attribute value.
        value: String,
    },
}

impl ChangeValue {
    /// Create a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        ChangeValue::Literal(value.into())
    }

    /// Create a reference to resolve before use.
    pub fn reference(
        object_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ChangeValue::Reference {
            object_type: object_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Get the literal value, if this is not a reference.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            ChangeValue::Literal(s) => Some(s),
            ChangeValue::Reference { .. } => None,
        }
    }

    /// Check if this value still needs resolution.
    pub fn is_reference(&self) -> bool {
        matches!(self, ChangeValue::Reference { .. })
    }
}

impl From<String> for ChangeValue {
    fn from(s: String) -> Self {
        ChangeValue::Literal(s)
    }
}

impl From<&str> for ChangeValue {
    fn from(s: &str) -> Self {
        ChangeValue::Literal(s.to_string())
    }
}

impl From<ObjectId> for ChangeValue {
    fn from(id: ObjectId) -> Self {
        ChangeValue::Literal(id.to_string())
    }
}

/// One attribute mutation within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Name of the attribute to mutate.
    pub attribute: String,
    /// Proposed value.
    pub value: ChangeValue,
    /// Mutation operation.
    pub operation: ChangeOperation,
    /// Whether multi-valued resolution is already complete.
    #[serde(default = "default_fully_resolved")]
    pub fully_resolved: bool,
    /// Locale the value applies to.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_fully_resolved() -> bool {
    true
}

fn default_locale() -> String {
    INVARIANT_LOCALE.to_string()
}

impl Change {
    /// Create a change with an explicit operation.
    pub fn new(
        attribute: impl Into<String>,
        value: impl Into<ChangeValue>,
        operation: ChangeOperation,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            operation,
            fully_resolved: true,
            locale: INVARIANT_LOCALE.to_string(),
        }
    }

    /// Create an `Add` change.
    pub fn add(attribute: impl Into<String>, value: impl Into<ChangeValue>) -> Self {
        Self::new(attribute, value, ChangeOperation::Add)
    }

    /// Create a `Replace` change.
    pub fn replace(attribute: impl Into<String>, value: impl Into<ChangeValue>) -> Self {
        Self::new(attribute, value, ChangeOperation::Replace)
    }

    /// Create a `Delete` change.
    pub fn delete(attribute: impl Into<String>, value: impl Into<ChangeValue>) -> Self {
        Self::new(attribute, value, ChangeOperation::Delete)
    }

    /// Create an initial-value change (operation `None`) for create requests.
    pub fn initial(attribute: impl Into<String>, value: impl Into<ChangeValue>) -> Self {
        Self::new(attribute, value, ChangeOperation::None)
    }

    /// Set the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Mark multi-valued resolution as incomplete.
    #[must_use]
    pub fn with_fully_resolved(mut self, fully_resolved: bool) -> Self {
        self.fully_resolved = fully_resolved;
        self
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ChangeValue::Literal(v) => write!(f, "{} {}={}", self.operation, self.attribute, v),
            ChangeValue::Reference {
                object_type,
                attribute,
                value,
            } => write!(
                f,
                "{} {}=ref({object_type}/{attribute}={value})",
                self.operation, self.attribute
            ),
        }
    }
}

/// Attribute name/value pair used to locate an existing object.
///
/// Uniqueness across a request is the caller's responsibility; exactly one
/// anchor pair is the precondition for automatic target resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPair {
    /// Anchor attribute name.
    pub attribute: String,
    /// Anchor attribute value.
    pub value: String,
}

impl AnchorPair {
    /// Create a new anchor pair.
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for AnchorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Normalized description of a create/update/delete/resolve operation
/// against one object.
///
/// A request is built once, mutated only by duplicate suppression before
/// submission, and immutable after being handed to the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Case-sensitive schema type of the target object.
    pub object_type: String,
    /// Lifecycle state of the request.
    pub state: RequestState,
    /// Identifier of the requesting object, when the service tracks one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ObjectId>,
    /// Identifier of the object being addressed. Populated by anchor
    /// resolution for `Put` and `Delete`, and by the service for `Resolve`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ObjectId>,
    /// Anchor pairs locating the object.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<AnchorPair>,
    /// Ordered attribute mutations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
}

impl ChangeRequest {
    /// Create an empty request in the given state.
    pub fn new(object_type: impl Into<String>, state: RequestState) -> Self {
        Self {
            object_type: object_type.into(),
            state,
            source: None,
            target: None,
            anchors: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Create a `Resolve`-state request with a single anchor pair.
    pub fn resolve(object_type: impl Into<String>, anchor: AnchorPair) -> Self {
        Self::new(object_type, RequestState::Resolve).with_anchor(anchor)
    }

    /// Append an anchor pair.
    #[must_use]
    pub fn with_anchor(mut self, anchor: AnchorPair) -> Self {
        self.anchors.push(anchor);
        self
    }

    /// Append a change entry.
    #[must_use]
    pub fn with_change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    /// Set the source identifier.
    #[must_use]
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target identifier.
    #[must_use]
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    /// Get the anchor pair when exactly one is present.
    pub fn single_anchor(&self) -> Option<&AnchorPair> {
        match self.anchors.as_slice() {
            [anchor] => Some(anchor),
            _ => None,
        }
    }

    /// Get the first literal value proposed for an attribute, if any.
    ///
    /// Used by duplicate detection to pull an anchor value out of the change
    /// list of a create request.
    pub fn change_value(&self, attribute: &str) -> Option<&str> {
        self.changes
            .iter()
            .find(|c| c.attribute == attribute)
            .and_then(|c| c.value.as_literal())
    }

    /// Check whether the request carries any change entries.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

impl fmt::Display for ChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} anchor(s), {} change(s))",
            self.state,
            self.object_type,
            self.anchors.len(),
            self.changes.len()
        )
    }
}
