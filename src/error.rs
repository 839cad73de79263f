//! Error taxonomy.
//!
//! Errors from programmatic property writes are returned to the caller as
//! [`PropertyError`]. Errors from platform-driven callbacks (attribute
//! changes, lifecycle hooks, controllers, the update flush) cannot be handed
//! back to anyone, so the host converts them into an [`ErrorReport`], logs
//! it, and dispatches it as a `component-error` event.

use serde_json::Value as JsonValue;

/// Boxed error returned by user-supplied hooks, controllers and factories.
pub type HookError = Box<dyn std::error::Error + 'static>;

/// Result type for user-supplied callbacks.
pub type HookResult = Result<(), HookError>;

// ---------------------------------------------------------------------------
// Attribute errors
// ---------------------------------------------------------------------------

/// An attribute string could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeTypeError {
    /// Empty or non-numeric text for a `number` attribute.
    #[error("attribute `{attribute}` expects a number, got {value:?}")]
    InvalidNumber { attribute: String, value: String },
    /// Text that is not valid JSON for an `object`/`array` attribute.
    #[error("attribute `{attribute}` expects JSON: {message}")]
    InvalidJson { attribute: String, message: String },
    /// Valid JSON that is not an array for an `array` attribute.
    #[error("attribute `{attribute}` expects a JSON array, got {found}")]
    NotAnArray { attribute: String, found: String },
    /// Failure reported by a custom converter.
    #[error("attribute `{attribute}`: {message}")]
    Custom { attribute: String, message: String },
}

impl AttributeTypeError {
    /// The attribute the conversion failed for.
    pub fn attribute(&self) -> &str {
        match self {
            AttributeTypeError::InvalidNumber { attribute, .. }
            | AttributeTypeError::InvalidJson { attribute, .. }
            | AttributeTypeError::NotAnArray { attribute, .. }
            | AttributeTypeError::Custom { attribute, .. } => attribute,
        }
    }
}

/// A validator rejected a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("<{tag}> `{attribute}` rejected {value}: {constraint}")]
pub struct AttributeValidationError {
    /// Tag of the component that owns the property.
    pub tag: String,
    /// Attribute name, or the property name when the property has no attribute.
    pub attribute: String,
    /// The constraint reported by the validator.
    pub constraint: String,
    /// Display form of the rejected value.
    pub value: String,
}

/// Error returned from a programmatic property write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// The value failed validation; nothing was mutated.
    #[error(transparent)]
    Validation(#[from] AttributeValidationError),
    /// The component declares no reactive property with this name.
    #[error("<{tag}> has no reactive property `{name}`")]
    UnknownProperty { tag: String, name: String },
}

// ---------------------------------------------------------------------------
// Component and registry errors
// ---------------------------------------------------------------------------

/// The component factory failed or returned an unusable result.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// The factory returned an element that does not exist in the document.
    #[error("component factory for <{tag}> returned no element")]
    MissingElement { tag: String },
    /// The factory itself returned an error.
    #[error("component factory for <{tag}> failed: {source}")]
    Factory {
        tag: String,
        #[source]
        source: HookError,
    },
}

/// Custom element registration failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A definition for this tag already exists.
    #[error("<{0}> is already defined")]
    AlreadyDefined(String),
    /// Custom element names need a lowercase first letter and a hyphen.
    #[error("`{0}` is not a valid custom element name")]
    InvalidName(String),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Category of a reported (non-thrown) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Attribute text failed conversion.
    AttributeType,
    /// Attribute or replayed property value failed validation.
    AttributeValidation,
    /// Component factory failed.
    ComponentCreation,
    /// A reactive controller hook returned an error.
    ControllerHook,
    /// A lifecycle hook returned an error.
    LifecycleHook,
    /// The update flush failed.
    UpdateCycle,
    /// Slot content does not satisfy the slot schema (a warning).
    SlotValidation,
}

impl ErrorKind {
    /// Stable identifier used in event payloads and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AttributeType => "attribute-type",
            ErrorKind::AttributeValidation => "attribute-validation",
            ErrorKind::ComponentCreation => "component-creation",
            ErrorKind::ControllerHook => "controller-hook",
            ErrorKind::LifecycleHook => "lifecycle-hook",
            ErrorKind::UpdateCycle => "update-cycle",
            ErrorKind::SlotValidation => "slot-validation",
        }
    }
}

/// Payload of a `component-error` event: `{type, message, details}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Structured context (tag, attribute, hook name, ...).
    pub details: JsonValue,
}

impl ErrorReport {
    /// Create a report.
    pub fn new(kind: ErrorKind, message: impl Into<String>, details: JsonValue) -> Self {
        Self {
            kind,
            message: message.into(),
            details,
        }
    }
}
