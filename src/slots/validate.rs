//! Slot validation and slot change detection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::schema::{SlotConfig, SlotSchema};
use crate::dom::{Element, NodeId};

/// Key of the unnamed slot in a [`SlotSchema`].
pub const DEFAULT_SLOT: &str = "default";

/// Light-DOM children of `host` assigned to `slot`.
///
/// A child belongs to slot `name` when its `slot` attribute equals `name`;
/// children without a `slot` attribute belong to [`DEFAULT_SLOT`].
pub fn slotted_elements(host: &Element, slot: &str) -> Vec<Element> {
    host.children()
        .into_iter()
        .filter(|child| match child.get_attribute("slot") {
            Some(name) => name == slot,
            None => slot == DEFAULT_SLOT,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A problem with one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotError {
    /// Slot key.
    pub slot: String,
    /// What is wrong.
    pub message: String,
}

impl SlotError {
    fn new(slot: &str, message: impl Into<String>) -> Self {
        Self {
            slot: slot.to_owned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot `{}`: {}", self.slot, self.message)
    }
}

/// Outcome of validating a host's slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValidationResult {
    /// No errors (warnings allowed).
    pub is_valid: bool,
    /// Constraint violations.
    pub errors: Vec<SlotError>,
    /// Deprecations and unknown slot names.
    pub warnings: Vec<SlotError>,
}

impl SlotValidationResult {
    /// Whether there is nothing to report.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validate one slot's content against its config.
pub fn validate_slot(host: &Element, slot: &str, config: &SlotConfig) -> SlotValidationResult {
    let elements = slotted_elements(host, slot);
    let count = elements.len();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.required && count == 0 {
        errors.push(SlotError::new(slot, "is required but empty"));
    }
    if let Some(min) = config.min_items {
        if count < min {
            errors.push(SlotError::new(slot, format!("needs at least {min} items, has {count}")));
        }
    }
    if let Some(max) = config.max_items {
        if count > max {
            errors.push(SlotError::new(slot, format!("allows at most {max} items, has {count}")));
        }
    }
    for element in &elements {
        let tag = element.tag();
        if !config.allowed_elements.is_empty() && !config.allowed_elements.contains(&tag) {
            errors.push(SlotError::new(slot, format!("<{tag}> is not allowed")));
        }
        if config.disallowed_elements.contains(&tag) {
            errors.push(SlotError::new(slot, format!("<{tag}> is disallowed")));
        }
    }
    if let Some(validate) = &config.validate {
        if let Err(message) = validate(&elements) {
            errors.push(SlotError::new(slot, message));
        }
    }
    if let Some(notice) = &config.deprecated {
        if count > 0 {
            warnings.push(SlotError::new(slot, format!("is deprecated: {notice}")));
        }
    }

    SlotValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Validate every slot in `schema`.
///
/// Children assigned to a slot name the schema does not declare produce a
/// warning. An empty schema accepts anything.
pub fn validate_all_slots(host: &Element, schema: &SlotSchema) -> SlotValidationResult {
    let mut result = SlotValidationResult {
        is_valid: true,
        ..Default::default()
    };
    if schema.is_empty() {
        return result;
    }
    for (slot, config) in schema.iter() {
        let slot_result = validate_slot(host, slot, config);
        result.errors.extend(slot_result.errors);
        result.warnings.extend(slot_result.warnings);
    }
    for child in host.children() {
        let slot = child
            .get_attribute("slot")
            .unwrap_or_else(|| DEFAULT_SLOT.to_owned());
        let already = result
            .warnings
            .iter()
            .any(|w| w.slot == slot && w.message.starts_with("is not declared"));
        if !schema.contains(&slot) && !already {
            result
                .warnings
                .push(SlotError::new(&slot, "is not declared by this component"));
        }
    }
    result.is_valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Slot change handlers
// ---------------------------------------------------------------------------

/// Callback for [`SlotChangeHandler`]: `(slot, assigned elements)`.
pub type SlotChangeCallback = Rc<dyn Fn(&str, &[Element])>;

/// Watches one slot's assignment and calls back when it changes.
#[derive(Clone)]
pub struct SlotChangeHandler {
    slot: String,
    assigned: Rc<RefCell<Vec<NodeId>>>,
    callback: SlotChangeCallback,
}

impl SlotChangeHandler {
    /// The watched slot.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Record the current assignment without calling back.
    pub fn prime(&self, host: &Element) {
        *self.assigned.borrow_mut() = Self::ids(&slotted_elements(host, &self.slot));
    }

    /// Re-read the assignment; call back and return `true` if it changed.
    pub fn handle(&self, host: &Element) -> bool {
        let elements = slotted_elements(host, &self.slot);
        let ids = Self::ids(&elements);
        if *self.assigned.borrow() == ids {
            return false;
        }
        *self.assigned.borrow_mut() = ids;
        (self.callback)(&self.slot, &elements);
        true
    }

    fn ids(elements: &[Element]) -> Vec<NodeId> {
        elements.iter().map(Element::id).collect()
    }
}

impl fmt::Debug for SlotChangeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotChangeHandler")
            .field("slot", &self.slot)
            .field("assigned", &self.assigned.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Create a handler that calls `callback` whenever `slot`'s assignment
/// changes.
pub fn create_slotchange_handler(
    slot: impl Into<String>,
    callback: impl Fn(&str, &[Element]) + 'static,
) -> SlotChangeHandler {
    SlotChangeHandler {
        slot: slot.into(),
        assigned: Rc::default(),
        callback: Rc::new(callback),
    }
}
