//! Events dispatched on elements.
//!
//! The runtime only dispatches a handful of events, so the payload is a
//! closed [`EventDetail`] enum rather than an open `Any` box.

use std::rc::Rc;

use super::element::Element;
use crate::error::ErrorReport;
use crate::slots::SlotValidationResult;

/// Fired after `on_ready` completes.
pub const READY_EVENT: &str = "ready";
/// Fired for every reported (non-thrown) error.
pub const ERROR_EVENT: &str = "component-error";
/// Fired when slot content fails validation.
pub const SLOT_VALIDATION_EVENT: &str = "slot-validation";
/// Fired when the elements assigned to a slot change.
pub const SLOTCHANGE_EVENT: &str = "slotchange";

/// Event listener callback.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Event payload.
#[derive(Debug, Clone)]
pub enum EventDetail {
    /// No payload.
    None,
    /// `ready`: the shadow root and the mounted component element.
    Ready {
        shadow_root: Element,
        component: Option<Element>,
    },
    /// `component-error`.
    Error(ErrorReport),
    /// `slot-validation`.
    SlotValidation(SlotValidationResult),
    /// `slotchange`: which slot and how many elements it now holds.
    SlotChange { slot: String, assigned: usize },
}

/// A dispatched event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Element the event was dispatched on.
    pub target: Element,
    /// Payload.
    pub detail: EventDetail,
}

impl Event {
    /// The error report, for `component-error` events.
    pub fn error(&self) -> Option<&ErrorReport> {
        match &self.detail {
            EventDetail::Error(report) => Some(report),
            _ => None,
        }
    }
}
