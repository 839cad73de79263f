//! Harness: a headless document driven by a manual task queue.
//!
//! The `Harness` owns a [`Document`] whose microtasks only run when the
//! test calls [`Harness::settle`], so every step of a component's
//! lifecycle can be observed. Elements created through the harness record
//! the runtime's events (`ready`, `component-error`, `slot-validation`,
//! `slotchange`).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::dom::{
    Document, Element, Event, ERROR_EVENT, READY_EVENT, SLOTCHANGE_EVENT, SLOT_VALIDATION_EVENT,
};
use crate::error::{ErrorReport, RegistryError};
use crate::host::{ComponentDefinition, ComponentHost};
use crate::registry::CustomElementRegistry;
use crate::task::{ManualTaskQueue, TaskQueue};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A headless component runtime for tests.
///
/// # Examples
///
/// ```ignore
/// use gilt_elements::testing::Harness;
///
/// let harness = Harness::new();
/// harness.define(definition).unwrap();
/// let el = harness.mount("x-counter");
/// harness.settle();
/// assert_eq!(harness.events_named("ready").len(), 1);
/// ```
pub struct Harness {
    document: Document,
    queue: ManualTaskQueue,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Harness {
    /// Harness with the default config.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Harness with a custom config.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let queue = ManualTaskQueue::new();
        let document = Document::with_registry(
            CustomElementRegistry::new(),
            Rc::new(queue.clone()),
            config,
        );
        Self {
            document,
            queue,
            events: Rc::default(),
        }
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The task queue.
    pub fn queue(&self) -> &ManualTaskQueue {
        &self.queue
    }

    /// Define a component in the harness document.
    pub fn define(&self, definition: Rc<ComponentDefinition>) -> Result<(), RegistryError> {
        self.document.define(definition)
    }

    /// Create a detached element that records runtime events.
    pub fn create(&self, tag: &str) -> Element {
        let element = self.document.create_element(tag);
        self.record_events(&element);
        element
    }

    /// Create an element and append it to `<body>`.
    pub fn mount(&self, tag: &str) -> Element {
        let element = self.create(tag);
        self.document.body().append_child(&element);
        element
    }

    /// The host behind `element`.
    pub fn host(&self, element: &Element) -> Option<ComponentHost> {
        element.host()
    }

    /// Record runtime events dispatched on `element`.
    pub fn record_events(&self, element: &Element) {
        for name in [READY_EVENT, ERROR_EVENT, SLOT_VALIDATION_EVENT, SLOTCHANGE_EVENT] {
            let events = self.events.clone();
            element.add_event_listener(name, move |event| events.borrow_mut().push(event.clone()));
        }
    }

    // ── Driving ──────────────────────────────────────────────────────

    /// Run queued microtasks until all are stalled. Returns how many finished.
    pub fn settle(&self) -> usize {
        self.queue.run_until_idle()
    }

    /// Await `host.update_complete()` on the queue and settle.
    ///
    /// `None` if the future is still pending once the queue is idle.
    pub fn update_complete(&self, host: &ComponentHost) -> Option<bool> {
        let result = Rc::new(Cell::new(None));
        let slot = result.clone();
        let complete = host.update_complete();
        self.queue.spawn(Box::pin(async move {
            slot.set(Some(complete.await));
        }));
        self.settle();
        result.get()
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Every recorded event, in dispatch order.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Recorded events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Recorded `component-error` reports.
    pub fn errors(&self) -> Vec<ErrorReport> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.error().cloned())
            .collect()
    }

    /// Forget recorded events.
    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("document", &self.document)
            .field("queue", &self.queue)
            .field("events", &self.events.borrow().len())
            .finish()
    }
}
