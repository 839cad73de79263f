//! Component hosts: the per-instance runtime behind an upgraded element.
//!
//! A [`ComponentHost`] owns the reactive property state, the update
//! scheduler, the controller set and the lifecycle state of one element.
//! The platform drives it through [`ComponentHost::attribute_changed_callback`],
//! [`ComponentHost::connected_callback`] and
//! [`ComponentHost::disconnected_callback`].

pub mod definition;
pub mod hooks;
pub mod lifecycle;

pub use definition::{ComponentDefinition, ComponentFactory, DefinitionBuilder, Rendered};
pub use hooks::{AsyncConnectHook, ConnectHook, HookFuture, LifecycleHooks, UpdateHook};
pub use lifecycle::LifecyclePhase;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::error;

use crate::config::RuntimeConfig;
use crate::controller::ControllerRegistry;
use crate::dom::{Element, EventDetail, ERROR_EVENT};
use crate::error::ErrorReport;
use crate::reactive::properties::ReactiveState;
use crate::reactive::{UpdateComplete, UpdateScheduler};
use crate::slots::SlotChangeHandler;
use crate::styles::StyleOptions;
use crate::task::TaskQueue;

pub(crate) struct HostInner {
    pub(crate) definition: Rc<ComponentDefinition>,
    pub(crate) element: Element,
    pub(crate) shadow_root: Option<Element>,
    pub(crate) queue: Rc<dyn TaskQueue>,
    pub(crate) config: RuntimeConfig,
    pub(crate) scheduler: UpdateScheduler,
    pub(crate) state: RefCell<ReactiveState>,
    pub(crate) controllers: RefCell<ControllerRegistry>,
    pub(crate) phase: Cell<LifecyclePhase>,
    pub(crate) connected: Cell<bool>,
    /// Set on the first connection and never cleared.
    pub(crate) has_connected: Cell<bool>,
    /// An update flush is running.
    pub(crate) updating: Cell<bool>,
    /// Bumped on every connection so stale async tails can tell they are stale.
    pub(crate) generation: Cell<u64>,
    pub(crate) component: RefCell<Option<Element>>,
    pub(crate) slot_handlers: RefCell<Vec<SlotChangeHandler>>,
    pub(crate) teardowns: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Handle to a component instance. Cloning shares the instance.
#[derive(Clone)]
pub struct ComponentHost {
    pub(crate) inner: Rc<HostInner>,
}

impl ComponentHost {
    /// Construct the host for `element`: attach its shadow root, capture
    /// pre-upgrade properties and seed property values.
    pub(crate) fn new(
        definition: Rc<ComponentDefinition>,
        element: Element,
        queue: Rc<dyn TaskQueue>,
        config: &RuntimeConfig,
    ) -> Self {
        let shadow_root = element.attach_shadow();
        let inner = Rc::new_cyclic(|weak: &std::rc::Weak<HostInner>| {
            let weak = weak.clone();
            let scheduler = UpdateScheduler::new(queue.clone(), config.max_update_recursion, move || {
                weak.upgrade()
                    .map(|inner| ComponentHost { inner }.perform_update())
                    .unwrap_or(false)
            });
            HostInner {
                definition,
                element,
                shadow_root,
                queue,
                config: config.clone(),
                scheduler,
                state: RefCell::new(ReactiveState::default()),
                controllers: RefCell::new(ControllerRegistry::new()),
                phase: Cell::new(LifecyclePhase::Constructed),
                connected: Cell::new(false),
                has_connected: Cell::new(false),
                updating: Cell::new(false),
                generation: Cell::new(0),
                component: RefCell::new(None),
                slot_handlers: RefCell::new(Vec::new()),
                teardowns: RefCell::new(Vec::new()),
            }
        });
        let host = Self { inner };
        host.initialize_properties();
        host
    }

    /// The component definition.
    pub fn definition(&self) -> Rc<ComponentDefinition> {
        self.inner.definition.clone()
    }

    /// The component tag.
    pub fn tag(&self) -> &str {
        self.inner.definition.tag()
    }

    /// The host element.
    pub fn element(&self) -> Element {
        self.inner.element.clone()
    }

    /// The shadow root attached at construction.
    pub fn shadow_root(&self) -> Option<Element> {
        self.inner.shadow_root.clone()
    }

    /// The element mounted by the component factory, while connected.
    pub fn component(&self) -> Option<Element> {
        self.inner.component.borrow().clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.inner.phase.get()
    }

    /// Whether `connected_callback` ran more recently than
    /// `disconnected_callback`.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.get()
    }

    /// Whether an update flush is currently running.
    pub fn is_updating(&self) -> bool {
        self.inner.updating.get()
    }

    /// Whether a flush is queued.
    pub fn is_update_pending(&self) -> bool {
        self.inner.scheduler.is_pending()
    }

    /// Number of update flushes run so far.
    pub fn update_count(&self) -> u64 {
        self.inner.scheduler.flush_count()
    }

    /// Resolves after the pending update (chain) settles: `true` on
    /// success, `false` if a hook failed or the recursion ceiling was hit.
    pub fn update_complete(&self) -> UpdateComplete {
        self.inner.scheduler.update_complete()
    }

    /// Whether the platform should deliver attribute changes for `name`.
    pub fn observes(&self, name: &str) -> bool {
        self.inner
            .definition
            .observed_attributes()
            .iter()
            .any(|n| n == name)
    }

    /// Runtime configuration this host was created with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub(crate) fn style_options(&self) -> StyleOptions {
        self.inner
            .definition
            .style_options()
            .cloned()
            .unwrap_or_else(|| StyleOptions::from_config(&self.inner.config))
    }

    /// Log `report` and dispatch it as a `component-error` event.
    pub fn report(&self, report: ErrorReport) {
        error!(
            tag = %self.tag(),
            kind = report.kind.as_str(),
            details = %report.details,
            "{}",
            report.message
        );
        self.inner
            .element
            .dispatch_event(ERROR_EVENT, EventDetail::Error(report));
    }
}

impl PartialEq for ComponentHost {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ComponentHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHost")
            .field("tag", &self.tag())
            .field("element", &self.inner.element.id())
            .field("phase", &self.phase())
            .field("connected", &self.is_connected())
            .field("scheduler", &self.inner.scheduler)
            .field("controllers", &*self.inner.controllers.borrow())
            .finish_non_exhaustive()
    }
}
