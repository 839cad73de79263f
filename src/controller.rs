//! Reactive controllers: pluggable participants in a host's lifecycle.
//!
//! A controller is notified when its host connects, disconnects, and
//! around every update flush. Dispatch iterates a snapshot of the
//! registered set and re-checks membership before each call, so controllers
//! may add or remove controllers (including themselves) mid-dispatch. An
//! error from one controller is reported and the loop continues.

use std::fmt;
use std::rc::Rc;

use serde_json::json;
use tracing::trace;

use crate::error::{ErrorKind, ErrorReport, HookResult};
use crate::host::ComponentHost;

// ---------------------------------------------------------------------------
// ReactiveController trait
// ---------------------------------------------------------------------------

/// A lifecycle participant attached to a [`ComponentHost`].
///
/// Every hook defaults to doing nothing.
pub trait ReactiveController {
    /// The host was connected (or the controller was added to a connected
    /// host).
    fn host_connected(&self, _host: &ComponentHost) -> HookResult {
        Ok(())
    }

    /// The host was disconnected.
    fn host_disconnected(&self, _host: &ComponentHost) -> HookResult {
        Ok(())
    }

    /// An update flush is about to run the host's update hooks.
    fn host_update(&self, _host: &ComponentHost) -> HookResult {
        Ok(())
    }

    /// An update flush finished the host's update hooks.
    fn host_updated(&self, _host: &ComponentHost) -> HookResult {
        Ok(())
    }
}

/// Which controller hook is being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerHook {
    Connected,
    Disconnected,
    Update,
    Updated,
}

impl ControllerHook {
    /// Hook name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerHook::Connected => "hostConnected",
            ControllerHook::Disconnected => "hostDisconnected",
            ControllerHook::Update => "hostUpdate",
            ControllerHook::Updated => "hostUpdated",
        }
    }

    fn call(self, controller: &dyn ReactiveController, host: &ComponentHost) -> HookResult {
        match self {
            ControllerHook::Connected => controller.host_connected(host),
            ControllerHook::Disconnected => controller.host_disconnected(host),
            ControllerHook::Update => controller.host_update(host),
            ControllerHook::Updated => controller.host_updated(host),
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerRegistry
// ---------------------------------------------------------------------------

/// Insertion-ordered set of controllers, compared by identity.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    controllers: Vec<Rc<dyn ReactiveController>>,
}

fn same_controller<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl ControllerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a controller. Returns `false` if it is already registered.
    pub fn add(&mut self, controller: Rc<dyn ReactiveController>) -> bool {
        if self.contains(&controller) {
            return false;
        }
        self.controllers.push(controller);
        true
    }

    /// Remove a controller. Returns whether it was registered.
    pub fn remove<C: ReactiveController + ?Sized>(&mut self, controller: &Rc<C>) -> bool {
        let before = self.controllers.len();
        self.controllers.retain(|c| !same_controller(c, controller));
        self.controllers.len() != before
    }

    /// Whether `controller` is registered.
    pub fn contains<C: ReactiveController + ?Sized>(&self, controller: &Rc<C>) -> bool {
        self.controllers.iter().any(|c| same_controller(c, controller))
    }

    /// The registered controllers, for iteration outside a borrow.
    pub fn snapshot(&self) -> Vec<Rc<dyn ReactiveController>> {
        self.controllers.clone()
    }

    /// Number of controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Whether no controller is registered.
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("len", &self.controllers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Host integration
// ---------------------------------------------------------------------------

impl ComponentHost {
    /// Attach a controller. A connected host calls its `host_connected`
    /// right away. Adding a registered controller again does nothing.
    pub fn add_controller(&self, controller: Rc<dyn ReactiveController>) {
        let added = self.inner.controllers.borrow_mut().add(controller.clone());
        if added && self.is_connected() {
            self.call_controller(controller.as_ref(), ControllerHook::Connected);
        }
    }

    /// Detach a controller; it receives no further notifications.
    pub fn remove_controller<C: ReactiveController + ?Sized>(&self, controller: &Rc<C>) -> bool {
        self.inner.controllers.borrow_mut().remove(controller)
    }

    /// Whether `controller` is attached.
    pub fn has_controller<C: ReactiveController + ?Sized>(&self, controller: &Rc<C>) -> bool {
        self.inner.controllers.borrow().contains(controller)
    }

    /// Number of attached controllers.
    pub fn controller_count(&self) -> usize {
        self.inner.controllers.borrow().len()
    }

    /// Dispatch `hook` to every attached controller.
    pub(crate) fn notify_controllers(&self, hook: ControllerHook) {
        let snapshot = self.inner.controllers.borrow().snapshot();
        for controller in snapshot {
            // Removed by an earlier controller in this pass.
            if !self.has_controller(&controller) {
                continue;
            }
            self.call_controller(controller.as_ref(), hook);
        }
    }

    fn call_controller(&self, controller: &dyn ReactiveController, hook: ControllerHook) {
        trace!(tag = %self.tag(), hook = hook.as_str(), "controller hook");
        if let Err(err) = hook.call(controller, self) {
            self.report(ErrorReport::new(
                ErrorKind::ControllerHook,
                err.to_string(),
                json!({ "tag": self.tag(), "hook": hook.as_str() }),
            ));
        }
    }
}
