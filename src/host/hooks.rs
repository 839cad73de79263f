//! Lifecycle hook callbacks supplied by component authors.
//!
//! Connect hooks receive the host and its shadow root. `first_connected`
//! and `will_first_update` are synchronous; `before_connect`,
//! `after_connect` and `on_ready` return futures and run, in that order, on
//! the task queue after the synchronous part of `connected_callback`.
//! Update hooks receive the changed-properties batch of the flush.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::dom::Element;
use crate::error::HookResult;
use crate::host::ComponentHost;
use crate::reactive::ChangedProperties;

/// Future returned by async connect hooks.
pub type HookFuture = Pin<Box<dyn Future<Output = HookResult>>>;

/// Synchronous connect hook: `(host, shadow root)`.
pub type ConnectHook = Rc<dyn Fn(&ComponentHost, &Element) -> HookResult>;

/// Async connect hook: `(host, shadow root)`.
pub type AsyncConnectHook = Rc<dyn Fn(ComponentHost, Element) -> HookFuture>;

/// Update hook: `(host, changed properties)`.
pub type UpdateHook = Rc<dyn Fn(&ComponentHost, &ChangedProperties) -> HookResult>;

/// The optional hooks of a component.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// First connection only.
    pub first_connected: Option<ConnectHook>,
    /// First connection only, after `first_connected` and before the
    /// component factory renders.
    pub will_first_update: Option<ConnectHook>,
    /// Every connection; first of the queued async hooks.
    pub before_connect: Option<AsyncConnectHook>,
    /// Every connection, once `before_connect` has settled.
    pub after_connect: Option<AsyncConnectHook>,
    /// Last async hook; the ready event follows it.
    pub on_ready: Option<AsyncConnectHook>,
    /// Runs in each flush once controllers have seen `host_update`.
    pub will_update: Option<UpdateHook>,
    /// Between `will_update` and `updated`.
    pub update: Option<UpdateHook>,
    /// End of a flush. Writes made here schedule another one.
    pub updated: Option<UpdateHook>,
}

fn async_hook<F, Fut>(f: F) -> AsyncConnectHook
where
    F: Fn(ComponentHost, Element) -> Fut + 'static,
    Fut: Future<Output = HookResult> + 'static,
{
    Rc::new(move |host, shadow| Box::pin(f(host, shadow)) as HookFuture)
}

impl LifecycleHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs on the first connection only, before `will_first_update`.
    pub fn first_connected(
        mut self,
        f: impl Fn(&ComponentHost, &Element) -> HookResult + 'static,
    ) -> Self {
        self.first_connected = Some(Rc::new(f));
        self
    }

    /// Runs on the first connection only, before the component is created.
    pub fn will_first_update(
        mut self,
        f: impl Fn(&ComponentHost, &Element) -> HookResult + 'static,
    ) -> Self {
        self.will_first_update = Some(Rc::new(f));
        self
    }

    /// First async hook after every connection.
    pub fn before_connect<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ComponentHost, Element) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.before_connect = Some(async_hook(f));
        self
    }

    /// Second async hook after every connection.
    pub fn after_connect<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ComponentHost, Element) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.after_connect = Some(async_hook(f));
        self
    }

    /// Last async hook; `ready` is dispatched after it completes.
    pub fn on_ready<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ComponentHost, Element) -> Fut + 'static,
        Fut: Future<Output = HookResult> + 'static,
    {
        self.on_ready = Some(async_hook(f));
        self
    }

    /// Runs first in every update flush.
    pub fn will_update(
        mut self,
        f: impl Fn(&ComponentHost, &ChangedProperties) -> HookResult + 'static,
    ) -> Self {
        self.will_update = Some(Rc::new(f));
        self
    }

    /// Runs second in every update flush.
    pub fn update(
        mut self,
        f: impl Fn(&ComponentHost, &ChangedProperties) -> HookResult + 'static,
    ) -> Self {
        self.update = Some(Rc::new(f));
        self
    }

    /// Runs last in every update flush.
    pub fn updated(
        mut self,
        f: impl Fn(&ComponentHost, &ChangedProperties) -> HookResult + 'static,
    ) -> Self {
        self.updated = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("first_connected", &self.first_connected.is_some())
            .field("will_first_update", &self.will_first_update.is_some())
            .field("before_connect", &self.before_connect.is_some())
            .field("after_connect", &self.after_connect.is_some())
            .field("on_ready", &self.on_ready.is_some())
            .field("will_update", &self.will_update.is_some())
            .field("update", &self.update.is_some())
            .field("updated", &self.updated.is_some())
            .finish()
    }
}
