//! The lifecycle state machine: connection, mounting, slot observation and
//! the update flush.

use std::rc::Rc;

use serde_json::json;
use tracing::{debug, trace, warn};

use super::definition::Rendered;
use super::hooks::ConnectHook;
use super::ComponentHost;
use crate::controller::ControllerHook;
use crate::dom::{Element, EventDetail, READY_EVENT, SLOTCHANGE_EVENT, SLOT_VALIDATION_EVENT};
use crate::error::{ComponentError, ErrorKind, ErrorReport, HookError};
use crate::slots::{create_slotchange_handler, validate_all_slots, SlotChangeHandler, SlotValidationResult};
use crate::styles::compile_styles;

/// Where a host is in its lifecycle.
///
/// Phases advance monotonically through one connection. Reconnecting
/// starts again at `Upgraded` and skips the first-connection phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Host constructed; not yet connected.
    Constructed,
    /// Connected and pre-upgrade values replayed.
    Upgraded,
    /// `first_connected` ran (first connection only).
    FirstConnected,
    /// `will_first_update` ran (first connection only).
    WillFirstUpdate,
    /// The factory returned a usable element.
    ComponentCreated,
    /// The element and its styles are in the shadow root.
    Mounted,
    /// Async connect hooks finished and `ready` was dispatched.
    Ready,
    /// Disconnected. Property values are kept.
    Disconnected,
}

impl LifecyclePhase {
    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Constructed => "constructed",
            LifecyclePhase::Upgraded => "upgraded",
            LifecyclePhase::FirstConnected => "first-connected",
            LifecyclePhase::WillFirstUpdate => "will-first-update",
            LifecyclePhase::ComponentCreated => "component-created",
            LifecyclePhase::Mounted => "mounted",
            LifecyclePhase::Ready => "ready",
            LifecyclePhase::Disconnected => "disconnected",
        }
    }
}

impl ComponentHost {
    fn set_phase(&self, phase: LifecyclePhase) {
        trace!(tag = %self.tag(), phase = phase.as_str(), "lifecycle phase");
        self.inner.phase.set(phase);
    }

    // ── Connection ───────────────────────────────────────────────────

    /// Platform reaction to the element entering the document.
    ///
    /// Runs the synchronous connect sequence, then queues the async hooks.
    /// Failures in any step are reported and the sequence continues.
    pub fn connected_callback(&self) {
        let inner = &self.inner;
        if inner.connected.replace(true) {
            return;
        }
        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);
        let first = !inner.has_connected.replace(true);
        debug!(tag = %self.tag(), first, "connected");

        // Upgrade's attribute-changed pass is over; setters are safe now.
        self.replay_pre_upgrade();
        self.set_phase(LifecyclePhase::Upgraded);

        let definition = self.definition();
        let hooks = definition.hooks();
        let shadow = self.shadow_root();
        if first {
            self.run_connect_hook("firstConnected", hooks.first_connected.as_ref(), shadow.as_ref());
            self.set_phase(LifecyclePhase::FirstConnected);
            self.run_connect_hook("willFirstUpdate", hooks.will_first_update.as_ref(), shadow.as_ref());
            self.set_phase(LifecyclePhase::WillFirstUpdate);
        }

        self.create_component();
        self.observe_slots();
        self.notify_controllers(ControllerHook::Connected);

        if !inner.state.borrow().changed.is_empty() {
            inner.scheduler.schedule();
        }
        self.spawn_connect_tail(generation);
    }

    /// Platform reaction to the element leaving the document.
    ///
    /// Property values and first-connection flags survive, so reconnecting
    /// restores the previous state.
    pub fn disconnected_callback(&self) {
        let inner = &self.inner;
        if !inner.connected.replace(false) {
            return;
        }
        debug!(tag = %self.tag(), "disconnected");
        self.notify_controllers(ControllerHook::Disconnected);
        let teardowns = std::mem::take(&mut *inner.teardowns.borrow_mut());
        for teardown in teardowns {
            teardown();
        }
        inner.component.borrow_mut().take();
        self.set_phase(LifecyclePhase::Disconnected);
    }

    fn run_connect_hook(&self, name: &str, hook: Option<&ConnectHook>, shadow: Option<&Element>) {
        let (Some(hook), Some(shadow)) = (hook, shadow) else {
            return;
        };
        if let Err(err) = hook(self, shadow) {
            self.report_hook_error(name, err);
        }
    }

    fn report_hook_error(&self, hook: &str, err: HookError) {
        self.report(ErrorReport::new(
            ErrorKind::LifecycleHook,
            format!("{hook} failed: {err}"),
            json!({ "tag": self.tag(), "hook": hook }),
        ));
    }

    // ── Component creation ───────────────────────────────────────────

    fn create_component(&self) {
        let definition = self.definition();
        let Some(factory) = definition.factory() else {
            return;
        };
        let rendered = match factory(self) {
            Ok(rendered) => rendered,
            Err(source) => {
                return self.report_component_error(ComponentError::Factory {
                    tag: self.tag().to_owned(),
                    source,
                })
            }
        };
        if !rendered.element.exists() {
            return self.report_component_error(ComponentError::MissingElement {
                tag: self.tag().to_owned(),
            });
        }
        self.set_phase(LifecyclePhase::ComponentCreated);
        self.mount(rendered);
    }

    fn report_component_error(&self, err: ComponentError) {
        self.report(ErrorReport::new(
            ErrorKind::ComponentCreation,
            err.to_string(),
            json!({ "tag": self.tag() }),
        ));
    }

    /// Replace the shadow root's content with a `<style>` block and the
    /// rendered element.
    fn mount(&self, rendered: Rendered) {
        let (Some(shadow), Some(document)) = (self.shadow_root(), self.inner.element.document())
        else {
            return;
        };
        shadow.clear_children();
        let style = document.create_element("style");
        style.set_text_content(compile_styles(&rendered.styles, &self.style_options()));
        shadow.append_child(&style);
        shadow.append_child(&rendered.element);
        *self.inner.component.borrow_mut() = Some(rendered.element);
        self.set_phase(LifecyclePhase::Mounted);
    }

    // ── Slots ────────────────────────────────────────────────────────

    fn observe_slots(&self) {
        let definition = self.definition();
        let schema = definition.slots();
        if schema.is_empty() {
            return;
        }
        let element = self.element();
        let handlers: Vec<SlotChangeHandler> = schema
            .keys()
            .map(|slot| {
                let target = element.clone();
                let handler = create_slotchange_handler(slot, move |slot, assigned| {
                    target.dispatch_event(
                        SLOTCHANGE_EVENT,
                        EventDetail::SlotChange {
                            slot: slot.to_owned(),
                            assigned: assigned.len(),
                        },
                    );
                });
                handler.prime(&element);
                handler
            })
            .collect();
        *self.inner.slot_handlers.borrow_mut() = handlers;

        let weak = Rc::downgrade(&self.inner);
        self.inner.teardowns.borrow_mut().push(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.slot_handlers.borrow_mut().clear();
            }
        }));

        self.validate_slots();
    }

    /// Validate slot content against the schema. Problems are logged and,
    /// unless disabled in the config, dispatched as `slot-validation`.
    pub fn validate_slots(&self) -> SlotValidationResult {
        let result = validate_all_slots(&self.inner.element, self.inner.definition.slots());
        if result.is_clean() {
            return result;
        }
        for problem in result.errors.iter().chain(&result.warnings) {
            warn!(
                tag = %self.tag(),
                kind = ErrorKind::SlotValidation.as_str(),
                slot = %problem.slot,
                "{}",
                problem.message
            );
        }
        if self.inner.config.report_slot_warnings {
            self.inner
                .element
                .dispatch_event(SLOT_VALIDATION_EVENT, EventDetail::SlotValidation(result.clone()));
        }
        result
    }

    /// Re-check slot assignment after the host's children changed.
    pub fn slot_content_changed(&self) {
        if !self.is_connected() {
            return;
        }
        let handlers = self.inner.slot_handlers.borrow().clone();
        let mut changed = false;
        for handler in &handlers {
            changed |= handler.handle(&self.inner.element);
        }
        if changed {
            self.validate_slots();
        }
    }

    // ── Async connect tail ───────────────────────────────────────────

    fn spawn_connect_tail(&self, generation: u64) {
        let host = self.clone();
        self.inner.queue.spawn(Box::pin(async move {
            host.run_connect_tail(generation).await;
        }));
    }

    /// Await `before_connect`, `after_connect` and `on_ready` in order, then
    /// dispatch `ready`. Abandoned if the host disconnects meanwhile.
    async fn run_connect_tail(self, generation: u64) {
        let Some(shadow) = self.shadow_root() else {
            return;
        };
        let hooks = self.definition().hooks().clone();
        let steps = [
            ("beforeConnect", hooks.before_connect),
            ("afterConnect", hooks.after_connect),
            ("onReady", hooks.on_ready),
        ];
        for (name, hook) in steps {
            if !self.is_current_connection(generation) {
                return;
            }
            if let Some(hook) = hook {
                if let Err(err) = hook(self.clone(), shadow.clone()).await {
                    self.report_hook_error(name, err);
                }
            }
        }
        if !self.is_current_connection(generation) {
            return;
        }
        self.set_phase(LifecyclePhase::Ready);
        debug!(tag = %self.tag(), "ready");
        self.inner.element.dispatch_event(
            READY_EVENT,
            EventDetail::Ready {
                shadow_root: shadow,
                component: self.component(),
            },
        );
    }

    fn is_current_connection(&self, generation: u64) -> bool {
        self.is_connected() && self.inner.generation.get() == generation
    }

    // ── Update flush ─────────────────────────────────────────────────

    /// Run one update flush over the pending batch. Called by the scheduler.
    ///
    /// Order: controllers' `host_update`, `will_update`, `update`,
    /// `updated`, controllers' `host_updated`. A failing update hook ends
    /// the flush, is reported, and makes it resolve `false`.
    pub(crate) fn perform_update(&self) -> bool {
        let inner = &self.inner;
        if inner.updating.replace(true) {
            debug!(tag = %self.tag(), "flush already running; skipped");
            return true;
        }
        let changed = std::mem::take(&mut inner.state.borrow_mut().changed);
        trace!(tag = %self.tag(), changed = changed.len(), "update flush");

        self.notify_controllers(ControllerHook::Update);

        let hooks = self.definition().hooks().clone();
        let steps = [
            ("willUpdate", hooks.will_update),
            ("update", hooks.update),
            ("updated", hooks.updated),
        ];
        let mut failure = None;
        for (name, hook) in steps {
            if let Some(hook) = hook {
                if let Err(err) = hook(self, &changed) {
                    failure = Some((name, err));
                    break;
                }
            }
        }

        let ok = match failure {
            None => {
                self.notify_controllers(ControllerHook::Updated);
                true
            }
            Some((name, err)) => {
                self.report(ErrorReport::new(
                    ErrorKind::UpdateCycle,
                    format!("{name} failed: {err}"),
                    json!({
                        "tag": self.tag(),
                        "hook": name,
                        "changed": changed.keys().collect::<Vec<_>>(),
                    }),
                ));
                false
            }
        };
        inner.updating.set(false);
        ok
    }
}
