//! Integration tests for gilt-elements.
//!
//! These tests exercise the public API from outside the crate: components
//! are defined in a [`Harness`], mounted, and driven through the manual
//! task queue so every lifecycle step is observable.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gilt_elements::dom::{EventDetail, ERROR_EVENT, READY_EVENT, SLOTCHANGE_EVENT, SLOT_VALIDATION_EVENT};
use gilt_elements::slots::{SlotConfig, SlotSchema};
use gilt_elements::task::LocalTaskQueue;
use gilt_elements::testing::{render_tree, Harness};
use gilt_elements::{
    AttrKind, AttributeConfig, ComponentDefinition, ComponentHost, CustomElementRegistry, Document,
    ErrorKind, HookResult, LifecycleHooks, LifecyclePhase, PropertyError, ReactiveController,
    Rendered, RuntimeConfig, Value,
};
use pretty_assertions::assert_eq;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Route runtime logs to the test output; filter with `RUST_LOG`.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Old values seen by `updated`, one entry per flush.
type UpdateLog = Rc<RefCell<Vec<Vec<(String, String)>>>>;

fn span_factory(host: &ComponentHost) -> Result<Rendered, gilt_elements::HookError> {
    let document = host.element().document().ok_or("document dropped")?;
    Ok(Rendered::new(document.create_element("span")).with_styles("span { color: red; }"))
}

fn count_config() -> AttributeConfig {
    AttributeConfig::new()
        .kind(AttrKind::Number)
        .default_value(0)
        .reflect(true)
        .validate(|v| match v.as_f64() {
            Some(n) if n >= 0.0 => Ok(()),
            _ => Err("must be >= 0".into()),
        })
}

fn logging_hooks(log: &UpdateLog) -> LifecycleHooks {
    let log = log.clone();
    LifecycleHooks::new().updated(move |_, changed| {
        log.borrow_mut().push(
            changed
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_string()))
                .collect(),
        );
        Ok(())
    })
}

fn counter(tag: &str, log: &UpdateLog) -> Rc<ComponentDefinition> {
    ComponentDefinition::builder(tag)
        .attribute("count", count_config())
        .attribute(
            "open",
            AttributeConfig::new()
                .kind(AttrKind::Boolean)
                .default_value(false)
                .reflect(true),
        )
        .attribute("label", AttributeConfig::new().default_value("Untitled"))
        .hooks(logging_hooks(log))
        .create_component(span_factory)
        .build()
}

fn mounted_counter() -> (Harness, ComponentHost, UpdateLog) {
    init_logging();
    let log = UpdateLog::default();
    let harness = Harness::new();
    harness.define(counter("x-counter", &log)).unwrap();
    let host = harness.host(&harness.mount("x-counter")).unwrap();
    harness.settle();
    harness.clear_events();
    (harness, host, log)
}

// ---------------------------------------------------------------------------
// Update batching
// ---------------------------------------------------------------------------

#[test]
fn test_synchronous_writes_coalesce_into_one_flush() {
    let (harness, host, log) = mounted_counter();
    host.set("count", 1).unwrap();
    host.set("label", "Hello").unwrap();
    host.set("open", true).unwrap();
    assert!(host.is_update_pending());

    assert_eq!(harness.update_complete(&host), Some(true));
    assert_eq!(host.update_count(), 1);
    let flushes = log.borrow();
    assert_eq!(flushes.len(), 1);
    let keys: Vec<&str> = flushes[0].iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["count", "label", "open"]);
}

#[test]
fn test_batch_keeps_first_old_value() {
    let (harness, host, log) = mounted_counter();
    host.set("count", 10).unwrap();
    host.set("count", 20).unwrap();
    assert_eq!(
        host.changed_properties().get("count").and_then(|v| v.as_f64()),
        Some(0.0)
    );
    harness.settle();
    assert_eq!(log.borrow()[0], vec![("count".to_owned(), "0".to_owned())]);
    assert_eq!(host.get_as::<f64>("count"), Some(20.0));
}

#[test]
fn test_writing_same_value_is_a_no_op() {
    let changes = Rc::new(Cell::new(0));
    let seen = changes.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-quiet")
                .attribute(
                    "count",
                    AttributeConfig::new()
                        .kind(AttrKind::Number)
                        .default_value(0)
                        .on_change(move |_, _, _| seen.set(seen.get() + 1)),
                )
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-quiet")).unwrap();
    harness.settle();

    host.set("count", 0).unwrap();
    assert_eq!(changes.get(), 0);
    assert!(!host.is_update_pending());

    host.set("count", 3).unwrap();
    host.set("count", 3).unwrap();
    assert_eq!(changes.get(), 1);
}

#[test]
fn test_separate_turns_flush_separately() {
    let (harness, host, log) = mounted_counter();
    host.set("count", 1).unwrap();
    harness.settle();
    host.set("count", 2).unwrap();
    harness.settle();
    assert_eq!(host.update_count(), 2);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_disconnected_writes_wait_for_connection() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    harness.define(counter("x-counter", &log)).unwrap();
    let el = harness.create("x-counter");
    let host = harness.host(&el).unwrap();

    host.set("count", 4).unwrap();
    assert!(!host.is_update_pending());
    assert!(host.changed_properties().contains("count"));

    harness.document().body().append_child(&el);
    harness.settle();
    assert_eq!(host.update_count(), 1);
    assert_eq!(log.borrow()[0], vec![("count".to_owned(), "0".to_owned())]);
}

// ---------------------------------------------------------------------------
// Re-entrant updates
// ---------------------------------------------------------------------------

#[test]
fn test_updated_hook_writes_chain_flushes() {
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-chain")
                .attribute("count", AttributeConfig::new().kind(AttrKind::Number).default_value(0))
                .hooks(LifecycleHooks::new().updated(|host, _| {
                    let count = host.get_as::<f64>("count").unwrap_or(0.0);
                    if count < 3.0 {
                        host.set("count", count + 1.0)?;
                    }
                    Ok(())
                }))
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-chain")).unwrap();
    harness.settle();

    host.set("count", 1).unwrap();
    assert_eq!(harness.update_complete(&host), Some(true));
    assert_eq!(host.get_as::<f64>("count"), Some(3.0));
    assert_eq!(host.update_count(), 3);
}

#[test]
fn test_runaway_chain_stops_at_recursion_ceiling() {
    init_logging();
    let harness = Harness::with_config(RuntimeConfig::new().with_max_update_recursion(5));
    harness
        .define(
            ComponentDefinition::builder("x-runaway")
                .attribute("count", AttributeConfig::new().kind(AttrKind::Number).default_value(0))
                .hooks(LifecycleHooks::new().updated(|host, _| {
                    let count = host.get_as::<f64>("count").unwrap_or(0.0);
                    host.set("count", count + 1.0)?;
                    Ok(())
                }))
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-runaway")).unwrap();
    harness.settle();

    host.set("count", 1).unwrap();
    assert_eq!(harness.update_complete(&host), Some(false));
    assert_eq!(host.update_count(), 5);
    assert!(!host.is_update_pending());
}

#[test]
fn test_failing_update_hook_resolves_false_and_reports() {
    let updated_ran = Rc::new(Cell::new(false));
    let ran = updated_ran.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-broken")
                .attribute("count", AttributeConfig::new().kind(AttrKind::Number).default_value(0))
                .hooks(
                    LifecycleHooks::new()
                        .update(|_, _| Err("render exploded".into()))
                        .updated(move |_, _| {
                            ran.set(true);
                            Ok(())
                        }),
                )
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-broken")).unwrap();
    harness.settle();

    host.set("count", 1).unwrap();
    assert_eq!(harness.update_complete(&host), Some(false));
    assert!(!updated_ran.get());
    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UpdateCycle);
    assert!(errors[0].message.contains("render exploded"));

    // The next flush is independent of the failed one.
    assert!(!host.is_updating());
}

#[test]
fn test_update_complete_when_idle_resolves_immediately() {
    let (harness, host, _) = mounted_counter();
    assert!(!host.is_update_pending());
    assert_eq!(harness.update_complete(&host), Some(true));
}

// ---------------------------------------------------------------------------
// Attributes and reflection
// ---------------------------------------------------------------------------

#[test]
fn test_number_attribute_converts() {
    let (harness, host, _) = mounted_counter();
    host.element().set_attribute("count", "42");
    assert_eq!(host.get_as::<f64>("count"), Some(42.0));
    harness.settle();
    assert_eq!(host.update_count(), 1);
}

#[test]
fn test_property_reflects_to_attribute() {
    let (harness, host, _) = mounted_counter();
    let el = host.element();
    host.set("count", 5).unwrap();
    assert_eq!(el.get_attribute("count").as_deref(), Some("5"));

    // The reflected write did not loop back into a second change.
    harness.settle();
    assert_eq!(host.update_count(), 1);
    assert!(harness.errors().is_empty());
}

#[test]
fn test_boolean_reflection_convention() {
    let (_harness, host, _) = mounted_counter();
    let el = host.element();

    host.set("open", true).unwrap();
    assert!(el.has_attribute("open"));
    host.set("open", false).unwrap();
    assert!(!el.has_attribute("open"));

    el.set_attribute("open", "");
    assert_eq!(host.get_as::<bool>("open"), Some(true));
    el.set_attribute("open", "false");
    assert_eq!(host.get_as::<bool>("open"), Some(false));
    el.set_attribute("open", "no");
    assert_eq!(host.get_as::<bool>("open"), Some(true));
    el.remove_attribute("open");
    assert_eq!(host.get_as::<bool>("open"), Some(false));
}

#[test]
fn test_attribute_type_error_keeps_last_good_value() {
    let (harness, host, _) = mounted_counter();
    let el = host.element();
    el.set_attribute("count", "7");
    el.set_attribute("count", "seven");

    assert_eq!(host.get_as::<f64>("count"), Some(7.0));
    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::AttributeType);
    assert_eq!(errors[0].details["attribute"], "count");
    assert_eq!(harness.events_named(ERROR_EVENT).len(), 1);
}

#[test]
fn test_attribute_validation_error_is_reported() {
    let (harness, host, _) = mounted_counter();
    host.element().set_attribute("count", "-3");
    assert_eq!(host.get_as::<f64>("count"), Some(0.0));
    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::AttributeValidation);
    assert_eq!(errors[0].details["constraint"], "must be >= 0");
}

#[test]
fn test_programmatic_validation_failure_leaves_value() {
    let (_harness, host, _) = mounted_counter();
    host.set("count", 2).unwrap();
    let err = host.set("count", -1).unwrap_err();
    assert!(matches!(err, PropertyError::Validation(_)));
    assert!(err.to_string().contains("must be >= 0"));
    assert_eq!(host.get_as::<f64>("count"), Some(2.0));
    assert_eq!(host.element().get_attribute("count").as_deref(), Some("2"));
}

#[test]
fn test_unknown_property_is_rejected() {
    let (_harness, host, _) = mounted_counter();
    let err = host.set("missing", 1).unwrap_err();
    assert!(matches!(err, PropertyError::UnknownProperty { .. }));
}

#[test]
fn test_removed_attribute_restores_default() {
    let (_harness, host, _) = mounted_counter();
    let el = host.element();
    el.set_attribute("label", "Custom");
    assert_eq!(host.get_as::<String>("label").as_deref(), Some("Custom"));
    el.remove_attribute("label");
    assert_eq!(host.get_as::<String>("label").as_deref(), Some("Untitled"));
}

#[test]
fn test_initial_attribute_seeds_property() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    let document = harness.document().clone();
    let el = document.create_element("x-counter");
    el.set_attribute("count", "9");
    harness.define(counter("x-counter", &log)).unwrap();
    let host = el.host().unwrap();
    assert_eq!(host.get_as::<f64>("count"), Some(9.0));
    assert_eq!(host.phase(), LifecyclePhase::Constructed);
}

/// `a` reflects; its handler copies the new text into `b`'s attribute.
fn mirror_definition() -> Rc<ComponentDefinition> {
    ComponentDefinition::builder("x-mirror")
        .attribute("a", AttributeConfig::new().reflect(true))
        .attribute("b", AttributeConfig::new())
        .handler_attribute("a", |el, _, new| {
            el.set_attribute("b", new.unwrap_or_default());
        })
        .build()
}

#[test]
fn test_reflection_only_guards_its_own_attribute() {
    let harness = Harness::new();
    harness.define(mirror_definition()).unwrap();
    let host = harness.host(&harness.mount("x-mirror")).unwrap();

    host.set("a", "x").unwrap();
    assert_eq!(host.element().get_attribute("a").as_deref(), Some("x"));
    assert_eq!(host.element().get_attribute("b").as_deref(), Some("x"));
    assert_eq!(host.get_as::<String>("b").as_deref(), Some("x"));
}

#[test]
fn test_reflected_string_round_trip() {
    let harness = Harness::new();
    harness.define(mirror_definition()).unwrap();
    let host = harness.host(&harness.mount("x-mirror")).unwrap();
    let el = host.element();

    host.set("a", "hello world").unwrap();
    assert_eq!(el.get_attribute("a").as_deref(), Some("hello world"));
    assert_eq!(host.get_as::<String>("a").as_deref(), Some("hello world"));

    host.set("a", Value::Null).unwrap();
    assert!(!el.has_attribute("a"));
    assert_eq!(host.get("a"), Value::Null);
    assert!(harness.errors().is_empty());
}

#[test]
fn test_legacy_handler_attribute_fires() {
    let calls: Rc<RefCell<Vec<(Option<String>, Option<String>)>>> = Rc::default();
    let seen = calls.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-legacy")
                .handler_attribute("variant", move |_, old, new| {
                    seen.borrow_mut()
                        .push((old.map(str::to_owned), new.map(str::to_owned)));
                })
                .build(),
        )
        .unwrap();
    let el = harness.mount("x-legacy");
    el.set_attribute("variant", "primary");
    el.set_attribute("variant", "ghost");
    el.set_attribute("unobserved", "x");

    assert_eq!(
        *calls.borrow(),
        vec![
            (None, Some("primary".to_owned())),
            (Some("primary".to_owned()), Some("ghost".to_owned())),
        ]
    );
}

// ---------------------------------------------------------------------------
// Pre-upgrade properties
// ---------------------------------------------------------------------------

#[test]
fn test_pre_upgrade_property_is_replayed() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    let el = harness.create("x-late");
    el.set_property("count", 7).unwrap();
    assert!(el.has_own_property("count"));
    harness.document().body().append_child(&el);

    harness.define(counter("x-late", &log)).unwrap();
    let host = el.host().unwrap();
    assert!(!el.has_own_property("count"));
    assert_eq!(host.get_as::<f64>("count"), Some(7.0));

    harness.settle();
    assert_eq!(log.borrow()[0], vec![("count".to_owned(), "0".to_owned())]);
}

#[test]
fn test_pre_upgrade_property_wins_over_attribute() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    let el = harness.create("x-late");
    el.set_attribute("count", "3");
    el.set_property("count", 8).unwrap();
    harness.document().body().append_child(&el);

    harness.define(counter("x-late", &log)).unwrap();
    let host = el.host().unwrap();
    assert_eq!(host.get_as::<f64>("count"), Some(8.0));
    assert_eq!(el.get_attribute("count").as_deref(), Some("8"));
    harness.settle();
    assert_eq!(log.borrow()[0], vec![("count".to_owned(), "3".to_owned())]);
}

#[test]
fn test_write_after_upgrade_supersedes_captured_value() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    let el = harness.create("x-late");
    el.set_property("count", 7).unwrap();

    // Upgraded while detached: the captured 7 waits for connection.
    harness.define(counter("x-late", &log)).unwrap();
    el.set_property("count", 9).unwrap();
    harness.document().body().append_child(&el);
    harness.settle();

    let host = el.host().unwrap();
    assert_eq!(host.get_as::<f64>("count"), Some(9.0));
    assert_eq!(el.get_attribute("count").as_deref(), Some("9"));
}

#[test]
fn test_invalid_pre_upgrade_property_is_reported() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    let el = harness.create("x-late");
    el.set_property("count", -4).unwrap();
    harness.document().body().append_child(&el);

    harness.define(counter("x-late", &log)).unwrap();
    let host = el.host().unwrap();
    assert_eq!(host.get_as::<f64>("count"), Some(0.0));
    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::AttributeValidation);
    assert_eq!(errors[0].details["source"], "pre-upgrade");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_connect_mounts_component_and_fires_ready() {
    let log = UpdateLog::default();
    let harness = Harness::new();
    harness.define(counter("x-counter", &log)).unwrap();
    let el = harness.mount("x-counter");
    let host = el.host().unwrap();

    assert_eq!(host.phase(), LifecyclePhase::Mounted);
    assert!(harness.events_named(READY_EVENT).is_empty());
    harness.settle();
    assert_eq!(host.phase(), LifecyclePhase::Ready);

    let ready = harness.events_named(READY_EVENT);
    assert_eq!(ready.len(), 1);
    match &ready[0].detail {
        EventDetail::Ready { shadow_root, component } => {
            assert_eq!(Some(shadow_root.clone()), host.shadow_root());
            assert_eq!(component.as_ref().map(|c| c.tag()).as_deref(), Some("span"));
        }
        other => panic!("unexpected detail: {other:?}"),
    }

    let shadow = host.shadow_root().unwrap();
    let children = shadow.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].tag(), "style");
    let css = children[0].text_content().unwrap_or_default();
    assert!(css.starts_with(":host"));
    assert!(css.contains("span { color: red; }"));
}

#[test]
fn test_lifecycle_hook_order() {
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let push = |name: &'static str| {
        let order = order.clone();
        move || order.borrow_mut().push(name)
    };
    let (first, will_first, before, after, ready) = (
        push("firstConnected"),
        push("willFirstUpdate"),
        push("beforeConnect"),
        push("afterConnect"),
        push("onReady"),
    );
    let factory_order = order.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-ordered")
                .hooks(
                    LifecycleHooks::new()
                        .first_connected(move |_, _| {
                            first();
                            Ok(())
                        })
                        .will_first_update(move |_, _| {
                            will_first();
                            Ok(())
                        })
                        .before_connect(move |_, _| {
                            before();
                            async { Ok(()) }
                        })
                        .after_connect(move |_, _| {
                            after();
                            async { Ok(()) }
                        })
                        .on_ready(move |_, _| {
                            ready();
                            async { Ok(()) }
                        }),
                )
                .create_component(move |host| {
                    factory_order.borrow_mut().push("createComponent");
                    span_factory(host)
                })
                .build(),
        )
        .unwrap();
    harness.mount("x-ordered");
    harness.settle();

    assert_eq!(
        *order.borrow(),
        vec![
            "firstConnected",
            "willFirstUpdate",
            "createComponent",
            "beforeConnect",
            "afterConnect",
            "onReady",
        ]
    );
}

#[test]
fn test_reconnect_skips_first_connection_hooks() {
    let first = Rc::new(Cell::new(0));
    let seen = first.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-again")
                .hooks(LifecycleHooks::new().first_connected(move |_, _| {
                    seen.set(seen.get() + 1);
                    Ok(())
                }))
                .create_component(span_factory)
                .build(),
        )
        .unwrap();
    let el = harness.mount("x-again");
    let host = el.host().unwrap();
    harness.settle();

    let body = harness.document().body();
    assert!(body.remove_child(&el));
    assert_eq!(host.phase(), LifecyclePhase::Disconnected);
    assert!(host.component().is_none());

    body.append_child(&el);
    harness.settle();
    assert_eq!(first.get(), 1);
    assert!(host.component().is_some());
    assert_eq!(harness.events_named(READY_EVENT).len(), 2);
}

#[test]
fn test_disconnect_before_ready_abandons_async_hooks() {
    let ready_ran = Rc::new(Cell::new(false));
    let ran = ready_ran.clone();
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-fleeting")
                .hooks(LifecycleHooks::new().on_ready(move |_, _| {
                    ran.set(true);
                    async { Ok(()) }
                }))
                .build(),
        )
        .unwrap();
    let el = harness.mount("x-fleeting");
    harness.document().body().remove_child(&el);
    harness.settle();

    assert!(!ready_ran.get());
    assert!(harness.events_named(READY_EVENT).is_empty());
}

#[test]
fn test_factory_error_is_reported_and_ready_still_fires() {
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-faulty")
                .create_component(|_| Err("no template".into()))
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-faulty")).unwrap();
    harness.settle();

    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::ComponentCreation);
    assert!(errors[0].message.contains("no template"));
    assert!(host.component().is_none());

    let ready = harness.events_named(READY_EVENT);
    assert_eq!(ready.len(), 1);
    assert!(matches!(ready[0].detail, EventDetail::Ready { component: None, .. }));
}

#[test]
fn test_failing_connect_hooks_are_isolated() {
    let harness = Harness::new();
    harness
        .define(
            ComponentDefinition::builder("x-grumpy")
                .hooks(
                    LifecycleHooks::new()
                        .first_connected(|_, _| Err("first failed".into()))
                        .after_connect(|_, _| async { Err("after failed".into()) }),
                )
                .create_component(span_factory)
                .build(),
        )
        .unwrap();
    let host = harness.host(&harness.mount("x-grumpy")).unwrap();
    harness.settle();

    let errors = harness.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.kind == ErrorKind::LifecycleHook));
    assert_eq!(errors[0].details["hook"], "firstConnected");
    assert_eq!(errors[1].details["hook"], "afterConnect");
    assert!(host.component().is_some());
    assert_eq!(harness.events_named(READY_EVENT).len(), 1);
}

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<&'static str>>,
}

impl ReactiveController for Recorder {
    fn host_connected(&self, _host: &ComponentHost) -> HookResult {
        self.calls.borrow_mut().push("connected");
        Ok(())
    }

    fn host_disconnected(&self, _host: &ComponentHost) -> HookResult {
        self.calls.borrow_mut().push("disconnected");
        Ok(())
    }

    fn host_update(&self, _host: &ComponentHost) -> HookResult {
        self.calls.borrow_mut().push("update");
        Ok(())
    }

    fn host_updated(&self, _host: &ComponentHost) -> HookResult {
        self.calls.borrow_mut().push("updated");
        Ok(())
    }
}

#[test]
fn test_controller_follows_host_lifecycle() {
    let (harness, host, _) = mounted_counter();
    let recorder = Rc::new(Recorder::default());
    host.add_controller(recorder.clone());
    host.add_controller(recorder.clone());
    assert_eq!(host.controller_count(), 1);
    assert_eq!(*recorder.calls.borrow(), vec!["connected"]);

    host.set("count", 1).unwrap();
    harness.settle();
    harness.document().body().remove_child(&host.element());
    assert_eq!(
        *recorder.calls.borrow(),
        vec!["connected", "update", "updated", "disconnected"]
    );
}

#[test]
fn test_removed_controller_is_not_notified() {
    let (harness, host, _) = mounted_counter();
    let recorder = Rc::new(Recorder::default());
    host.add_controller(recorder.clone());
    assert!(host.remove_controller(&recorder));
    assert!(!host.has_controller(&recorder));

    host.set("count", 1).unwrap();
    harness.settle();
    assert_eq!(*recorder.calls.borrow(), vec!["connected"]);
}

/// Detaches `target` from the host during its own update notification.
struct Remover {
    target: Rc<Recorder>,
}

impl ReactiveController for Remover {
    fn host_update(&self, host: &ComponentHost) -> HookResult {
        host.remove_controller(&self.target);
        Ok(())
    }
}

#[test]
fn test_controller_removed_mid_notification_is_skipped() {
    let (harness, host, _) = mounted_counter();
    let recorder = Rc::new(Recorder::default());
    host.add_controller(Rc::new(Remover {
        target: recorder.clone(),
    }));
    host.add_controller(recorder.clone());

    host.set("count", 1).unwrap();
    harness.settle();
    assert_eq!(*recorder.calls.borrow(), vec!["connected"]);
    assert_eq!(host.controller_count(), 1);
    assert!(harness.errors().is_empty());
}

struct Failing;

impl ReactiveController for Failing {
    fn host_update(&self, _host: &ComponentHost) -> HookResult {
        Err("controller broke".into())
    }
}

#[test]
fn test_failing_controller_does_not_stop_the_flush() {
    let (harness, host, log) = mounted_counter();
    let recorder = Rc::new(Recorder::default());
    host.add_controller(Rc::new(Failing));
    host.add_controller(recorder.clone());

    host.set("count", 1).unwrap();
    assert_eq!(harness.update_complete(&host), Some(true));
    assert_eq!(log.borrow().len(), 1);
    assert!(recorder.calls.borrow().contains(&"updated"));
    let errors = harness.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::ControllerHook);
    assert_eq!(errors[0].details["hook"], "hostUpdate");
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

fn card_schema() -> SlotSchema {
    SlotSchema::new()
        .with("header", SlotConfig::new().required().allow(["h1", "h2"]))
        .with("default", SlotConfig::new().max_items(2))
}

#[test]
fn test_missing_required_slot_dispatches_validation_event() {
    let harness = Harness::new();
    harness
        .define(ComponentDefinition::builder("x-card").slots(card_schema()).build())
        .unwrap();
    harness.mount("x-card");

    let events = harness.events_named(SLOT_VALIDATION_EVENT);
    assert_eq!(events.len(), 1);
    match &events[0].detail {
        EventDetail::SlotValidation(result) => {
            assert!(!result.is_valid);
            assert_eq!(result.errors[0].slot, "header");
        }
        other => panic!("unexpected detail: {other:?}"),
    }
}

#[test]
fn test_slot_warnings_can_be_silenced() {
    let harness = Harness::with_config(RuntimeConfig::new().with_slot_warnings(false));
    harness
        .define(ComponentDefinition::builder("x-card").slots(card_schema()).build())
        .unwrap();
    let host = harness.host(&harness.mount("x-card")).unwrap();
    assert!(harness.events_named(SLOT_VALIDATION_EVENT).is_empty());
    assert!(!host.validate_slots().is_valid);
}

#[test]
fn test_slotted_child_fires_slotchange() {
    let harness = Harness::new();
    harness
        .define(ComponentDefinition::builder("x-card").slots(card_schema()).build())
        .unwrap();
    let el = harness.mount("x-card");
    harness.clear_events();

    let title = harness.document().create_element("h1");
    title.set_attribute("slot", "header");
    el.append_child(&title);

    let changes = harness.events_named(SLOTCHANGE_EVENT);
    assert_eq!(changes.len(), 1);
    assert!(matches!(
        &changes[0].detail,
        EventDetail::SlotChange { slot, assigned: 1 } if slot == "header"
    ));
    // Content is valid now, so nothing new is reported.
    assert!(harness.events_named(SLOT_VALIDATION_EVENT).is_empty());
    assert!(el.host().unwrap().validate_slots().is_valid);
}

#[test]
fn test_disallowed_slot_content_is_reported() {
    let harness = Harness::new();
    harness
        .define(ComponentDefinition::builder("x-card").slots(card_schema()).build())
        .unwrap();
    let el = harness.create("x-card");
    let title = harness.document().create_element("p");
    title.set_attribute("slot", "header");
    el.append_child(&title);
    harness.document().body().append_child(&el);

    let result = el.host().unwrap().validate_slots();
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.message.contains("<p>")));
}

// ---------------------------------------------------------------------------
// Registry and snapshots
// ---------------------------------------------------------------------------

#[test]
fn test_registry_rejects_bad_and_duplicate_names() {
    let harness = Harness::new();
    let log = UpdateLog::default();
    harness.define(counter("x-counter", &log)).unwrap();
    assert!(harness.define(counter("x-counter", &log)).is_err());
    assert!(harness.define(counter("counter", &log)).is_err());
    assert!(harness.document().registry().is_defined("x-counter"));
}

#[test]
fn test_render_tree_snapshot() {
    let (_harness, host, _) = mounted_counter();
    host.set("count", 2).unwrap();
    let outline = render_tree(&host.element());
    assert!(outline.starts_with("<x-counter count=\"2\">"));
    assert!(outline.contains("  #shadow-root"));
    assert!(outline.contains("    <style>"));
    assert!(outline.contains("    <span>"));
}

// ---------------------------------------------------------------------------
// tokio LocalSet
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_runs_on_a_local_set() {
    init_logging();
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let document = Document::with_registry(
                CustomElementRegistry::new(),
                Rc::new(LocalTaskQueue),
                RuntimeConfig::default(),
            );
            let log = UpdateLog::default();
            document.define(counter("x-counter", &log)).unwrap();
            let el = document.create_element("x-counter");
            document.body().append_child(&el);
            let host = el.host().unwrap();

            host.set("count", 3).unwrap();
            host.set("count", 4).unwrap();
            assert!(host.update_complete().await);
            assert_eq!(host.update_count(), 1);
            assert_eq!(log.borrow()[0], vec![("count".to_owned(), "0".to_owned())]);
        })
        .await;
}

// ---------------------------------------------------------------------------
// attributes! macro
// ---------------------------------------------------------------------------

#[cfg(feature = "macros")]
#[test]
fn test_attributes_macro_builds_a_schema() {
    use gilt_elements::attributes;

    let map = attributes! {
        count: number = 1, reflect;
        tabletSize: number, attribute = "tablet";
        items: array, attribute = false;
    };
    let harness = Harness::new();
    harness
        .define(ComponentDefinition::builder("x-macro").attributes(map).build())
        .unwrap();
    let host = harness.host(&harness.mount("x-macro")).unwrap();
    assert_eq!(host.get_as::<f64>("count"), Some(1.0));
    assert!(host.observes("tablet"));
    assert!(!host.observes("items"));

    host.element().set_attribute("tablet", "768");
    assert_eq!(host.get_as::<f64>("tabletSize"), Some(768.0));
}
