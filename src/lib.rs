//! # gilt-elements
//!
//! A reactive, attribute-driven custom element runtime.
//!
//! gilt-elements turns a plain element into a lifecycle-managed component:
//! declared attributes are synchronized with typed properties, property
//! changes are dirty-checked and batched into one update flush per turn,
//! reactive controllers hook into connect/update/disconnect, and slot
//! content is validated against a schema. The runtime ships with a small
//! in-memory DOM so components run (and are tested) headlessly.
//!
//! ## Core Systems
//!
//! - **[`attribute`]**: Attribute declarations, converters, descriptor resolution
//! - **[`reactive`]**: Change detection, update scheduler, reactive property layer
//! - **[`host`]**: Component definitions, lifecycle hooks, the lifecycle state machine
//! - **[`controller`]**: Reactive controllers with per-controller error isolation
//! - **[`dom`]**: Slotmap-backed element arena with shadow roots and events
//! - **[`registry`]**: Custom element registry and upgrades
//! - **[`slots`]**: Slot schemas, validation, slot change handlers
//! - **[`styles`]**: Style compilation: reset merging and rule deduplication
//! - **[`task`]**: Microtask queues (tokio `LocalSet` or manual)
//! - **[`value`]**: Dynamic property values
//! - **[`testing`]**: Headless harness and tree snapshots

// Foundation
pub mod config;
pub mod error;
pub mod task;
pub mod value;

// Platform
pub mod dom;
pub mod registry;

// Component runtime
pub mod attribute;
pub mod controller;
pub mod host;
pub mod reactive;

// Collaborators
pub mod slots;
pub mod styles;

// Testing
pub mod testing;

pub use attribute::{AttrKind, AttributeConfig, AttributeMap};
pub use config::RuntimeConfig;
pub use controller::ReactiveController;
pub use dom::{Document, Element};
pub use error::{ErrorKind, ErrorReport, HookError, HookResult, PropertyError};
pub use host::{ComponentDefinition, ComponentHost, LifecycleHooks, LifecyclePhase, Rendered};
pub use reactive::{ChangedProperties, HasChanged};
pub use registry::CustomElementRegistry;
pub use value::Value;

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use gilt_elements_macros::attributes;
