//! Reactive state: change detection, update scheduling, the property layer.
//!
//! - [`ChangeDetector`] / [`HasChanged`]: decide whether a write is a change.
//! - [`UpdateScheduler`]: coalesce synchronous changes into one flush.
//! - [`ChangedProperties`]: the batch handed to update hooks.

pub mod change;
pub mod properties;
pub mod scheduler;

pub use change::{
    default_equality, json_equality, shallow_equality, ChangeDetector, Equality, HasChanged,
};
pub use properties::ChangedProperties;
pub use scheduler::{PerformUpdate, UpdateComplete, UpdateScheduler};
