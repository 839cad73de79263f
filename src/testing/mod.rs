//! Headless testing framework: Harness, snapshot helpers.
//!
//! Use the [`Harness`] to define components and drive their lifecycle
//! against a manual task queue. Use [`render_tree`] to capture an element
//! tree as plain text for snapshot-style assertions.

pub mod harness;
pub mod snapshot;

pub use harness::Harness;
pub use snapshot::render_tree;
