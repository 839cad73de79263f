//! Host environment: a slotmap-backed element tree with shadow roots,
//! attributes, own-properties and events.
//!
//! [`Document`] owns the arena and performs custom element upgrades;
//! [`Element`] is a cheap handle used everywhere else.

pub mod document;
pub mod element;
pub mod event;
pub mod node;
pub mod tree;

pub use document::Document;
pub use element::Element;
pub use event::{
    Event, EventDetail, Listener, ERROR_EVENT, READY_EVENT, SLOTCHANGE_EVENT,
    SLOT_VALIDATION_EVENT,
};
pub use node::{NodeData, NodeId, NodeKind};
pub use tree::Dom;
