//! Node types: NodeId, NodeKind, NodeData.

use indexmap::IndexMap;
use slotmap::new_key_type;

use crate::value::Value;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular element.
    Element,
    /// The shadow root attached to a host element.
    ShadowRoot,
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Lowercase tag name (`#shadow-root` for shadow roots).
    pub tag: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Attributes in insertion order.
    pub attributes: IndexMap<String, String>,
    /// Plain own-properties set on the element (expandos). Values assigned
    /// before an element is upgraded wait here.
    pub properties: IndexMap<String, Value>,
    /// Text content, for leaf nodes such as `<style>`.
    pub text: Option<String>,
}

impl NodeData {
    /// Create element data with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            kind: NodeKind::Element,
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
            text: None,
        }
    }

    /// Create shadow root data.
    pub fn shadow_root() -> Self {
        Self {
            kind: NodeKind::ShadowRoot,
            ..Self::new("#shadow-root")
        }
    }

    /// Add an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set text content (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(&mut self, name: &str, value: String) -> Option<String> {
        self.attributes.insert(name.to_owned(), value)
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}
