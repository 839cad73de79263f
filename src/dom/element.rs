//! Element handles.
//!
//! An [`Element`] is a `(document, node)` pair. It holds the document
//! weakly, so hosts that keep their own element never keep the document
//! alive. Every mutation releases the arena borrow before running platform
//! reactions (attribute-changed, connected/disconnected, slot changes), so
//! reactions are free to mutate the tree again.

use std::fmt;
use std::rc::{Rc, Weak};

use super::document::{Document, DocumentInner};
use super::event::{Event, EventDetail, Listener};
use super::node::{NodeId, NodeKind};
use super::tree::Dom;
use crate::error::PropertyError;
use crate::host::ComponentHost;
use crate::value::Value;

/// Handle to a node in a [`Document`].
#[derive(Clone)]
pub struct Element {
    doc: Weak<DocumentInner>,
    id: NodeId,
}

impl Element {
    pub(crate) fn new(doc: Weak<DocumentInner>, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// Node id in the arena.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document, if it is still alive.
    pub fn document(&self) -> Option<Document> {
        self.doc.upgrade().map(Document::from_inner)
    }

    fn with_dom<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> Option<R> {
        let doc = self.doc.upgrade()?;
        let mut dom = doc.dom.borrow_mut();
        Some(f(&mut dom))
    }

    fn sibling(&self, id: NodeId) -> Element {
        Element::new(self.doc.clone(), id)
    }

    /// Whether the node still exists.
    pub fn exists(&self) -> bool {
        self.with_dom(|dom| dom.contains(self.id)).unwrap_or(false)
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> String {
        self.with_dom(|dom| dom.get(self.id).map(|n| n.tag.clone()))
            .flatten()
            .unwrap_or_default()
    }

    /// Whether this node is a shadow root.
    pub fn is_shadow_root(&self) -> bool {
        self.with_dom(|dom| dom.get(self.id).map(|n| n.kind == NodeKind::ShadowRoot))
            .flatten()
            .unwrap_or(false)
    }

    /// The upgraded component host for this element.
    pub fn host(&self) -> Option<ComponentHost> {
        self.with_dom(|dom| dom.host(self.id)).flatten()
    }

    // ── Attributes ───────────────────────────────────────────────────

    /// Attribute value.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with_dom(|dom| dom.get(self.id)?.attribute(name).map(str::to_owned))
            .flatten()
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.with_dom(|dom| dom.get(self.id).is_some_and(|n| n.has_attribute(name)))
            .unwrap_or(false)
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> Vec<String> {
        self.with_dom(|dom| {
            dom.get(self.id)
                .map(|n| n.attributes.keys().cloned().collect())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// Set an attribute. Upgraded hosts observing `name` get an
    /// attribute-changed reaction.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let change = self.with_dom(|dom| {
            let node = dom.get_mut(self.id)?;
            let old = node.set_attribute(name, value.clone());
            Some((old, dom.host(self.id)))
        });
        if let Some(Some((old, host))) = change {
            self.attribute_reaction(host, name, old.as_deref(), Some(&value));
        }
    }

    /// Remove an attribute. No reaction when it was absent.
    pub fn remove_attribute(&self, name: &str) {
        let change = self.with_dom(|dom| {
            let old = dom.get_mut(self.id)?.remove_attribute(name)?;
            Some((old, dom.host(self.id)))
        });
        if let Some(Some((old, host))) = change {
            self.attribute_reaction(host, name, Some(&old), None);
        }
    }

    /// Set or remove a boolean attribute.
    pub fn toggle_attribute(&self, name: &str, present: bool) {
        if present {
            self.set_attribute(name, "");
        } else {
            self.remove_attribute(name);
        }
    }

    fn attribute_reaction(
        &self,
        host: Option<ComponentHost>,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        if let Some(host) = host {
            if host.observes(name) {
                host.attribute_changed_callback(name, old, new);
            }
        }
        // Slot assignment follows the `slot` attribute.
        if name == "slot" {
            if let Some(parent_host) = self.parent().and_then(|p| p.host()) {
                parent_host.slot_content_changed();
            }
        }
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Assign a property.
    ///
    /// On an upgraded host, reactive names go through the host's setter
    /// (which may reject the value). Anything else is stored as a plain
    /// own-property, which is where pre-upgrade values wait.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<(), PropertyError> {
        let value = value.into();
        if let Some(host) = self.host() {
            if host.has_property(name) {
                return host.set(name, value);
            }
        }
        self.with_dom(|dom| {
            if let Some(node) = dom.get_mut(self.id) {
                node.properties.insert(name.to_owned(), value);
            }
        });
        Ok(())
    }

    /// Read a property: the host's reactive value, else the own-property.
    pub fn property(&self, name: &str) -> Option<Value> {
        if let Some(host) = self.host() {
            if host.has_property(name) {
                return Some(host.get(name));
            }
        }
        self.with_dom(|dom| dom.get(self.id)?.properties.get(name).cloned())
            .flatten()
    }

    /// Whether a plain own-property named `name` exists.
    pub fn has_own_property(&self, name: &str) -> bool {
        self.with_dom(|dom| dom.get(self.id).is_some_and(|n| n.properties.contains_key(name)))
            .unwrap_or(false)
    }

    /// Remove and return a plain own-property.
    pub(crate) fn take_property(&self, name: &str) -> Option<Value> {
        self.with_dom(|dom| dom.get_mut(self.id)?.properties.shift_remove(name))
            .flatten()
    }

    // ── Text ─────────────────────────────────────────────────────────

    /// Text content of this node.
    pub fn text_content(&self) -> Option<String> {
        self.with_dom(|dom| dom.get(self.id)?.text.clone()).flatten()
    }

    /// Replace the text content.
    pub fn set_text_content(&self, text: impl Into<String>) {
        let text = text.into();
        self.with_dom(|dom| {
            if let Some(node) = dom.get_mut(self.id) {
                node.text = Some(text);
            }
        });
    }

    // ── Tree ─────────────────────────────────────────────────────────

    /// Parent element.
    pub fn parent(&self) -> Option<Element> {
        self.with_dom(|dom| dom.parent(self.id))
            .flatten()
            .map(|id| self.sibling(id))
    }

    /// Children in order.
    pub fn children(&self) -> Vec<Element> {
        self.with_dom(|dom| dom.children(self.id).to_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.sibling(id))
            .collect()
    }

    /// Whether the element is in the document (below `<body>`).
    pub fn is_connected(&self) -> bool {
        self.with_dom(|dom| dom.is_connected(self.id)).unwrap_or(false)
    }

    /// Append `child`, moving it from its previous parent.
    ///
    /// Hosts in the moved subtree get `disconnected_callback` when they
    /// leave the document and `connected_callback` when they enter it.
    pub fn append_child(&self, child: &Element) {
        let moved = self.with_dom(|dom| {
            let was_connected = dom.is_connected(child.id);
            let old_parent = dom.parent(child.id);
            if !dom.append_child(self.id, child.id) {
                return None;
            }
            Some(TreeMove {
                hosts: dom.hosts_in_subtree(child.id),
                was_connected,
                now_connected: dom.is_connected(child.id),
                old_parent_host: old_parent.and_then(|p| dom.host(p)),
                new_parent_host: dom.host(self.id),
            })
        });
        if let Some(Some(moved)) = moved {
            moved.react();
        }
    }

    /// Remove `child` if it is a child of this element.
    pub fn remove_child(&self, child: &Element) -> bool {
        let moved = self.with_dom(|dom| {
            if dom.parent(child.id) != Some(self.id) {
                return None;
            }
            let was_connected = dom.is_connected(child.id);
            dom.detach(child.id);
            Some(TreeMove {
                hosts: dom.hosts_in_subtree(child.id),
                was_connected,
                now_connected: false,
                old_parent_host: dom.host(self.id),
                new_parent_host: None,
            })
        });
        match moved {
            Some(Some(moved)) => {
                moved.react();
                true
            }
            _ => false,
        }
    }

    /// Remove every child.
    pub fn clear_children(&self) {
        for child in self.children() {
            self.remove_child(&child);
        }
    }

    /// The attached shadow root.
    pub fn shadow_root(&self) -> Option<Element> {
        self.with_dom(|dom| dom.shadow_root(self.id))
            .flatten()
            .map(|id| self.sibling(id))
    }

    /// Attach (or return the existing) shadow root.
    pub(crate) fn attach_shadow(&self) -> Option<Element> {
        self.with_dom(|dom| dom.attach_shadow(self.id))
            .map(|id| self.sibling(id))
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Listen for events named `name` on this element.
    pub fn add_event_listener(&self, name: &str, listener: impl Fn(&Event) + 'static) {
        let listener: Listener = Rc::new(listener);
        self.with_dom(|dom| {
            if !dom.contains(self.id) {
                return;
            }
            if let Some(list) = dom.listeners.entry(self.id) {
                list.or_default().push((name.to_owned(), listener));
            }
        });
    }

    /// Dispatch an event to this element's listeners, in registration order.
    pub fn dispatch_event(&self, name: &str, detail: EventDetail) {
        let listeners: Vec<Listener> = self
            .with_dom(|dom| {
                dom.listeners
                    .get(self.id)
                    .map(|list| {
                        list.iter()
                            .filter(|(n, _)| n == name)
                            .map(|(_, l)| l.clone())
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        if listeners.is_empty() {
            return;
        }
        let event = Event {
            name: name.to_owned(),
            target: self.clone(),
            detail,
        };
        for listener in listeners {
            listener(&event);
        }
    }
}

/// Platform reactions owed after a tree mutation.
struct TreeMove {
    hosts: Vec<ComponentHost>,
    was_connected: bool,
    now_connected: bool,
    old_parent_host: Option<ComponentHost>,
    new_parent_host: Option<ComponentHost>,
}

impl TreeMove {
    fn react(self) {
        if self.was_connected {
            for host in &self.hosts {
                host.disconnected_callback();
            }
        }
        if self.now_connected {
            for host in &self.hosts {
                host.connected_callback();
            }
        }
        if let Some(host) = self.old_parent_host {
            host.slot_content_changed();
        }
        if let Some(host) = self.new_parent_host {
            host.slot_content_changed();
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.doc, &other.doc)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}
