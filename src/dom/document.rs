//! The document: element arena, custom element registry, task queue.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info};

use super::element::Element;
use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::config::RuntimeConfig;
use crate::error::RegistryError;
use crate::host::{ComponentDefinition, ComponentHost};
use crate::registry::CustomElementRegistry;
use crate::task::TaskQueue;

pub(crate) struct DocumentInner {
    pub(crate) dom: RefCell<Dom>,
    registry: CustomElementRegistry,
    queue: Rc<dyn TaskQueue>,
    config: RuntimeConfig,
}

/// A document. Cloning shares it.
///
/// Creating an element whose tag is defined upgrades it on the spot;
/// defining a tag upgrades every existing element with that tag.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    /// Create a document with its own registry and the default config.
    pub fn new(queue: Rc<dyn TaskQueue>) -> Self {
        Self::with_registry(CustomElementRegistry::new(), queue, RuntimeConfig::default())
    }

    /// Create a document sharing `registry`.
    pub fn with_registry(
        registry: CustomElementRegistry,
        queue: Rc<dyn TaskQueue>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                dom: RefCell::new(Dom::new()),
                registry,
                queue,
                config,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Self {
        Self { inner }
    }

    fn element(&self, id: NodeId) -> Element {
        Element::new(Rc::downgrade(&self.inner), id)
    }

    /// The `<body>` element.
    pub fn body(&self) -> Element {
        let body = self.inner.dom.borrow().body();
        self.element(body)
    }

    /// The registry consulted for upgrades.
    pub fn registry(&self) -> &CustomElementRegistry {
        &self.inner.registry
    }

    /// Queue used for update flushes and async lifecycle tails.
    pub fn queue(&self) -> Rc<dyn TaskQueue> {
        self.inner.queue.clone()
    }

    /// Runtime configuration handed to every host.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Create a detached element. Defined tags are upgraded immediately.
    pub fn create_element(&self, tag: &str) -> Element {
        let id = self.inner.dom.borrow_mut().insert(NodeData::new(tag));
        let element = self.element(id);
        if let Some(definition) = self.inner.registry.get(&element.tag()) {
            self.upgrade_node(&element, definition);
        }
        element
    }

    /// Look up an element by node id.
    pub fn get(&self, id: NodeId) -> Option<Element> {
        self.inner
            .dom
            .borrow()
            .contains(id)
            .then(|| self.element(id))
    }

    /// Every element with the given tag, in creation order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        let ids = self.inner.dom.borrow().nodes_with_tag(&tag.to_ascii_lowercase());
        ids.into_iter().map(|id| self.element(id)).collect()
    }

    /// Register a component and upgrade existing elements with its tag.
    pub fn define(&self, definition: Rc<ComponentDefinition>) -> Result<(), RegistryError> {
        self.inner.registry.register(definition.clone())?;
        info!(tag = %definition.tag(), "custom element defined");
        for element in self.elements_by_tag(definition.tag()) {
            if element.host().is_none() {
                self.upgrade_node(&element, definition.clone());
            }
        }
        Ok(())
    }

    /// Upgrade `element` if its tag is defined and it is not upgraded yet.
    pub fn upgrade(&self, element: &Element) -> Option<ComponentHost> {
        if let Some(host) = element.host() {
            return Some(host);
        }
        let definition = self.inner.registry.get(&element.tag())?;
        Some(self.upgrade_node(element, definition))
    }

    fn upgrade_node(&self, element: &Element, definition: Rc<ComponentDefinition>) -> ComponentHost {
        debug!(tag = %definition.tag(), "upgrading element");
        let host = ComponentHost::new(
            definition.clone(),
            element.clone(),
            self.queue(),
            &self.inner.config,
        );
        self.inner
            .dom
            .borrow_mut()
            .set_host(element.id(), host.clone());

        // Attributes present at upgrade time are reported as fresh additions.
        let present: Vec<(String, String)> = definition
            .observed_attributes()
            .iter()
            .filter_map(|name| element.get_attribute(name).map(|value| (name.clone(), value)))
            .collect();
        for (name, value) in present {
            host.attribute_changed_callback(&name, None, Some(&value));
        }

        if element.is_connected() {
            host.connected_callback();
        }
        host
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("dom", &*self.inner.dom.borrow())
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ManualTaskQueue;

    fn document() -> Document {
        Document::new(Rc::new(ManualTaskQueue::new()))
    }

    #[test]
    fn body_is_connected() {
        let doc = document();
        assert!(doc.body().is_connected());
        assert_eq!(doc.body().tag(), "body");
    }

    #[test]
    fn create_element_is_detached() {
        let doc = document();
        let el = doc.create_element("DIV");
        assert_eq!(el.tag(), "div");
        assert!(!el.is_connected());
        assert!(el.host().is_none());
    }

    #[test]
    fn append_and_remove_children() {
        let doc = document();
        let (a, b) = (doc.create_element("div"), doc.create_element("span"));
        doc.body().append_child(&a);
        a.append_child(&b);
        assert!(b.is_connected());
        assert_eq!(a.children(), vec![b.clone()]);
        assert_eq!(b.parent(), Some(a.clone()));
        assert!(a.remove_child(&b));
        assert!(!a.remove_child(&b));
        assert!(!b.is_connected());
    }

    #[test]
    fn attributes_on_plain_elements() {
        let doc = document();
        let el = doc.create_element("div");
        el.set_attribute("title", "hi");
        assert_eq!(el.get_attribute("title").as_deref(), Some("hi"));
        el.toggle_attribute("hidden", true);
        assert_eq!(el.attribute_names(), vec!["title", "hidden"]);
        el.remove_attribute("title");
        assert!(!el.has_attribute("title"));
    }

    #[test]
    fn own_properties_on_plain_elements() {
        let doc = document();
        let el = doc.create_element("div");
        el.set_property("count", 3).unwrap();
        assert!(el.has_own_property("count"));
        assert_eq!(el.property("count"), Some(3.into()));
        assert_eq!(el.take_property("count"), Some(3.into()));
        assert!(el.property("count").is_none());
    }

    #[test]
    fn events_reach_listeners_in_order() {
        use crate::dom::EventDetail;
        use std::cell::RefCell;

        let doc = document();
        let el = doc.create_element("div");
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = seen.clone();
            el.add_event_listener("ping", move |event| {
                seen.borrow_mut().push(format!("{tag}:{}", event.name));
            });
        }
        el.dispatch_event("ping", EventDetail::None);
        el.dispatch_event("other", EventDetail::None);
        assert_eq!(*seen.borrow(), vec!["first:ping", "second:ping"]);
    }

    #[test]
    fn elements_by_tag_and_lookup() {
        let doc = document();
        let a = doc.create_element("x-a");
        doc.create_element("div");
        assert_eq!(doc.elements_by_tag("X-A"), vec![a.clone()]);
        assert_eq!(doc.get(a.id()), Some(a));
    }
}
