//! Custom element registry.
//!
//! An explicitly created, shareable tag -> definition map. Several
//! documents may share one registry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Document, Element};
use crate::error::RegistryError;
use crate::host::{ComponentDefinition, ComponentHost};

/// Tag -> definition map. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct CustomElementRegistry {
    definitions: Rc<RefCell<IndexMap<String, Rc<ComponentDefinition>>>>,
}

impl CustomElementRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is a valid custom element name: starts with a
    /// lowercase ASCII letter and contains a hyphen.
    pub fn is_valid_tag_name(name: &str) -> bool {
        name.starts_with(|c: char| c.is_ascii_lowercase())
            && name.contains('-')
            && !name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace())
    }

    /// Register a definition without touching any document.
    pub fn register(&self, definition: Rc<ComponentDefinition>) -> Result<(), RegistryError> {
        let tag = definition.tag().to_owned();
        if !Self::is_valid_tag_name(&tag) {
            return Err(RegistryError::InvalidName(tag));
        }
        let mut definitions = self.definitions.borrow_mut();
        if definitions.contains_key(&tag) {
            return Err(RegistryError::AlreadyDefined(tag));
        }
        definitions.insert(tag, definition);
        Ok(())
    }

    /// Register a definition and upgrade matching elements of `document`.
    pub fn define(
        &self,
        document: &Document,
        definition: Rc<ComponentDefinition>,
    ) -> Result<(), RegistryError> {
        debug_assert!(
            Rc::ptr_eq(&self.definitions, &document.registry().definitions),
            "document does not use this registry"
        );
        document.define(definition)
    }

    /// Definition for `tag`.
    pub fn get(&self, tag: &str) -> Option<Rc<ComponentDefinition>> {
        self.definitions.borrow().get(tag).cloned()
    }

    /// Whether `tag` is defined.
    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.borrow().contains_key(tag)
    }

    /// Observed attributes captured for `tag` at definition time.
    pub fn observed_attributes(&self, tag: &str) -> Option<Vec<String>> {
        self.get(tag).map(|d| d.observed_attributes().to_vec())
    }

    /// Upgraded host behind `element`.
    pub fn host_for(&self, element: &Element) -> Option<ComponentHost> {
        element.host()
    }

    /// Defined tags in definition order.
    pub fn tags(&self) -> Vec<String> {
        self.definitions.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for CustomElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomElementRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_name_rules() {
        assert!(CustomElementRegistry::is_valid_tag_name("x-counter"));
        assert!(CustomElementRegistry::is_valid_tag_name("my-el-2"));
        assert!(!CustomElementRegistry::is_valid_tag_name("counter"));
        assert!(!CustomElementRegistry::is_valid_tag_name("X-counter"));
        assert!(!CustomElementRegistry::is_valid_tag_name("1-counter"));
        assert!(!CustomElementRegistry::is_valid_tag_name("-counter"));
        assert!(!CustomElementRegistry::is_valid_tag_name("x-Counter"));
    }

    #[test]
    fn register_rejects_duplicates_and_bad_names() {
        let registry = CustomElementRegistry::new();
        registry
            .register(ComponentDefinition::builder("x-a").build())
            .unwrap();
        assert_eq!(
            registry.register(ComponentDefinition::builder("x-a").build()),
            Err(RegistryError::AlreadyDefined("x-a".into()))
        );
        assert_eq!(
            registry.register(ComponentDefinition::builder("plain").build()),
            Err(RegistryError::InvalidName("plain".into()))
        );
        assert!(registry.is_defined("x-a"));
        assert_eq!(registry.tags(), vec!["x-a"]);
    }

    #[test]
    fn clones_share_definitions() {
        let registry = CustomElementRegistry::new();
        let shared = registry.clone();
        registry
            .register(ComponentDefinition::builder("x-b").build())
            .unwrap();
        assert!(shared.get("x-b").is_some());
        assert_eq!(shared.observed_attributes("x-b"), Some(vec![]));
    }
}
