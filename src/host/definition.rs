//! Component definitions.
//!
//! A [`ComponentDefinition`] is built once per tag and shared by every
//! instance. Attribute descriptors and the observed-attribute list are
//! resolved in [`DefinitionBuilder::build`] and never change afterwards.

use std::fmt;
use std::rc::Rc;

use crate::attribute::{
    observed_attributes, resolve_attributes, AttributeConfig, AttributeDescriptor, AttributeMap,
    HandlerAttribute,
};
use crate::dom::Element;
use crate::error::HookError;
use crate::host::{ComponentHost, LifecycleHooks};
use crate::slots::SlotSchema;
use crate::styles::StyleOptions;

/// What a component factory returns: the element to mount and its CSS.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Root element of the component's shadow content.
    pub element: Element,
    /// Component CSS, compiled before mounting.
    pub styles: String,
}

impl Rendered {
    /// Rendered output without styles.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            styles: String::new(),
        }
    }

    /// Attach CSS (builder).
    pub fn with_styles(mut self, css: impl Into<String>) -> Self {
        self.styles = css.into();
        self
    }
}

/// Builds a component's shadow content, once per connection.
pub type ComponentFactory = Rc<dyn Fn(&ComponentHost) -> Result<Rendered, HookError>>;

// ---------------------------------------------------------------------------
// ComponentDefinition
// ---------------------------------------------------------------------------

/// A registered component type.
pub struct ComponentDefinition {
    tag: String,
    descriptors: Vec<AttributeDescriptor>,
    observed: Vec<String>,
    handlers: Vec<HandlerAttribute>,
    slots: SlotSchema,
    hooks: LifecycleHooks,
    factory: Option<ComponentFactory>,
    styles: Option<StyleOptions>,
}

impl ComponentDefinition {
    /// Start a definition for `tag`.
    pub fn builder(tag: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder {
            tag: tag.into(),
            attributes: AttributeMap::new(),
            handlers: Vec::new(),
            slots: SlotSchema::new(),
            hooks: LifecycleHooks::new(),
            factory: None,
            styles: None,
        }
    }

    /// The custom element tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Resolved reactive properties in declaration order.
    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Descriptor for a property name.
    pub fn descriptor(&self, property: &str) -> Option<&AttributeDescriptor> {
        self.descriptors.iter().find(|d| d.property == property)
    }

    /// Descriptor observing `attribute`.
    pub fn descriptor_for_attribute(&self, attribute: &str) -> Option<&AttributeDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.attribute.as_deref() == Some(attribute))
    }

    /// Every observed attribute: reactive attributes plus handler
    /// attributes, deduplicated.
    pub fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    /// Legacy handler attributes.
    pub fn handlers(&self) -> &[HandlerAttribute] {
        &self.handlers
    }

    /// Slot schema.
    pub fn slots(&self) -> &SlotSchema {
        &self.slots
    }

    /// Lifecycle hooks.
    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// Component factory.
    pub fn factory(&self) -> Option<&ComponentFactory> {
        self.factory.as_ref()
    }

    /// Style options overriding the runtime config.
    pub fn style_options(&self) -> Option<&StyleOptions> {
        self.styles.as_ref()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("tag", &self.tag)
            .field("descriptors", &self.descriptors)
            .field("observed", &self.observed)
            .field("handlers", &self.handlers)
            .field("slots", &self.slots)
            .field("hooks", &self.hooks)
            .field("factory", &self.factory.is_some())
            .field("styles", &self.styles)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DefinitionBuilder
// ---------------------------------------------------------------------------

/// Builder returned by [`ComponentDefinition::builder`].
pub struct DefinitionBuilder {
    tag: String,
    attributes: AttributeMap,
    handlers: Vec<HandlerAttribute>,
    slots: SlotSchema,
    hooks: LifecycleHooks,
    factory: Option<ComponentFactory>,
    styles: Option<StyleOptions>,
}

impl DefinitionBuilder {
    /// Replace the attribute map.
    pub fn attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declare one reactive property.
    pub fn attribute(mut self, property: impl Into<String>, config: AttributeConfig) -> Self {
        self.attributes.insert(property, config);
        self
    }

    /// Add a legacy handler attribute.
    pub fn handler_attribute(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&Element, Option<&str>, Option<&str>) + 'static,
    ) -> Self {
        self.handlers.push(HandlerAttribute::new(name, handler));
        self
    }

    /// Add several legacy handler attributes.
    pub fn handler_attributes(mut self, handlers: impl IntoIterator<Item = HandlerAttribute>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Set the slot schema.
    pub fn slots(mut self, slots: SlotSchema) -> Self {
        self.slots = slots;
        self
    }

    /// Set the lifecycle hooks.
    pub fn hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set the component factory.
    pub fn create_component(
        mut self,
        factory: impl Fn(&ComponentHost) -> Result<Rendered, HookError> + 'static,
    ) -> Self {
        self.factory = Some(Rc::new(factory));
        self
    }

    /// Override the style options from the runtime config.
    pub fn styles(mut self, options: StyleOptions) -> Self {
        self.styles = Some(options);
        self
    }

    /// Resolve attributes and finish the definition.
    pub fn build(self) -> Rc<ComponentDefinition> {
        let descriptors = resolve_attributes(&self.attributes);
        let observed = observed_attributes(&descriptors, &self.handlers);
        Rc::new(ComponentDefinition {
            tag: self.tag.to_ascii_lowercase(),
            descriptors,
            observed,
            handlers: self.handlers,
            slots: self.slots,
            hooks: self.hooks,
            factory: self.factory,
            styles: self.styles,
        })
    }
}

impl fmt::Debug for DefinitionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionBuilder")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
