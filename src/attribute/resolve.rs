//! Resolution of [`AttributeMap`]s into runtime [`AttributeDescriptor`]s.
//!
//! Descriptors are built once per component definition and shared by all of
//! its instances.

use std::fmt;
use std::rc::Rc;

use super::config::{AttributeMap, AttributeName, OnChange, Validator};
use super::converter::{converter_for, AttrKind, Converter};
use crate::dom::Element;
use crate::reactive::change::HasChanged;
use crate::value::Value;

// ---------------------------------------------------------------------------
// AttributeDescriptor
// ---------------------------------------------------------------------------

/// A resolved reactive property.
#[derive(Clone)]
pub struct AttributeDescriptor {
    /// Property name.
    pub property: String,
    /// Observed attribute name; `None` when the attribute is disabled.
    pub attribute: Option<String>,
    /// Converter for the attribute text.
    pub converter: Rc<dyn Converter>,
    /// Whether property writes reflect to the attribute.
    pub reflect: bool,
    /// Value used when the attribute is absent.
    pub default_value: Value,
    /// Optional validator.
    pub validate: Option<Validator>,
    /// Optional change callback.
    pub on_change: Option<OnChange>,
    /// Optional change strategy.
    pub has_changed: Option<HasChanged>,
}

impl AttributeDescriptor {
    /// Name used in error messages: the attribute, else the property.
    pub fn display_name(&self) -> &str {
        self.attribute.as_deref().unwrap_or(&self.property)
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("property", &self.property)
            .field("attribute", &self.attribute)
            .field("reflect", &self.reflect)
            .field("default_value", &self.default_value)
            .field("validate", &self.validate.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("has_changed", &self.has_changed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Kebab-case a property name: each uppercase letter becomes `-` plus its
/// lowercase form (`tabletSize` -> `tablet-size`).
///
/// A leading uppercase letter would produce a leading hyphen; that hyphen is
/// trimmed (`MaxWidth` -> `max-width`).
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    match out.strip_prefix('-') {
        Some(rest) => rest.to_owned(),
        None => out,
    }
}

/// Resolve every entry of `map`, in declaration order.
pub fn resolve_attributes(map: &AttributeMap) -> Vec<AttributeDescriptor> {
    map.iter()
        .map(|(property, config)| AttributeDescriptor {
            property: property.to_owned(),
            attribute: match &config.attribute {
                AttributeName::Auto => Some(kebab_case(property)),
                AttributeName::Named(name) => Some(name.clone()),
                AttributeName::Disabled => None,
            },
            converter: config
                .converter
                .clone()
                .unwrap_or_else(|| converter_for(config.kind.unwrap_or(AttrKind::String))),
            reflect: config.reflect,
            default_value: config.default_value.clone().unwrap_or_default(),
            validate: config.validate.clone(),
            on_change: config.on_change.clone(),
            has_changed: config.has_changed.clone(),
        })
        .collect()
}

/// The deduplicated union of all resolved attribute names plus the legacy
/// handler-attribute names, in first-seen order.
pub fn observed_attributes(
    descriptors: &[AttributeDescriptor],
    handlers: &[HandlerAttribute],
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let reactive = descriptors.iter().filter_map(|d| d.attribute.as_deref());
    let legacy = handlers.iter().map(|h| h.name.as_str());
    for name in reactive.chain(legacy) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

// ---------------------------------------------------------------------------
// Legacy handler attributes
// ---------------------------------------------------------------------------

/// Handler for a non-reactive observed attribute: `(element, old, new)`.
pub type AttributeHandler = Rc<dyn Fn(&Element, Option<&str>, Option<&str>)>;

/// A non-reactive observed attribute. Fires once per attribute mutation,
/// independently of any reactive property mapped to the same name.
#[derive(Clone)]
pub struct HandlerAttribute {
    /// Attribute name.
    pub name: String,
    /// Handler.
    pub handler: AttributeHandler,
}

impl HandlerAttribute {
    /// Create a handler attribute.
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(&Element, Option<&str>, Option<&str>) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for HandlerAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerAttribute")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
