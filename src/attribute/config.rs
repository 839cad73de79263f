//! Declarative attribute configuration, as written by component authors.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::converter::{AttrKind, Converter};
use crate::host::ComponentHost;
use crate::reactive::change::HasChanged;
use crate::value::Value;

/// Validator: `Err(constraint)` rejects the value.
pub type Validator = Rc<dyn Fn(&Value) -> Result<(), String>>;

/// Change callback: `(host, new, old)`, called synchronously after a write.
pub type OnChange = Rc<dyn Fn(&ComponentHost, &Value, &Value)>;

/// How a property maps to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeName {
    /// Kebab-case of the property name.
    #[default]
    Auto,
    /// An explicit attribute name.
    Named(String),
    /// Property only; no attribute is observed or reflected.
    Disabled,
}

// ---------------------------------------------------------------------------
// AttributeConfig
// ---------------------------------------------------------------------------

/// Configuration for one reactive property.
#[derive(Clone, Default)]
pub struct AttributeConfig {
    /// Attribute mapping.
    pub attribute: AttributeName,
    /// Declared type; selects the built-in converter.
    pub kind: Option<AttrKind>,
    /// Explicit converter, overriding `kind`.
    pub converter: Option<Rc<dyn Converter>>,
    /// Whether property writes are written back to the attribute.
    pub reflect: bool,
    /// Value used when the attribute is absent.
    pub default_value: Option<Value>,
    /// Optional validator.
    pub validate: Option<Validator>,
    /// Optional change callback.
    pub on_change: Option<OnChange>,
    /// Optional change strategy.
    pub has_changed: Option<HasChanged>,
}

impl AttributeConfig {
    /// A string property with an automatic attribute name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declared type (builder).
    pub fn kind(mut self, kind: AttrKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Use an explicit attribute name (builder).
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = AttributeName::Named(name.into());
        self
    }

    /// Do not observe or reflect any attribute (builder).
    pub fn no_attribute(mut self) -> Self {
        self.attribute = AttributeName::Disabled;
        self
    }

    /// Use a custom converter (builder).
    pub fn converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Some(Rc::new(converter));
        self
    }

    /// Reflect property writes to the attribute (builder).
    pub fn reflect(mut self, reflect: bool) -> Self {
        self.reflect = reflect;
        self
    }

    /// Set the default value (builder).
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the validator (builder).
    pub fn validate(mut self, f: impl Fn(&Value) -> Result<(), String> + 'static) -> Self {
        self.validate = Some(Rc::new(f));
        self
    }

    /// Set the change callback (builder).
    pub fn on_change(mut self, f: impl Fn(&ComponentHost, &Value, &Value) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    /// Set the change strategy (builder).
    pub fn has_changed(mut self, strategy: HasChanged) -> Self {
        self.has_changed = Some(strategy);
        self
    }
}

impl fmt::Debug for AttributeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeConfig")
            .field("attribute", &self.attribute)
            .field("kind", &self.kind)
            .field("converter", &self.converter.is_some())
            .field("reflect", &self.reflect)
            .field("default_value", &self.default_value)
            .field("validate", &self.validate.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("has_changed", &self.has_changed)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AttributeMap
// ---------------------------------------------------------------------------

/// Ordered `property name -> config` map.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: IndexMap<String, AttributeConfig>,
}

impl AttributeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property (builder). A repeated name replaces the earlier entry
    /// in place.
    pub fn with(mut self, property: impl Into<String>, config: AttributeConfig) -> Self {
        self.insert(property, config);
        self
    }

    /// Add or replace a property.
    pub fn insert(&mut self, property: impl Into<String>, config: AttributeConfig) {
        self.entries.insert(property.into(), config);
    }

    /// Config for `property`.
    pub fn get(&self, property: &str) -> Option<&AttributeConfig> {
        self.entries.get(property)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeConfig)> {
        self.entries.iter().map(|(name, config)| (name.as_str(), config))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no property is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, AttributeConfig)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (S, AttributeConfig)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (property, config) in iter {
            map.insert(property, config);
        }
        map
    }
}
