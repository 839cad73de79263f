//! Slot schemas: what content each slot accepts.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::Element;

/// Custom slot validator over the slotted elements: `Err(message)` fails.
pub type SlotValidator = Rc<dyn Fn(&[Element]) -> Result<(), String>>;

/// Rules for one slot.
#[derive(Clone, Default)]
pub struct SlotConfig {
    /// At least one element must be slotted.
    pub required: bool,
    /// When non-empty, only these tags may be slotted.
    pub allowed_elements: Vec<String>,
    /// Tags that may never be slotted.
    pub disallowed_elements: Vec<String>,
    /// Minimum number of slotted elements.
    pub min_items: Option<usize>,
    /// Maximum number of slotted elements.
    pub max_items: Option<usize>,
    /// Deprecation notice; content in a deprecated slot is a warning.
    pub deprecated: Option<String>,
    /// Custom validator.
    pub validate: Option<SlotValidator>,
}

impl SlotConfig {
    /// A slot with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require content.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict slotted tags.
    pub fn allow<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_elements = tags
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Forbid slotted tags.
    pub fn disallow<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallowed_elements = tags
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Minimum item count.
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Maximum item count.
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Mark the slot deprecated.
    pub fn deprecated(mut self, notice: impl Into<String>) -> Self {
        self.deprecated = Some(notice.into());
        self
    }

    /// Add a custom validator.
    pub fn validate(mut self, f: impl Fn(&[Element]) -> Result<(), String> + 'static) -> Self {
        self.validate = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for SlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotConfig")
            .field("required", &self.required)
            .field("allowed_elements", &self.allowed_elements)
            .field("disallowed_elements", &self.disallowed_elements)
            .field("min_items", &self.min_items)
            .field("max_items", &self.max_items)
            .field("deprecated", &self.deprecated)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Ordered `slot key -> config` map. The unnamed slot uses
/// [`DEFAULT_SLOT`](super::DEFAULT_SLOT).
#[derive(Debug, Clone, Default)]
pub struct SlotSchema {
    slots: IndexMap<String, SlotConfig>,
}

impl SlotSchema {
    /// Empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot (builder).
    pub fn with(mut self, slot: impl Into<String>, config: SlotConfig) -> Self {
        self.slots.insert(slot.into(), config);
        self
    }

    /// Config for `slot`.
    pub fn get(&self, slot: &str) -> Option<&SlotConfig> {
        self.slots.get(slot)
    }

    /// Whether `slot` is declared.
    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Slot keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotConfig)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
