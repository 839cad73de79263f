//! The reactive property layer.
//!
//! Each resolved [`AttributeDescriptor`] becomes a property in the host's
//! property bag. Programmatic writes ([`ComponentHost::set`]) and attribute
//! changes ([`ComponentHost::attribute_changed_callback`]) converge on the
//! same commit path: convert, validate, dirty-check, write, reflect,
//! `on_change`, then record the old value and schedule an update.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::json;
use tracing::{debug, trace};

use super::change::ChangeDetector;
use crate::attribute::AttributeDescriptor;
use crate::error::{
    AttributeValidationError, ErrorKind, ErrorReport, PropertyError,
};
use crate::host::ComponentHost;
use crate::value::{FromValue, Value};

// ---------------------------------------------------------------------------
// ChangedProperties
// ---------------------------------------------------------------------------

/// The pending batch: `property -> value before the first change`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedProperties {
    entries: IndexMap<String, Value>,
}

impl ChangedProperties {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. Only the first old value of a batch is kept.
    pub fn record(&mut self, property: &str, old: Value) {
        if !self.entries.contains_key(property) {
            self.entries.insert(property.to_owned(), old);
        }
    }

    /// Old value recorded for `property`.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.entries.get(property)
    }

    /// Whether `property` changed.
    pub fn contains(&self, property: &str) -> bool {
        self.entries.contains_key(property)
    }

    /// Changed property names in first-change order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(property, old value)` pairs in first-change order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of changed properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ReactiveState
// ---------------------------------------------------------------------------

/// Per-instance property state, owned by one host.
#[derive(Debug, Default)]
pub(crate) struct ReactiveState {
    pub(crate) values: HashMap<String, Value>,
    pub(crate) detector: ChangeDetector,
    pub(crate) changed: ChangedProperties,
    /// Own-properties found on the element at construction, replayed once
    /// on first connection.
    pub(crate) pending_pre_upgrade: Option<IndexMap<String, Value>>,
    /// Attribute names currently being written by reflection.
    pub(crate) reflecting: HashSet<String>,
}

// ---------------------------------------------------------------------------
// Host property API
// ---------------------------------------------------------------------------

impl ComponentHost {
    /// Capture pre-upgrade own-properties and seed every property from its
    /// attribute or default. Called once, from the constructor.
    pub(crate) fn initialize_properties(&self) {
        let definition = self.definition();
        let element = self.element();
        let mut pending = IndexMap::new();
        let mut seeded = Vec::with_capacity(definition.descriptors().len());

        for descriptor in definition.descriptors() {
            if let Some(value) = element.take_property(&descriptor.property) {
                pending.insert(descriptor.property.clone(), value);
            }
            let raw = descriptor
                .attribute
                .as_deref()
                .and_then(|attr| element.get_attribute(attr));
            // Bad attribute text is reported by the upgrade's
            // attribute-changed pass, not here.
            let value = match raw {
                Some(raw) => self
                    .attribute_value(descriptor, Some(&raw))
                    .unwrap_or_else(|_| descriptor.default_value.clone()),
                None => descriptor.default_value.clone(),
            };
            seeded.push((descriptor.property.clone(), value));
        }

        let mut state = self.inner.state.borrow_mut();
        for (name, value) in seeded {
            state.detector.set(&name, value.clone(), None);
            state.values.insert(name, value);
        }
        if !pending.is_empty() {
            debug!(tag = %definition.tag(), count = pending.len(), "captured pre-upgrade properties");
            state.pending_pre_upgrade = Some(pending);
        }
    }

    /// Apply captured pre-upgrade values through the setter. Runs at most
    /// once per instance.
    pub(crate) fn replay_pre_upgrade(&self) {
        let pending = self.inner.state.borrow_mut().pending_pre_upgrade.take();
        let Some(pending) = pending else {
            return;
        };
        for (name, value) in pending {
            trace!(tag = %self.tag(), property = %name, "replaying pre-upgrade value");
            if let Err(err) = self.set(&name, value) {
                self.report(ErrorReport::new(
                    ErrorKind::AttributeValidation,
                    err.to_string(),
                    json!({ "tag": self.tag(), "property": name, "source": "pre-upgrade" }),
                ));
            }
        }
    }

    /// Whether `name` is a declared reactive property.
    pub fn has_property(&self, name: &str) -> bool {
        self.definition().descriptor(name).is_some()
    }

    /// Current value of a reactive property (`Undefined` if unknown).
    pub fn get(&self, name: &str) -> Value {
        self.inner
            .state
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Current value as `T`, or `None` if the shape does not match.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Option<T> {
        T::from_value(&self.get(name))
    }

    /// Write a reactive property.
    ///
    /// Validation runs before anything is mutated, so on error the stored
    /// value is untouched. Writing a value equal to the current one (under
    /// the property's change strategy) does nothing.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), PropertyError> {
        let value = value.into();
        let definition = self.definition();
        let descriptor = definition
            .descriptor(name)
            .ok_or_else(|| PropertyError::UnknownProperty {
                tag: self.tag().to_owned(),
                name: name.to_owned(),
            })?;
        self.validate(descriptor, &value)?;
        // A write after upgrade supersedes any captured pre-upgrade value.
        if let Some(pending) = self.inner.state.borrow_mut().pending_pre_upgrade.as_mut() {
            pending.shift_remove(name);
        }
        self.commit(descriptor, value, true);
        Ok(())
    }

    /// Snapshot of the pending changed-properties batch.
    pub fn changed_properties(&self) -> ChangedProperties {
        self.inner.state.borrow().changed.clone()
    }

    /// Record `old` as the pre-change value of `name` and schedule an
    /// update if connected.
    pub fn request_update(&self, name: &str, old: Value) {
        self.inner.state.borrow_mut().changed.record(name, old);
        if self.is_connected() {
            self.inner.scheduler.schedule();
        }
    }

    /// Platform reaction to an observed attribute change.
    ///
    /// Legacy handler attributes with this name fire first. Unless the
    /// change comes from reflecting a property, the new text is converted,
    /// validated and committed. Conversion and validation failures are
    /// reported and leave the last good value in place.
    pub fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        let definition = self.definition();
        let element = self.element();
        for handler in definition.handlers().iter().filter(|h| h.name == name) {
            (handler.handler)(&element, old, new);
        }

        if self.inner.state.borrow().reflecting.contains(name) {
            return;
        }
        let Some(descriptor) = definition.descriptor_for_attribute(name) else {
            return;
        };
        match self.attribute_value(descriptor, new) {
            Ok(value) => {
                self.commit(descriptor, value, false);
            }
            Err(report) => self.report(report),
        }
    }

    /// Convert and validate attribute text; absent text yields the default.
    fn attribute_value(
        &self,
        descriptor: &AttributeDescriptor,
        raw: Option<&str>,
    ) -> Result<Value, ErrorReport> {
        let attribute = descriptor.display_name();
        let value = match descriptor.converter.from_attribute(raw, attribute) {
            Ok(Some(value)) => value,
            Ok(None) => descriptor.default_value.clone(),
            Err(err) => {
                return Err(ErrorReport::new(
                    ErrorKind::AttributeType,
                    err.to_string(),
                    json!({ "tag": self.tag(), "attribute": attribute, "value": raw }),
                ))
            }
        };
        self.validate(descriptor, &value).map_err(|err| {
            ErrorReport::new(
                ErrorKind::AttributeValidation,
                err.to_string(),
                json!({
                    "tag": err.tag,
                    "attribute": err.attribute,
                    "constraint": err.constraint,
                    "value": raw,
                }),
            )
        })?;
        Ok(value)
    }

    fn validate(
        &self,
        descriptor: &AttributeDescriptor,
        value: &Value,
    ) -> Result<(), AttributeValidationError> {
        let Some(validate) = &descriptor.validate else {
            return Ok(());
        };
        validate(value).map_err(|constraint| AttributeValidationError {
            tag: self.tag().to_owned(),
            attribute: descriptor.display_name().to_owned(),
            constraint,
            value: value.to_string(),
        })
    }

    /// Dirty-check and write a validated value. Returns whether it changed.
    fn commit(&self, descriptor: &AttributeDescriptor, value: Value, reflect: bool) -> bool {
        let name = descriptor.property.as_str();
        let old = {
            let mut state = self.inner.state.borrow_mut();
            let changed = match &descriptor.has_changed {
                Some(strategy) => {
                    let equality = strategy.as_equality();
                    state.detector.set(name, value.clone(), Some(&equality))
                }
                None => state.detector.set(name, value.clone(), None),
            };
            if !changed {
                return false;
            }
            state
                .values
                .insert(name.to_owned(), value.clone())
                .unwrap_or_default()
        };
        trace!(tag = %self.tag(), property = name, %old, new = %value, "property changed");

        if reflect && descriptor.reflect {
            self.reflect_attribute(descriptor, &value);
        }
        if let Some(on_change) = &descriptor.on_change {
            on_change(self, &value, &old);
        }
        self.request_update(name, old);
        true
    }

    /// Write `value` back to the property's attribute. The resulting
    /// attribute-changed reaction skips the reactive path for this name.
    fn reflect_attribute(&self, descriptor: &AttributeDescriptor, value: &Value) {
        let Some(attribute) = descriptor.attribute.as_deref() else {
            return;
        };
        let text = descriptor.converter.to_attribute(value);
        let element = self.element();
        let newly_guarded = self
            .inner
            .state
            .borrow_mut()
            .reflecting
            .insert(attribute.to_owned());
        match text {
            Some(text) => element.set_attribute(attribute, text),
            None => element.remove_attribute(attribute),
        }
        if newly_guarded {
            self.inner.state.borrow_mut().reflecting.remove(attribute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_properties_first_old_value_wins() {
        let mut changed = ChangedProperties::new();
        changed.record("count", Value::from(0));
        changed.record("label", Value::from("a"));
        changed.record("count", Value::from(10));
        assert_eq!(changed.get("count"), Some(&Value::from(0)));
        assert_eq!(changed.keys().collect::<Vec<_>>(), vec!["count", "label"]);
        assert_eq!(changed.len(), 2);
        assert!(changed.contains("label"));
        assert!(!changed.contains("other"));
    }

    #[test]
    fn changed_properties_default_is_empty() {
        let changed = ChangedProperties::default();
        assert!(changed.is_empty());
        assert_eq!(changed.iter().count(), 0);
    }
}
