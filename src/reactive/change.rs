//! Change detection: equality functions, the per-instance [`ChangeDetector`]
//! and selectable [`HasChanged`] strategies.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Equality used for dirty-checking: `(previous, next) -> equal?`.
///
/// The lifetime lets callers pass closures that borrow local state.
pub type Equality<'a> = dyn Fn(&Value, &Value) -> bool + 'a;

/// Identity equality (`Object.is` semantics).
pub fn default_equality(previous: &Value, next: &Value) -> bool {
    previous.same_value(next)
}

/// Structural equality by serialized JSON.
///
/// Values without a JSON form (`Undefined`) fall back to identity.
pub fn json_equality(previous: &Value, next: &Value) -> bool {
    match (previous.to_json_string(), next.to_json_string()) {
        (Some(a), Some(b)) => a == b,
        _ => previous.same_value(next),
    }
}

/// One-level structural equality: same keys / length with equal entries.
pub fn shallow_equality(previous: &Value, next: &Value) -> bool {
    match (previous, next) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() && a.iter().all(|(key, value)| b.get(key) == Some(value))
        }
        (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
        _ => previous.same_value(next),
    }
}

// ---------------------------------------------------------------------------
// ChangeDetector
// ---------------------------------------------------------------------------

/// Tracks the last observed value per key.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    values: HashMap<String, Value>,
}

impl ChangeDetector {
    /// Create an empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` under `key`.
    ///
    /// Returns `true` when this is the first observation of `key` or `value`
    /// differs from the previous one under `equality` (identity when `None`).
    /// The new value is recorded either way.
    pub fn set(&mut self, key: &str, value: Value, equality: Option<&Equality<'_>>) -> bool {
        let changed = match self.values.get(key) {
            None => true,
            Some(previous) => match equality {
                Some(eq) => !eq(previous, &value),
                None => !default_equality(previous, &value),
            },
        };
        self.values.insert(key.to_owned(), value);
        changed
    }

    /// Last observed value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether `key` has been observed.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Forget `key`; the next `set` counts as a first observation.
    pub fn delete(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// HasChanged
// ---------------------------------------------------------------------------

/// Per-attribute decision whether a write counts as a change:
/// `(new, old) -> changed?`.
#[derive(Clone)]
pub struct HasChanged {
    name: &'static str,
    test: Rc<dyn Fn(&Value, &Value) -> bool>,
}

impl HasChanged {
    fn named(name: &'static str, test: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self {
            name,
            test: Rc::new(test),
        }
    }

    /// Every write is a change.
    pub fn always() -> Self {
        Self::named("always", |_, _| true)
    }

    /// No write is a change (after the first observation).
    pub fn never() -> Self {
        Self::named("never", |_, _| false)
    }

    /// Changed when the serialized JSON differs.
    pub fn deep() -> Self {
        Self::named("deep", |new, old| !json_equality(old, new))
    }

    /// Changed when any top-level key or item differs.
    pub fn shallow() -> Self {
        Self::named("shallow", |new, old| !shallow_equality(old, new))
    }

    /// Numbers change only when they move by more than `epsilon`; other
    /// values fall back to identity.
    pub fn threshold(epsilon: f64) -> Self {
        Self::named("threshold", move |new, old| match (new, old) {
            (Value::Number(a), Value::Number(b)) => (a - b).abs() > epsilon,
            _ => !new.same_value(old),
        })
    }

    /// A user-supplied `(new, old) -> changed?` test.
    pub fn custom(test: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self::named("custom", test)
    }

    /// Run the test.
    pub fn has_changed(&self, new: &Value, old: &Value) -> bool {
        (self.test)(new, old)
    }

    /// The inverted test as an [`Equality`] for [`ChangeDetector::set`].
    pub fn as_equality(&self) -> impl Fn(&Value, &Value) -> bool + '_ {
        move |previous, next| !(self.test)(next, previous)
    }
}

impl fmt::Debug for HasChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HasChanged").field(&self.name).finish()
    }
}
