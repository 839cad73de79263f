//! Dynamic property values.
//!
//! Reactive properties live in a map-backed property bag, so every property
//! value is a [`Value`]. Objects and arrays are reference-counted: cloning a
//! `Value::Object` shares the same allocation, which lets identity equality
//! ([`Value::same_value`]) tell "the same object" apart from "an equal
//! object", the way the change detector needs.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Number, Value as JsonValue};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A dynamically typed property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value (attribute absent, no default).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (always `f64`).
    Number(f64),
    /// String.
    String(String),
    /// JSON object, shared by reference.
    Object(Rc<Map<String, JsonValue>>),
    /// JSON array, shared by reference.
    Array(Rc<Vec<JsonValue>>),
}

impl Value {
    /// Build an object value from a JSON map.
    pub fn object(map: Map<String, JsonValue>) -> Self {
        Value::Object(Rc::new(map))
    }

    /// Build an array value from JSON items.
    pub fn array(items: Vec<JsonValue>) -> Self {
        Value::Array(Rc::new(items))
    }

    /// Convert a parsed JSON value into a `Value`.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::array(items),
            JsonValue::Object(map) => Value::object(map),
        }
    }

    /// Convert to JSON. `Undefined` has no JSON form; non-finite numbers
    /// serialize as `null`.
    pub fn to_json(&self) -> Option<JsonValue> {
        Some(match self {
            Value::Undefined => return None,
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Object(map) => JsonValue::Object(map.as_ref().clone()),
            Value::Array(items) => JsonValue::Array(items.as_ref().clone()),
        })
    }

    /// Serialized JSON text, or `None` for `Undefined`.
    pub fn to_json_string(&self) -> Option<String> {
        self.to_json().map(|json| json.to_string())
    }

    /// Identity comparison.
    ///
    /// Primitives compare by value with `+0` and `-0` distinct and `NaN`
    /// equal to itself. Objects and arrays compare by allocation.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// JavaScript-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Array(_) => true,
        }
    }

    /// Whether this is `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether this is `Undefined` or `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// The number, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object map, if this is an object.
    pub fn as_object(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The array items, if this is an array.
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }
}

/// Format a number the way `String(n)` does: integral values print without
/// a fractional part, `-0` prints as `0`, and magnitudes at or above `1e21`
/// or below `1e-6` use exponent form with an explicit sign (`1e+21`, `1e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Object(_) | Value::Array(_) => {
                f.write_str(&self.to_json_string().unwrap_or_default())
            }
        }
    }
}

/// Structural equality. Numbers treat `NaN` as equal to itself; objects and
/// arrays compare by content. Use [`Value::same_value`] for identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => self.same_value(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions into Value
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from_json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Typed reads
// ---------------------------------------------------------------------------

/// Typed extraction from a [`Value`], used by
/// [`ComponentHost::get_as`](crate::host::ComponentHost::get_as).
pub trait FromValue: Sized {
    /// Extract `Self`, or `None` if the value has a different shape.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && n.is_finite())
            .map(|n| n as i64)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for JsonValue {
    fn from_value(value: &Value) -> Option<Self> {
        value.to_json()
    }
}
