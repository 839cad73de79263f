//! String ⇄ value converters.
//!
//! `from_attribute` returns `Ok(None)` when the attribute is absent, meaning
//! "use the declared default". `to_attribute` returns `None` when the
//! attribute should be removed, which is how `false` booleans reflect.

use std::fmt;
use std::rc::Rc;

use crate::error::AttributeTypeError;
use crate::value::{format_number, Value};

/// Bidirectional attribute codec.
pub trait Converter {
    /// Convert raw attribute text (or its absence) into a value.
    fn from_attribute(
        &self,
        raw: Option<&str>,
        attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError>;

    /// Convert a value into attribute text, or `None` to remove the attribute.
    fn to_attribute(&self, value: &Value) -> Option<String>;
}

/// Declared attribute type, selecting a built-in converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttrKind {
    /// Passthrough text.
    #[default]
    String,
    /// `Number()` semantics.
    Number,
    /// HTML boolean-attribute convention.
    Boolean,
    /// JSON text.
    Object,
    /// JSON text that must parse to an array.
    Array,
}

/// The built-in converter for `kind`.
pub fn converter_for(kind: AttrKind) -> Rc<dyn Converter> {
    match kind {
        AttrKind::String => Rc::new(StringConverter),
        AttrKind::Number => Rc::new(NumberConverter),
        AttrKind::Boolean => Rc::new(BooleanConverter),
        AttrKind::Object => Rc::new(ObjectConverter),
        AttrKind::Array => Rc::new(ArrayConverter),
    }
}

// ---------------------------------------------------------------------------
// Built-ins
// ---------------------------------------------------------------------------

/// Text passthrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        _attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        Ok(raw.map(Value::from))
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        (!value.is_nullish()).then(|| value.to_string())
    }
}

/// Numeric attributes. Empty text and `NaN` are type errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl NumberConverter {
    fn parse(text: &str) -> Option<f64> {
        let trimmed = text.trim();
        match trimmed {
            "" => return None,
            "Infinity" | "+Infinity" => return Some(f64::INFINITY),
            "-Infinity" => return Some(f64::NEG_INFINITY),
            _ => {}
        }
        let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
        for (prefix, base) in radix {
            if let Some(digits) = trimmed.strip_prefix(prefix) {
                return Self::parse_radix(digits, base);
            }
        }
        // Rust accepts "inf" and "nan" spellings that `Number()` rejects.
        let body = trimmed.trim_start_matches(['+', '-']);
        let spelled = body.get(..3).is_some_and(|head| {
            head.eq_ignore_ascii_case("inf") || head.eq_ignore_ascii_case("nan")
        });
        if spelled {
            return None;
        }
        // Out-of-range literals such as "1e400" overflow to infinity.
        trimmed.parse::<f64>().ok()
    }

    /// Fold digits into an `f64` so literals wider than 64 bits still parse.
    fn parse_radix(digits: &str, base: u32) -> Option<f64> {
        if digits.is_empty() {
            return None;
        }
        digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(base).map(|d| acc * f64::from(base) + f64::from(d))
        })
    }
}

impl Converter for NumberConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        Self::parse(raw)
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| AttributeTypeError::InvalidNumber {
                attribute: attribute.to_owned(),
                value: raw.to_owned(),
            })
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        match value {
            Value::Undefined | Value::Null => None,
            Value::Number(n) => Some(format_number(*n)),
            other => Some(other.to_string()),
        }
    }
}

/// Presence means `true` unless the text is literally `"false"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        _attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        Ok(raw.map(|text| Value::Bool(text != "false")))
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        value.is_truthy().then(String::new)
    }
}

fn parse_json(raw: &str, attribute: &str) -> Result<serde_json::Value, AttributeTypeError> {
    serde_json::from_str(raw).map_err(|err| AttributeTypeError::InvalidJson {
        attribute: attribute.to_owned(),
        message: err.to_string(),
    })
}

fn json_text(value: &Value) -> Option<String> {
    if value.is_nullish() {
        None
    } else {
        value.to_json_string()
    }
}

/// JSON objects (any JSON is accepted, as `JSON.parse` would).
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectConverter;

impl Converter for ObjectConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        raw.map(|text| parse_json(text, attribute).map(Value::from_json))
            .transpose()
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        json_text(value)
    }
}

/// JSON arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayConverter;

impl Converter for ArrayConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        let Some(text) = raw else {
            return Ok(None);
        };
        match parse_json(text, attribute)? {
            serde_json::Value::Array(items) => Ok(Some(Value::array(items))),
            other => Err(AttributeTypeError::NotAnArray {
                attribute: attribute.to_owned(),
                found: Value::from_json(other).type_name().to_owned(),
            }),
        }
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        json_text(value)
    }
}

// ---------------------------------------------------------------------------
// Custom converters
// ---------------------------------------------------------------------------

type FromFn = dyn Fn(Option<&str>) -> Result<Option<Value>, String>;
type ToFn = dyn Fn(&Value) -> Option<String>;

/// A converter assembled from two closures.
///
/// Errors from `from` are wrapped into [`AttributeTypeError::Custom`].
#[derive(Clone)]
pub struct FnConverter {
    from: Rc<FromFn>,
    to: Rc<ToFn>,
}

impl FnConverter {
    /// Build a converter from a parse and a format closure.
    pub fn new(
        from: impl Fn(Option<&str>) -> Result<Option<Value>, String> + 'static,
        to: impl Fn(&Value) -> Option<String> + 'static,
    ) -> Self {
        Self {
            from: Rc::new(from),
            to: Rc::new(to),
        }
    }
}

impl Converter for FnConverter {
    fn from_attribute(
        &self,
        raw: Option<&str>,
        attribute: &str,
    ) -> Result<Option<Value>, AttributeTypeError> {
        (self.from)(raw).map_err(|message| AttributeTypeError::Custom {
            attribute: attribute.to_owned(),
            message,
        })
    }

    fn to_attribute(&self, value: &Value) -> Option<String> {
        (self.to)(value)
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnConverter")
    }
}
