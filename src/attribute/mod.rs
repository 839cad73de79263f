//! Attribute declarations: converters, configuration, resolution.
//!
//! - [`AttributeConfig`] / [`AttributeMap`]: what component authors write.
//! - [`resolve_attributes`]: turns the map into shared [`AttributeDescriptor`]s.
//! - [`observed_attributes`]: the attribute list the registry reads at
//!   definition time.
//! - [`Converter`]: string ⇄ value codecs per declared [`AttrKind`].

pub mod config;
pub mod converter;
pub mod resolve;

pub use config::{AttributeConfig, AttributeMap, AttributeName, OnChange, Validator};
pub use converter::{
    converter_for, ArrayConverter, AttrKind, BooleanConverter, Converter, FnConverter,
    NumberConverter, ObjectConverter, StringConverter,
};
pub use resolve::{
    kebab_case, observed_attributes, resolve_attributes, AttributeDescriptor, AttributeHandler,
    HandlerAttribute,
};
