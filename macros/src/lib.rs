//! Proc macros for gilt-elements: `attributes!` compile-time property schemas.
//!
//! This crate is not meant to be used directly. Enable the `macros` feature on `gilt-elements`.

use proc_macro::TokenStream;

mod attributes_macro;

/// Compile-time reactive property schema.
///
/// Expands into a `gilt_elements::attribute::AttributeMap`. Unknown types
/// and options are compile errors.
///
/// # Syntax
///
/// ```ignore
/// let map = attributes! {
///     count: number = 0, reflect;
///     label: string = "Untitled", attribute = "aria-label";
///     open: boolean = false, reflect;
///     items: array, attribute = false;
/// };
/// ```
///
/// - `name: type` where type is `string`, `number`, `boolean`, `object` or `array`
/// - `= expr` sets the default value (anything convertible into `Value`)
/// - `reflect` writes property changes back to the attribute
/// - `attribute = "name"` picks the attribute name; `attribute = false`
///   makes the property attribute-less
#[proc_macro]
pub fn attributes(input: TokenStream) -> TokenStream {
    attributes_macro::attributes_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
