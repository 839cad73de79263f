//! attributes! macro: parse a reactive property schema at compile time and
//! generate `AttributeMap` builder code.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Error, Expr, Ident, LitBool, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// Declared property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl Kind {
    fn from_ident(ident: &Ident) -> Result<Self> {
        match ident.to_string().as_str() {
            "string" => Ok(Kind::String),
            "number" => Ok(Kind::Number),
            "boolean" => Ok(Kind::Boolean),
            "object" => Ok(Kind::Object),
            "array" => Ok(Kind::Array),
            other => Err(Error::new(
                ident.span(),
                format!(
                    "unknown attribute type `{other}`; expected one of string, number, boolean, object, array"
                ),
            )),
        }
    }

    fn variant(self) -> TokenStream {
        match self {
            Kind::String => quote!(String),
            Kind::Number => quote!(Number),
            Kind::Boolean => quote!(Boolean),
            Kind::Object => quote!(Object),
            Kind::Array => quote!(Array),
        }
    }
}

/// Attribute mapping option.
#[derive(Debug, Clone)]
pub(crate) enum AttributeOption {
    Named(String),
    Disabled,
}

/// One property: `name: kind (= default)? (, option)* ;`
#[derive(Debug)]
pub(crate) struct PropertyDecl {
    pub name: String,
    pub name_span: Span,
    pub kind: Kind,
    pub default: Option<Expr>,
    pub reflect: bool,
    pub attribute: Option<AttributeOption>,
}

/// The top-level input to the attributes! macro.
#[derive(Debug)]
struct AttributesInput {
    properties: Vec<PropertyDecl>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for AttributesInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut properties: Vec<PropertyDecl> = Vec::new();
        while !input.is_empty() {
            let decl = parse_property(input)?;
            if properties.iter().any(|p| p.name == decl.name) {
                return Err(Error::new(
                    decl.name_span,
                    format!("property `{}` is declared twice", decl.name),
                ));
            }
            properties.push(decl);
        }
        Ok(AttributesInput { properties })
    }
}

/// Parse a single property declaration.
pub(crate) fn parse_property(input: ParseStream) -> Result<PropertyDecl> {
    let name: Ident = input.parse()?;
    input.parse::<Token![:]>()?;
    let kind_ident: Ident = input.parse()?;
    let kind = Kind::from_ident(&kind_ident)?;

    let default = if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        Some(input.parse::<Expr>()?)
    } else {
        None
    };

    let mut reflect = false;
    let mut attribute = None;
    while input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
        let option: Ident = input.parse()?;
        match option.to_string().as_str() {
            "reflect" => reflect = true,
            "attribute" => {
                input.parse::<Token![=]>()?;
                attribute = Some(if input.peek(LitStr) {
                    let lit: LitStr = input.parse()?;
                    AttributeOption::Named(lit.value())
                } else if input.peek(LitBool) {
                    let lit: LitBool = input.parse()?;
                    if lit.value {
                        return Err(Error::new(
                            lit.span,
                            "`attribute = true` is the default; omit it or give a name",
                        ));
                    }
                    AttributeOption::Disabled
                } else {
                    return Err(input.error("expected an attribute name or `false`"));
                });
            }
            other => {
                return Err(Error::new(
                    option.span(),
                    format!("unknown option `{other}`; expected `reflect` or `attribute = ...`"),
                ))
            }
        }
    }

    // The trailing `;` may be omitted on the last declaration.
    if !input.is_empty() {
        input.parse::<Token![;]>()?;
    }

    Ok(PropertyDecl {
        name: name.to_string(),
        name_span: name.span(),
        kind,
        default,
        reflect,
        attribute,
    })
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn generate_property(decl: &PropertyDecl) -> TokenStream {
    let name = &decl.name;
    let kind = decl.kind.variant();
    let mut config = quote! {
        ::gilt_elements::attribute::AttributeConfig::new()
            .kind(::gilt_elements::attribute::AttrKind::#kind)
    };
    if let Some(default) = &decl.default {
        config = quote! { #config.default_value(#default) };
    }
    if decl.reflect {
        config = quote! { #config.reflect(true) };
    }
    match &decl.attribute {
        Some(AttributeOption::Named(attr)) => config = quote! { #config.attribute(#attr) },
        Some(AttributeOption::Disabled) => config = quote! { #config.no_attribute() },
        None => {}
    }
    quote! { .with(#name, #config) }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Entry point: generate code for the entire attributes! macro.
pub(crate) fn attributes_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: AttributesInput = syn::parse2(input)?;
    let entries = parsed.properties.iter().map(generate_property);
    Ok(quote! {
        ::gilt_elements::attribute::AttributeMap::new()
            #(#entries)*
    })
}

// ===========================================================================
// Tests
// ===========================================================================
