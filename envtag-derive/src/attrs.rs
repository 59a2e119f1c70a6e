//! Attribute parsing for `#[env(...)]` annotations.
//!
//! A field accepts at most one `env` attribute, in one of these forms:
//!
//! - `#[env("KEY,required,defVal:1")]` - leaf field bound from a directive
//! - `#[env = "KEY,required,defVal:1"]` - same, name-value form
//! - `#[env(nested)]` - sub-record walked recursively
//!
//! Fields without the attribute are not touched.

use syn::parse::ParseStream;
use syn::{Attribute, Expr, ExprLit, Field, Ident, Lit, LitStr, Meta};

const ATTRIBUTE: &str = "env";
const NESTED: &str = "nested";

/// How a field takes part in binding.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Not annotated; left alone.
    Skip,
    /// Bound from the given directive.
    Leaf(LitStr),
    /// A nested record.
    Nested,
}

/// Parsed `#[env(...)]` attribute of a struct field.
#[derive(Debug)]
pub struct FieldAttrs {
    pub kind: FieldKind,
}

impl FieldAttrs {
    /// Extract the `env` attribute from a struct field.
    ///
    /// Other attributes are ignored so that other derives can use them.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut kind = FieldKind::Skip;
        let mut seen: Option<&Attribute> = None;

        for attr in &field.attrs {
            if !attr.path().is_ident(ATTRIBUTE) {
                continue;
            }
            if seen.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "duplicate env attribute: a field takes a single directive or `nested`",
                ));
            }
            seen = Some(attr);
            kind = parse_attribute(attr)?;
        }

        Ok(Self { kind })
    }
}

fn parse_attribute(attr: &Attribute) -> syn::Result<FieldKind> {
    match &attr.meta {
        // env = "..."
        Meta::NameValue(name_value) => match &name_value.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(directive),
                ..
            }) => Ok(FieldKind::Leaf(directive.clone())),
            other => Err(syn::Error::new_spanned(other, "expected a directive string")),
        },
        // env("...") or env(nested)
        Meta::List(_) => attr.parse_args_with(|input: ParseStream| {
            if input.peek(LitStr) {
                return Ok(FieldKind::Leaf(input.parse()?));
            }
            let ident: Ident = input.parse().map_err(|error| {
                syn::Error::new(error.span(), "expected a directive string or `nested`")
            })?;
            if ident != NESTED {
                return Err(syn::Error::new(
                    ident.span(),
                    "unsupported env attribute, expected a directive string or `nested`",
                ));
            }
            Ok(FieldKind::Nested)
        }),
        Meta::Path(_) => Err(syn::Error::new_spanned(
            attr,
            "env attribute needs a directive string or `nested`",
        )),
    }
}
