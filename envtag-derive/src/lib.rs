//! Derive macro implementation for envtag

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, GenericParam};

mod attrs;

use attrs::{FieldAttrs, FieldKind};

/// `Record` derive macro
///
/// Implements `envtag::Record` by reporting every annotated field, in
/// declaration order, to the binder.
///
/// # Supported Attributes
///
/// **Field-level**:
/// - `#[env("KEY[,required][,defVal:v][,min:v][,max:v]")]`: bind from `KEY`
/// - `#[env = "..."]`: same as above
/// - `#[env(nested)]`: the field is itself a `Record`; bind it recursively
///
/// Fields without an `env` attribute are left untouched. Annotated leaf
/// fields must have a `'static` type; type parameters get a `'static` bound.
///
/// # Example
///
/// See the `envtag` crate documentation for usage examples.
#[proc_macro_derive(Record, attributes(env))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    // Struct name
    let struct_name = input.ident.clone();

    // Extract fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Record only supports structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Record only supports structs")
                .to_compile_error()
                .into();
        }
    };

    // Generate one visitor call per annotated field
    let mut visits: Vec<proc_macro2::TokenStream> = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let name = field_name.to_string();

        let attrs = match FieldAttrs::from_field(field) {
            Ok(attrs) => attrs,
            Err(error) => {
                match errors.as_mut() {
                    Some(errors) => errors.combine(error),
                    None => errors = Some(error),
                }
                continue;
            }
        };

        match attrs.kind {
            FieldKind::Skip => {}
            FieldKind::Leaf(directive) => visits.push(quote! {
                ::envtag::FieldVisitor::leaf(
                    visitor,
                    ::envtag::Leaf {
                        name: #name,
                        directive: #directive,
                        type_name: ::core::any::type_name::<#field_type>(),
                        value: &mut self.#field_name,
                    },
                )?;
            }),
            FieldKind::Nested => visits.push(quote! {
                ::envtag::FieldVisitor::nested(visitor, #name, &mut self.#field_name)?;
            }),
        }
    }

    if let Some(errors) = errors {
        return errors.to_compile_error().into();
    }

    // Leaf fields are handed out as `&mut dyn Any`
    for param in &mut input.generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!('static));
        }
    }
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::envtag::Record for #struct_name #type_generics #where_clause {
            #[allow(unused_variables)]
            fn visit_fields(
                &mut self,
                visitor: &mut dyn ::envtag::FieldVisitor,
            ) -> ::core::ops::ControlFlow<()> {
                #(#visits)*
                ::core::ops::ControlFlow::Continue(())
            }
        }
    };

    TokenStream::from(expanded)
}
