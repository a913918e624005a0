//! Derive macro for structproto record types
//!
//! `#[derive(Prototype)]` generates the field table and the ordinal
//! accessors a registry needs. Field annotations are written as
//! `#[proto(key = "token", ...)]`; `#[proto(skip)]` leaves a field out.

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token, Type};

/// Derive `structproto::Prototype` for a struct with named fields.
///
/// # Usage
///
/// ```ignore
/// #[derive(Default, Prototype)]
/// struct Character {
///     #[proto(demo = "*NAME", alt = "name")]
///     name: String,
///     #[proto(demo = "AGE;age in years")]
///     age: Option<i32>,
///     #[proto(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Prototype, attributes(proto))]
pub fn derive_prototype(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// A field that takes part in the field table
struct ProtoField {
    ident: Ident,
    ty: Type,
    tags: Vec<(String, String)>,
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .map(|field| {
                    let skip = is_skipped(&field.attrs)?;
                    let tags = extract_proto_tags(&field.attrs)?;
                    Ok((skip, field, tags))
                })
                .collect::<syn::Result<Vec<_>>>()?
                .into_iter()
                .filter(|(skip, _, _)| !skip)
                .filter_map(|(_, field, tags)| {
                    field.ident.clone().map(|ident| ProtoField {
                        ident,
                        ty: field.ty.clone(),
                        tags,
                    })
                })
                .collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Prototype cannot be derived for tuple structs",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Prototype can only be derived for structs",
            ))
        }
    };

    let name = &input.ident;
    let mut generics = input.generics.clone();
    if !generics.params.is_empty() {
        let where_clause = generics.make_where_clause();
        where_clause.predicates.push(syn::parse_quote!(Self: 'static));
        for field in &fields {
            let ty = &field.ty;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::structproto::FieldSlot));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let decls = fields.iter().map(|field| {
        let ident = field.ident.unraw().to_string();
        let keys = field.tags.iter().map(|(key, _)| key);
        let tokens = field.tags.iter().map(|(_, token)| token);
        quote! {
            ::structproto::FieldDecl::new(#ident).tags(&[#((#keys, #tokens)),*])
        }
    });

    let ordinals: Vec<usize> = (0..fields.len()).collect();
    let idents: Vec<&Ident> = fields.iter().map(|field| &field.ident).collect();

    Ok(quote! {
        impl #impl_generics ::structproto::Prototype for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::structproto::FieldDecl> {
                ::std::vec![#(#decls),*]
            }

            fn field(
                &self,
                ordinal: usize,
            ) -> ::std::option::Option<&dyn ::structproto::FieldSlot> {
                match ordinal {
                    #(#ordinals => ::std::option::Option::Some(&self.#idents),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                ordinal: usize,
            ) -> ::std::option::Option<&mut dyn ::structproto::FieldSlot> {
                match ordinal {
                    #(#ordinals => ::std::option::Option::Some(&mut self.#idents),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

/// Check for `#[proto(skip)]`
fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("proto")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
            } else if meta.input.peek(Token![=]) {
                // tag pairs are read by extract_proto_tags
                meta.value()?.parse::<LitStr>()?;
            }
            Ok(())
        })?;
    }
    Ok(skip)
}

/// Extract `key = "token"` pairs from `#[proto(...)]` attributes
fn extract_proto_tags(attrs: &[Attribute]) -> syn::Result<Vec<(String, String)>> {
    let mut tags: Vec<(String, String)> = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("proto")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                return Ok(());
            }
            let key = meta
                .path
                .get_ident()
                .map(|ident| ident.unraw().to_string())
                .ok_or_else(|| meta.error("expected a tag name"))?;
            let token: LitStr = meta.value()?.parse()?;
            if tags.iter().any(|(k, _)| *k == key) {
                return Err(meta.error(format!("duplicate tag '{}'", key)));
            }
            tags.push((key, token.value()));
            Ok(())
        })?;
    }
    Ok(tags)
}
