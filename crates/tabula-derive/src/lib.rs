//! Derive macro for tabula records.
//!
//! This crate provides `#[derive(Record)]`, which builds the static field
//! descriptor table the ORM maps a struct through.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Path, Type,
    Visibility,
};

/// Derives the `Record` trait for a struct with named fields.
///
/// # Attributes
///
/// - `#[record(table = "name")]` - Specifies the table name (optional,
///   defaults to the struct name as written)
/// - `#[record(hooks = path::to::fn)]` - A `fn() -> Hooks<Self>` supplying
///   lifecycle hooks
///
/// # Field Attributes
///
/// - `#[record(tag = "PRIMARY KEY")]` - Raw constraint text appended to the
///   column definition
/// - `#[record(skip)]` - Excludes a `pub` field from the mapping
///
/// Only `pub` fields are mapped. Every field type must implement `Clone`,
/// `SqlType`, `ToSqlValue` and `FromSqlValue`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let record_attrs = parse_record_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut mapped: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip || !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        mapped.push(FieldInfo {
            column_name: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            tag: attrs.tag.unwrap_or_default(),
        });
    }

    let table_name = &record_attrs.table;

    let descriptors: Vec<TokenStream2> = mapped
        .iter()
        .map(|info| {
            let name = &info.column_name;
            let ty = &info.ty;
            let tag = &info.tag;
            quote! {
                ::tabula_orm::FieldDef {
                    name: #name,
                    kind: <#ty as ::tabula_orm::core::SqlType>::KIND,
                    tag: #tag,
                }
            }
        })
        .collect();

    let values: Vec<TokenStream2> = mapped
        .iter()
        .map(|info| {
            let ident = &info.ident;
            quote! {
                ::tabula_orm::core::ToSqlValue::to_sql_value(
                    ::core::clone::Clone::clone(&self.#ident)
                )
            }
        })
        .collect();

    let setters: Vec<TokenStream2> = mapped
        .iter()
        .enumerate()
        .map(|(index, info)| {
            let ident = &info.ident;
            quote! {
                #index => {
                    self.#ident = ::tabula_orm::core::FromSqlValue::from_sql_value(value)?;
                    ::core::result::Result::Ok(())
                }
            }
        })
        .collect();

    let hooks_impl = record_attrs.hooks.as_ref().map(|path| {
        quote! {
            fn hooks() -> ::tabula_orm::Hooks<Self> {
                #path()
            }
        }
    });

    let expanded = quote! {
        impl ::tabula_orm::Record for #struct_name {
            const TABLE: &'static str = #table_name;
            const FIELDS: &'static [::tabula_orm::FieldDef] = &[
                #(#descriptors),*
            ];

            fn record_values(&self) -> ::std::vec::Vec<::tabula_orm::core::SqlValue> {
                ::std::vec![#(#values),*]
            }

            fn set_field(
                &mut self,
                index: usize,
                value: ::tabula_orm::core::SqlValue,
            ) -> ::core::result::Result<(), ::tabula_orm::core::ValueError> {
                match index {
                    #(#setters)*
                    _ => {
                        ::core::mem::drop(value);
                        ::core::result::Result::Err(
                            ::tabula_orm::core::ValueError::NoSuchField(index)
                        )
                    }
                }
            }

            #hooks_impl
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    ident: Ident,
    ty: Type,
    column_name: String,
    tag: String,
}

struct RecordAttrs {
    table: String,
    hooks: Option<Path>,
}

#[derive(Default)]
struct FieldAttrs {
    tag: Option<String>,
    skip: bool,
}

fn parse_string(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn parse_record_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<RecordAttrs> {
    let mut result = RecordAttrs {
        table: struct_name.to_string(),
        hooks: None,
    };

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                result.table = parse_string(&meta)?;
            } else if meta.path.is_ident("hooks") {
                result.hooks = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown record attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        // Bare `#[record]` carries nothing.
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("tag") {
                result.tag = Some(parse_string(&meta)?);
            } else {
                return Err(meta.error("unknown record field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}
