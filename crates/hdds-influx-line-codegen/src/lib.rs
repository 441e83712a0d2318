// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Path};

/// Role declared on a struct field
#[derive(Clone, Copy, PartialEq, Eq)]
enum RoleKind {
    Measurement,
    Timestamp,
    Tag,
    Field,
}

impl RoleKind {
    fn variant(self) -> proc_macro2::TokenStream {
        match self {
            RoleKind::Measurement => quote! { Measurement },
            RoleKind::Timestamp => quote! { Timestamp },
            RoleKind::Tag => quote! { Tag },
            RoleKind::Field => quote! { Field },
        }
    }
}

/// Struct-level measurement source
enum MeasurementOverride {
    Literal(LitStr),
    Function(Path),
}

/// `#[derive(LineProtocol)]` macro: generates a `hdds_influx_line::LineProtocol` impl
///
/// Field attributes (fields without `#[influx]` are ignored):
/// - `#[influx(measurement)]`: series name (value rendered as plain text)
/// - `#[influx(timestamp)]`: point time (`DateTime<Tz>` or `SystemTime`)
/// - `#[influx(tag)]` / `#[influx(tag = "key")]`: tag, key defaults to the field name
/// - `#[influx(field)]` / `#[influx(field = "key")]`: field, key defaults to the field name
///
/// Struct attributes (take precedence over field roles):
/// - `#[influx(measurement = "name")]`: fixed measurement name
/// - `#[influx(measurement_with = "path")]`: `fn(&Self) -> String`
/// - `#[influx(timestamp_with = "path")]`: `fn(&Self) -> DateTime<Utc>`
///
/// Example:
/// ```ignore
/// use hdds_influx_line::LineProtocol;
///
/// #[derive(LineProtocol)]
/// #[influx(measurement = "download")]
/// struct Transfer {
///     #[influx(tag)]
///     worker: String,
///     #[influx(timestamp)]
///     at: chrono::DateTime<chrono::Utc>,
///     #[influx(field = "execTime")]
///     exec_time: hdds_influx_line::duration::ScaledDuration,
/// }
/// ```
#[proc_macro_derive(LineProtocol, attributes(influx))]
pub fn derive_line_protocol(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only structs with named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let (measurement_override, timestamp_override) = parse_struct_attrs(input)?;

    let mut descriptors = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let Some((role, key)) = parse_field_attrs(field)? else {
            continue;
        };
        let key = key.unwrap_or_else(|| ident.to_string());
        let variant = role.variant();

        descriptors.push(quote! {
            ::hdds_influx_line::FieldDescriptor::new(
                #key,
                ::std::option::Option::Some(::hdds_influx_line::Role::#variant),
                ::hdds_influx_line::ToFieldValue::to_field_value(&self.#ident),
            )
        });
    }

    let measurement_fn = measurement_override.map(|m| {
        let body = match m {
            MeasurementOverride::Literal(lit) => quote! { ::std::string::String::from(#lit) },
            MeasurementOverride::Function(path) => quote! { #path(self) },
        };
        quote! {
            fn measurement_override(&self) -> ::std::option::Option<::std::string::String> {
                ::std::option::Option::Some(#body)
            }
        }
    });

    let timestamp_fn = timestamp_override.map(|path| {
        quote! {
            fn timestamp_override(
                &self,
            ) -> ::std::option::Option<
                ::hdds_influx_line::chrono::DateTime<::hdds_influx_line::chrono::Utc>,
            > {
                ::std::option::Option::Some(#path(self))
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::hdds_influx_line::LineProtocol for #name #ty_generics #where_clause {
            fn describe(&self) -> ::std::vec::Vec<::hdds_influx_line::FieldDescriptor<'_>> {
                ::std::vec![#(#descriptors),*]
            }

            #measurement_fn
            #timestamp_fn
        }
    })
}

/// Parse `#[influx(...)]` on the struct itself
fn parse_struct_attrs(input: &DeriveInput) -> syn::Result<(Option<MeasurementOverride>, Option<Path>)> {
    let mut measurement = None;
    let mut timestamp = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("influx")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("measurement") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut measurement, MeasurementOverride::Literal(lit), &meta)
            } else if meta.path.is_ident("measurement_with") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut measurement, MeasurementOverride::Function(lit.parse()?), &meta)
            } else if meta.path.is_ident("timestamp_with") {
                let lit: LitStr = meta.value()?.parse()?;
                let path: Path = lit.parse()?;
                set_once(&mut timestamp, path, &meta)
            } else {
                Err(meta.error(format!(
                    "unsupported struct attribute `{}`; expected `measurement`, `measurement_with` or `timestamp_with`",
                    meta.path.to_token_stream()
                )))
            }
        })?;
    }

    Ok((measurement, timestamp))
}

/// Parse `#[influx(...)]` on a field. `None` means the field is not encoded.
fn parse_field_attrs(field: &syn::Field) -> syn::Result<Option<(RoleKind, Option<String>)>> {
    let mut result: Option<(RoleKind, Option<String>)> = None;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("influx")) {
        attr.parse_nested_meta(|meta| {
            let role = if meta.path.is_ident("measurement") {
                RoleKind::Measurement
            } else if meta.path.is_ident("timestamp") {
                RoleKind::Timestamp
            } else if meta.path.is_ident("tag") {
                RoleKind::Tag
            } else if meta.path.is_ident("field") {
                RoleKind::Field
            } else {
                return Err(meta.error(format!(
                    "unsupported field attribute `{}`; expected `measurement`, `timestamp`, `tag` or `field`",
                    meta.path.to_token_stream()
                )));
            };

            let key = if meta.input.peek(syn::Token![=]) {
                if matches!(role, RoleKind::Measurement | RoleKind::Timestamp) {
                    return Err(meta.error("`measurement` and `timestamp` do not take a name"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                Some(lit.value())
            } else {
                None
            };

            set_once(&mut result, (role, key), &meta)
        })?;
    }

    Ok(result)
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("only one influx role may be declared here"));
    }
    *slot = Some(value);
    Ok(())
}
