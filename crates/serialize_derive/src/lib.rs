//! Derive macro for the `Codec` trait.
//!
//! This crate provides `#[derive(Codec)]`, which implements the `Codec` trait
//! from the `tandem_serialize` crate field by field.
//!
//! # Supported Types
//!
//! The derive macro supports:
//! - Structs with named fields
//! - Tuple structs
//! - Unit structs
//! - Enums with any combination of unit, tuple, and struct variants
//!
//! # Examples
//!
//! ```ignore
//! use tandem_serialize::Codec;
//!
//! #[derive(Codec)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! #[derive(Codec)]
//! struct Id(u64);
//!
//! #[derive(Codec)]
//! enum Message {
//!     Quit,
//!     Move { x: i32, y: i32 },
//!     Write(String),
//! }
//! ```
//!
//! # Field Attributes
//!
//! ## `#[codec(skip)]`
//!
//! The field is not written, decodes as `Default::default()`, and is left out
//! of the log output.
//!
//! ## `#[codec(with = Marker)]`
//!
//! The field goes through `TagCodec<Marker>` instead of its default codec.
//!
//! ```ignore
//! use tandem_serialize::{Codec, Compact, LengthPrefixed};
//!
//! #[derive(Codec)]
//! struct Staff {
//!     #[codec(with = Compact)]
//!     wage: u32,
//!     #[codec(with = LengthPrefixed)]
//!     patrol_area: Vec<u16>,
//!     #[codec(skip)]
//!     path_cache: Vec<u8>, // Uses Default::default() when decoding
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Literal, Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    Data, DataEnum, DataStruct, DeriveInput, Fields, Ident, Index, Member,
    Path, Type, ext::IdentExt, parse_macro_input,
};

/// Options collected from a field's `#[codec(..)]` attributes.
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    with: Option<Path>,
}

/// One field of a struct or variant, with everything the generators need.
struct FieldPlan<'a> {
    member: Member,
    binding: Ident,
    ty: &'a Type,
    options: FieldOptions,
}

#[derive(Clone, Copy)]
enum Shape {
    Named,
    Unnamed,
    Unit,
}

fn field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("codec") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("with") {
                options.with = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown codec attribute"))
            }
        })?;
    }

    if options.skip && options.with.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` and `with` cannot be combined",
        ));
    }

    Ok(options)
}

fn plan_fields(fields: &Fields) -> syn::Result<(Shape, Vec<FieldPlan<'_>>)> {
    let shape = match fields {
        Fields::Named(_) => Shape::Named,
        Fields::Unnamed(_) => Shape::Unnamed,
        Fields::Unit => Shape::Unit,
    };

    let plans = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let member = field.ident.clone().map_or_else(
                || Member::Unnamed(Index::from(i)),
                Member::Named,
            );

            Ok(FieldPlan {
                member,
                binding: format_ident!("__field_{i}"),
                ty: &field.ty,
                options: field_options(field)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok((shape, plans))
}

fn self_access(field: &FieldPlan) -> TokenStream2 {
    let member = &field.member;
    quote! { &self.#member }
}

fn binding_access(field: &FieldPlan) -> TokenStream2 {
    let binding = &field.binding;
    quote! { #binding }
}

/// Writes one field; `access` evaluates to a reference to the value.
fn encode_field(field: &FieldPlan, access: &TokenStream2) -> TokenStream2 {
    let ty = field.ty;

    match &field.options.with {
        Some(marker) => quote! {
            <#ty as ::tandem_serialize::TagCodec<#marker>>::encode_tagged(#access, writer)?;
        },
        None => quote! {
            <#ty as ::tandem_serialize::Codec>::encode(#access, writer)?;
        },
    }
}

/// An expression producing the decoded field value.
fn decode_field(field: &FieldPlan) -> TokenStream2 {
    let ty = field.ty;

    if field.options.skip {
        return quote! { <#ty as ::std::default::Default>::default() };
    }

    match &field.options.with {
        Some(marker) => quote! {
            <#ty as ::tandem_serialize::TagCodec<#marker>>::decode_tagged(reader)?
        },
        None => quote! {
            <#ty as ::tandem_serialize::Codec>::decode(reader)?
        },
    }
}

fn log_field(field: &FieldPlan, access: &TokenStream2) -> TokenStream2 {
    let ty = field.ty;

    match &field.options.with {
        Some(marker) => quote! {
            <#ty as ::tandem_serialize::TagCodec<#marker>>::log_tagged(#access, sink);
        },
        None => quote! {
            <#ty as ::tandem_serialize::Codec>::log(#access, sink);
        },
    }
}

/// Renders `Name { a: 1 }`, `Name(1, 2)` or `Name`, skipping skipped fields.
fn log_body(
    display_name: &str,
    shape: Shape,
    fields: &[FieldPlan],
    access: impl Fn(&FieldPlan) -> TokenStream2,
) -> TokenStream2 {
    let logged: Vec<_> = fields.iter().filter(|f| !f.options.skip).collect();

    let (open, close) = match shape {
        Shape::Unit => return quote! { sink.push_str(#display_name); },
        Shape::Named if logged.is_empty() => {
            let text = format!("{display_name} {{}}");
            return quote! { sink.push_str(#text); };
        }
        Shape::Named => (format!("{display_name} {{ "), " }"),
        Shape::Unnamed => (format!("{display_name}("), ")"),
    };

    let entries = logged.iter().enumerate().map(|(i, field)| {
        let separator = (i > 0).then(|| quote! { sink.push_str(", "); });
        let label = match (&field.member, shape) {
            (Member::Named(ident), Shape::Named) => {
                let text = format!("{}: ", ident.unraw());
                Some(quote! { sink.push_str(#text); })
            }
            _ => None,
        };
        let value = log_field(field, &access(field));

        quote! {
            #separator
            #label
            #value
        }
    });

    quote! {
        sink.push_str(#open);
        #(#entries)*
        sink.push_str(#close);
    }
}

/// Derive macro for `Codec`.
///
/// This macro implements the `Codec` trait for structs and enums:
///
/// - For structs: all non-skipped fields are written in declaration order
/// - For enums: the variant index is written first (as `u32`), followed by
///   the variant's fields
///
/// An unknown variant index on decode is an `InvalidData` error. Every type
/// parameter gets a `Codec` bound.
///
/// # Example
///
/// ```ignore
/// use tandem_serialize::Codec;
///
/// #[derive(Codec)]
/// enum Color {
///     Red,
///     Green,
///     Blue,
///     Rgb(u8, u8, u8),
///     Named { name: String },
/// }
/// ```
#[proc_macro_derive(Codec, attributes(codec))]
pub fn derive_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) =
        input.generics.split_for_impl();

    // Build where clause for Codec bounds
    let mut where_clause =
        where_clause.cloned().unwrap_or_else(|| syn::parse_quote!(where));

    for param in &input.generics.params {
        if let syn::GenericParam::Type(type_param) = param {
            let ident = &type_param.ident;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ident: ::tandem_serialize::Codec));
        }
    }

    let (encode_impl, decode_impl, log_impl) = match &input.data {
        Data::Struct(data_struct) => impl_struct(name, data_struct)?,
        Data::Enum(data_enum) => impl_enum(name, data_enum)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Codec cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        #[automatically_derived]
        #[allow(unused_variables, clippy::trait_duplication_in_bounds)]
        impl #impl_generics ::tandem_serialize::Codec for #name #ty_generics #where_clause {
            fn encode<__W: ::std::io::Write + ?Sized>(
                &self,
                writer: &mut __W,
            ) -> ::tandem_serialize::Result<()> {
                #encode_impl
            }

            fn decode<__R: ::std::io::Read + ?Sized>(
                reader: &mut __R,
            ) -> ::tandem_serialize::Result<Self> {
                #decode_impl
            }

            fn log(&self, sink: &mut ::tandem_serialize::LogSink) {
                #log_impl
            }
        }
    })
}

type Bodies = (TokenStream2, TokenStream2, TokenStream2);

fn impl_struct(name: &Ident, data_struct: &DataStruct) -> syn::Result<Bodies> {
    let (shape, fields) = plan_fields(&data_struct.fields)?;
    let field_encodes = fields
        .iter()
        .filter(|field| !field.options.skip)
        .map(|field| encode_field(field, &self_access(field)));

    let field_decodes = fields.iter().map(|field| {
        let member = &field.member;
        let value = decode_field(field);
        quote! { #member: #value }
    });

    let log_impl = log_body(&name.to_string(), shape, &fields, self_access);

    Ok((
        quote! {
            #(#field_encodes)*
            Ok(())
        },
        quote! {
            Ok(Self { #(#field_decodes),* })
        },
        log_impl,
    ))
}

fn impl_enum(name: &Ident, data_enum: &DataEnum) -> syn::Result<Bodies> {
    if data_enum.variants.is_empty() {
        let name_str = name.to_string();
        return Ok((
            quote! { match *self {} },
            quote! {
                Err(::tandem_serialize::Error::invalid_data(::std::format!(
                    "enum {} has no variants to decode",
                    #name_str
                )))
            },
            quote! { match *self {} },
        ));
    }

    let mut encode_arms = Vec::new();
    let mut decode_arms = Vec::new();
    let mut log_arms = Vec::new();

    for (idx, variant) in data_enum.variants.iter().enumerate() {
        let variant_name = &variant.ident;
        let index = u32::try_from(idx).map(Literal::u32_suffixed).map_err(
            |_| syn::Error::new_spanned(variant, "too many variants"),
        )?;
        let (shape, fields) = plan_fields(&variant.fields)?;

        let pattern_bindings = fields.iter().map(|field| {
            let member = &field.member;
            let binding = &field.binding;
            if field.options.skip {
                quote! { #member: _ }
            } else {
                quote! { #member: #binding }
            }
        });
        let pattern = quote! { Self::#variant_name { #(#pattern_bindings),* } };

        let field_encodes = fields
            .iter()
            .filter(|field| !field.options.skip)
            .map(|field| encode_field(field, &binding_access(field)));

        encode_arms.push(quote! {
            #pattern => {
                <u32 as ::tandem_serialize::Codec>::encode(&#index, writer)?;
                #(#field_encodes)*
            }
        });

        let field_decodes = fields.iter().map(|field| {
            let member = &field.member;
            let value = decode_field(field);
            quote! { #member: #value }
        });

        decode_arms.push(quote! {
            #index => Ok(Self::#variant_name { #(#field_decodes),* }),
        });

        let log_impl = log_body(
            &format!("{name}::{variant_name}"),
            shape,
            &fields,
            binding_access,
        );

        log_arms.push(quote! {
            #pattern => { #log_impl }
        });
    }

    let name_str = name.to_string();
    let variant_count = Literal::usize_unsuffixed(data_enum.variants.len());
    let variant_idx = Ident::new("__variant_idx", Span::call_site());

    Ok((
        quote! {
            match self {
                #(#encode_arms)*
            }
            Ok(())
        },
        quote! {
            let #variant_idx = <u32 as ::tandem_serialize::Codec>::decode(reader)?;
            match #variant_idx {
                #(#decode_arms)*
                _ => Err(::tandem_serialize::Error::invalid_data(::std::format!(
                    "invalid variant index {} for enum {} (expected 0..{})",
                    #variant_idx,
                    #name_str,
                    #variant_count
                ))),
            }
        },
        quote! {
            match self {
                #(#log_arms)*
            }
        },
    ))
}
