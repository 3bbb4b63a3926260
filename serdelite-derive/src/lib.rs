//! Derive macros for the serdelite capability traits.
//!
//! The generated impls write fields in declaration order — the positional
//! wire contract — so reordering struct fields is a wire-format change.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, Attribute, Data, DataStruct, DeriveInput, Fields,
    Generics, Ident, LitStr, Type,
};

#[derive(Default)]
struct SdlAttr {
    rename: Option<String>,
    skip: bool,
}

fn parse_sdl_attrs(attrs: &[Attribute]) -> syn::Result<SdlAttr> {
    let mut out = SdlAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("sdl") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                out.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit.value());
                return Ok(());
            }
            Err(meta.error("unsupported sdl attribute"))
        })?;
    }
    Ok(out)
}

fn add_where_bound(
    where_clause: &mut syn::WhereClause,
    ty: &Type,
    bound: proc_macro2::TokenStream,
) {
    let pred: syn::WherePredicate = syn::parse_quote!(#ty: #bound);
    where_clause.predicates.push(pred);
}

fn struct_only<'i>(input: &'i DeriveInput, derive: &str) -> syn::Result<&'i DataStruct> {
    match &input.data {
        Data::Struct(data) => Ok(data),
        Data::Enum(e) => Err(syn::Error::new(
            e.enum_token.span(),
            format!("{derive} cannot be derived for enums: the positional wire format carries no variant tag"),
        )),
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span(),
            format!("{derive} not supported for unions"),
        )),
    }
}

fn empty_where_clause() -> syn::WhereClause {
    syn::WhereClause {
        where_token: Default::default(),
        predicates: Default::default(),
    }
}

fn byte_encode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut writes = Vec::new();
    let mut sizes = Vec::new();
    let mut bounds = Vec::new();

    match &data.fields {
        Fields::Named(fields) => {
            for field in &fields.named {
                let attr = parse_sdl_attrs(&field.attrs)?;
                if attr.skip {
                    continue;
                }
                let ident = field.ident.as_ref().unwrap();
                bounds.push(&field.ty);
                writes.push(quote! {
                    ::serdelite::ByteEncode::encode(&self.#ident, stream)?;
                });
                sizes.push(quote! {
                    size += ::serdelite::ByteEncode::byte_size(&self.#ident);
                });
            }
        }
        Fields::Unnamed(fields) => {
            for (idx, field) in fields.unnamed.iter().enumerate() {
                let attr = parse_sdl_attrs(&field.attrs)?;
                if attr.skip {
                    return Err(syn::Error::new(
                        field.span(),
                        "sdl(skip) not supported on tuple fields",
                    ));
                }
                let index = syn::Index::from(idx);
                bounds.push(&field.ty);
                writes.push(quote! {
                    ::serdelite::ByteEncode::encode(&self.#index, stream)?;
                });
                sizes.push(quote! {
                    size += ::serdelite::ByteEncode::byte_size(&self.#index);
                });
            }
        }
        Fields::Unit => {}
    }

    let mut where_clause = where_clause.cloned().unwrap_or_else(empty_where_clause);
    for ty in bounds {
        add_where_bound(&mut where_clause, ty, quote!(::serdelite::ByteEncode));
    }

    Ok(quote! {
        impl #impl_generics ::serdelite::ByteEncode for #name #ty_generics #where_clause {
            fn encode(
                &self,
                stream: &mut ::serdelite::ByteStream<'_, '_>,
            ) -> Result<(), ::serdelite::StreamError> {
                #(#writes)*
                Ok(())
            }

            fn byte_size(&self) -> usize {
                let mut size = 0usize;
                #(#sizes)*
                size
            }
        }
    })
}

fn byte_decode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let mut where_clause = where_clause.cloned().unwrap_or_else(empty_where_clause);

    let body = match &data.fields {
        Fields::Named(fields) => {
            let mut inits = Vec::new();
            for field in &fields.named {
                let attr = parse_sdl_attrs(&field.attrs)?;
                let ident = field.ident.as_ref().unwrap();
                let ty = &field.ty;
                if attr.skip {
                    add_where_bound(&mut where_clause, ty, quote!(::core::default::Default));
                    inits.push(quote! { #ident: ::core::default::Default::default(), });
                } else {
                    add_where_bound(&mut where_clause, ty, quote!(::serdelite::ByteDecode));
                    inits.push(quote! {
                        #ident: <#ty as ::serdelite::ByteDecode>::decode(stream)?,
                    });
                }
            }
            quote! { Ok(Self { #(#inits)* }) }
        }
        Fields::Unnamed(fields) => {
            let mut inits = Vec::new();
            for field in &fields.unnamed {
                let attr = parse_sdl_attrs(&field.attrs)?;
                if attr.skip {
                    return Err(syn::Error::new(
                        field.span(),
                        "sdl(skip) not supported on tuple fields",
                    ));
                }
                let ty = &field.ty;
                add_where_bound(&mut where_clause, ty, quote!(::serdelite::ByteDecode));
                inits.push(quote! { <#ty as ::serdelite::ByteDecode>::decode(stream)?, });
            }
            quote! { Ok(Self( #(#inits)* )) }
        }
        Fields::Unit => quote! { Ok(Self) },
    };

    Ok(quote! {
        impl #impl_generics ::serdelite::ByteDecode for #name #ty_generics #where_clause {
            fn decode(
                stream: &mut ::serdelite::ByteStream<'_, '_>,
            ) -> Result<Self, ::serdelite::StreamError> {
                #body
            }
        }
    })
}

fn json_encode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            name.span(),
            "JsonEncode requires named fields: each field name becomes a JSON key",
        ));
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let mut where_clause = where_clause.cloned().unwrap_or_else(empty_where_clause);

    let mut writes = Vec::new();
    for field in &fields.named {
        let attr = parse_sdl_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let ident = field.ident.as_ref().unwrap();
        let key = attr.rename.unwrap_or_else(|| ident.to_string());
        add_where_bound(&mut where_clause, &field.ty, quote!(::serdelite::JsonField));
        writes.push(quote! {
            ::serdelite::JsonField::write_field(&self.#ident, #key, stream)?;
        });
    }

    Ok(quote! {
        impl #impl_generics ::serdelite::JsonEncode for #name #ty_generics #where_clause {
            fn json_fields(
                &self,
                stream: &mut ::serdelite::JsonStream<'_, '_>,
            ) -> Result<(), ::serdelite::StreamError> {
                #(#writes)*
                Ok(())
            }
        }

        impl #impl_generics ::serdelite::JsonField for #name #ty_generics #where_clause {
            fn write_field(
                &self,
                key: &str,
                stream: &mut ::serdelite::JsonStream<'_, '_>,
            ) -> Result<(), ::serdelite::StreamError> {
                stream.write_object(key, self)
            }
        }
    })
}

/// Derive `ByteEncode`, writing fields in declaration order.
///
/// `#[sdl(skip)]` omits a field from the wire.
#[proc_macro_derive(ByteEncode, attributes(sdl))]
pub fn derive_byte_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = struct_only(&input, "ByteEncode")
        .and_then(|data| byte_encode_struct(&input.ident, &input.generics, data));
    match out {
        Ok(ts) => TokenStream::from(ts),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

/// Derive `ByteDecode`, reading fields in declaration order.
///
/// `#[sdl(skip)]` fields are filled from `Default` instead of the wire.
#[proc_macro_derive(ByteDecode, attributes(sdl))]
pub fn derive_byte_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = struct_only(&input, "ByteDecode")
        .and_then(|data| byte_decode_struct(&input.ident, &input.generics, data));
    match out {
        Ok(ts) => TokenStream::from(ts),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

/// Derive `JsonEncode` for a named-field struct, emitting one key/value
/// pair per field; nested `JsonEncode` types become sub-objects.
///
/// `#[sdl(rename = "...")]` overrides the JSON key; `#[sdl(skip)]` omits
/// the field.
#[proc_macro_derive(JsonEncode, attributes(sdl))]
pub fn derive_json_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = struct_only(&input, "JsonEncode")
        .and_then(|data| json_encode_struct(&input.ident, &input.generics, data));
    match out {
        Ok(ts) => TokenStream::from(ts),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}
