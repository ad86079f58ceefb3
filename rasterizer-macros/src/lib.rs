use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, DeriveInput, Error, Field, Result};

/// Derives `Interpolate` for a struct with named fields by interpolating every
/// field with the same barycentric weights.
///
/// The `Interpolate` trait must be in scope where the derive is used.
#[proc_macro_derive(Interpolate)]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let derive = parse_macro_input!(input as DeriveInput);

    match generate_impl(derive) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    }
    .into()
}

struct StructInfo {
    fields: Vec<Field>,
}

impl StructInfo {
    fn from_derive_input(derive: &DeriveInput) -> Result<Self> {
        match &derive.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(syn::FieldsNamed { named, .. }),
                ..
            }) => Ok(Self {
                fields: named.iter().cloned().collect(),
            }),
            syn::Data::Struct(data) => Err(Error::new(
                data.fields.span(),
                "Interpolate can only be derived for structs with named fields",
            )),
            _ => Err(Error::new(
                derive.ident.span(),
                "Interpolate can only be derived for structs",
            )),
        }
    }
}

fn generate_field_interpolation(field: &Field) -> Result<TokenStream> {
    let name = field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new(field.span(), "field must have a name"))?;
    let ty = &field.ty;
    Ok(quote! {
        #name: <#ty as Interpolate>::interpolate(&v0.#name, &v1.#name, &v2.#name, weights)
    })
}

fn generate_impl(derive: DeriveInput) -> Result<TokenStream> {
    let struct_info = StructInfo::from_derive_input(&derive)?;

    let struct_name = &derive.ident;
    let (impl_generics, ty_generics, where_clause) = derive.generics.split_for_impl();

    let field_assignments = struct_info
        .fields
        .iter()
        .map(generate_field_interpolation)
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics Interpolate for #struct_name #ty_generics #where_clause {
            fn interpolate(v0: &Self, v1: &Self, v2: &Self, weights: ::glam::Vec3) -> Self {
                Self {
                    #(#field_assignments),*
                }
            }
        }
    })
}
