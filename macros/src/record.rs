//! Implementation of `#[derive(Record)]`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

pub fn derive_record_impl(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let fields = match parse_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };

    if let Err(err) = check_collisions(&fields) {
        return err.to_compile_error().into();
    }

    generate_code(&input.ident, &fields).into()
}

/// An exported field
struct FieldInfo {
    ident: syn::Ident,
    ty: Type,
    /// Exported name, before lowercasing
    name: String,
}

impl FieldInfo {
    fn binding(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

fn parse_fields(input: &DeriveInput) -> syn::Result<Vec<FieldInfo>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic types",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Record requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut fields = Vec::new();
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let mut skip = false;
        let mut name = ident.to_string().trim_start_matches("r#").to_string();

        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("rename must not be empty"));
                    }
                    name = value.value();
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }

        if !skip {
            fields.push(FieldInfo {
                ident,
                ty: field.ty.clone(),
                name,
            });
        }
    }
    Ok(fields)
}

fn check_collisions(fields: &[FieldInfo]) -> syn::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        let binding = field.binding();
        if let Some(first) = fields[..i].iter().find(|f| f.binding() == binding) {
            return Err(syn::Error::new_spanned(
                &field.ident,
                format!(
                    "fields `{}` and `{}` both bind as `{}`",
                    first.name, field.name, binding
                ),
            ));
        }
    }
    Ok(())
}

fn generate_code(name: &syn::Ident, fields: &[FieldInfo]) -> TokenStream2 {
    let type_name = name.to_string();

    let descriptor_fields = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let field_name = &field.name;
        quote! {
            .field(
                #field_name,
                <#ty as ::scena_core::ToValue>::KIND,
                |record: &#name| ::scena_core::ToValue::to_value(&record.#ident),
            )
        }
    });

    let field_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let binding = field.binding();
        quote! {
            #binding => ::core::option::Option::Some(::scena_core::ToValue::to_value(&self.#ident)),
        }
    });

    quote! {
        impl ::scena_core::Record for #name {
            fn descriptor() -> &'static ::scena_core::RecordDescriptor<Self> {
                static DESCRIPTOR: ::scena_core::__private::OnceCell<
                    ::scena_core::RecordDescriptor<#name>,
                > = ::scena_core::__private::OnceCell::new();
                DESCRIPTOR.get_or_init(|| {
                    match ::scena_core::RecordDescriptor::builder(#type_name)
                        #(#descriptor_fields)*
                        .build()
                    {
                        ::core::result::Result::Ok(descriptor) => descriptor,
                        // Collisions are rejected during expansion.
                        ::core::result::Result::Err(err) => ::core::panic!("{}", err),
                    }
                })
            }
        }

        impl ::scena_core::HostObject for #name {
            fn field(&self, name: &str) -> ::core::option::Option<::scena_core::Value> {
                match name {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
