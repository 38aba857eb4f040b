use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, PathArguments, Type, parse_macro_input};

#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let bindery = bindery_path();
    let mut key_methods = Vec::new();
    let mut key_names = Vec::new();
    let mut to_values = Vec::new();
    let mut from_values = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        if !is_string(&field.ty) {
            return syn::Error::new_spanned(
                field.ty,
                "FormModel fields must be `String`, form values are text",
            )
            .to_compile_error()
            .into();
        }
        let field_name = field_ident.to_string();

        key_methods.push(quote! {
            pub fn #field_ident(&self) -> #bindery::form::FieldKey {
                #bindery::form::FieldKey::new(#field_name)
            }
        });
        key_names.push(quote! {
            #bindery::form::FieldKey::new(#field_name)
        });
        to_values.push(quote! {
            (
                #bindery::form::FieldKey::new(#field_name),
                ::std::clone::Clone::clone(&self.#field_ident),
            )
        });
        from_values.push(quote! {
            #field_ident: values.get(#field_name).cloned().unwrap_or_default()
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#key_methods)*
        }

        impl #bindery::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys() -> ::std::vec::Vec<#bindery::form::FieldKey> {
                ::std::vec![#(#key_names),*]
            }

            fn to_values(&self) -> ::std::vec::Vec<(#bindery::form::FieldKey, ::std::string::String)> {
                ::std::vec![#(#to_values),*]
            }

            fn from_values(
                values: &::std::collections::BTreeMap<#bindery::form::FieldKey, ::std::string::String>,
            ) -> Self {
                Self {
                    #(#from_values),*
                }
            }
        }
    }
    .into()
}

fn bindery_path() -> TokenStream2 {
    match crate_name("bindery") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::bindery),
    }
}

fn is_string(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path.path.segments.last().is_some_and(|segment| {
            segment.ident == "String" && matches!(segment.arguments, PathArguments::None)
        })
}
