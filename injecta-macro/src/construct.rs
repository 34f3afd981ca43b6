use crate::attrs::inject_name;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

pub fn derive_construct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_construct_impl(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_construct_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "#[derive(Construct)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Construct)] can only be applied to structs",
            ));
        }
    };

    let mut names = Vec::with_capacity(fields.len());
    let mut field_injections = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        // Named fields always carry an identifier.
        let Some(field_name) = &field.ident else {
            continue;
        };
        let field_type = &field.ty;
        let name = inject_name(&field.attrs)?.unwrap_or_else(|| field_name.unraw().to_string());
        names.push(name);

        field_injections.push(quote! {
            #field_name: <#field_type as ::injecta::FromArg>::from_arg(args, #index)?
        });
    }

    let is_unit = matches!(&input.data, Data::Struct(data) if matches!(data.fields, Fields::Unit));
    let construct_body = if is_unit {
        quote! {
            let _ = args;
            ::core::result::Result::Ok(Self)
        }
    } else {
        quote! {
            ::core::result::Result::Ok(Self {
                #(#field_injections),*
            })
        }
    };

    Ok(quote! {
        impl #impl_generics ::injecta::Construct for #struct_name #ty_generics #where_clause {
            fn dependencies() -> ::core::option::Option<::std::vec::Vec<::std::string::String>> {
                ::core::option::Option::Some(::std::vec![
                    #(::std::string::String::from(#names)),*
                ])
            }

            fn construct(args: &::injecta::Args) -> ::injecta::Result<Self> {
                #construct_body
            }
        }
    })
}
