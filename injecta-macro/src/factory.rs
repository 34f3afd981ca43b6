use crate::attrs::{inject_name, strip_inject};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{
    FnArg, GenericArgument, ItemFn, LitStr, Pat, PathArguments, ReturnType, Token, Type,
    parse_macro_input,
};

/// `#[factory]` or `#[factory(name = "...")]`
struct FactoryArgs {
    name: Option<LitStr>,
}

impl Parse for FactoryArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(FactoryArgs { name: None });
        }
        let key: syn::Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new_spanned(key, "expected `name = \"...\"`"));
        }
        input.parse::<Token![=]>()?;
        let name: LitStr = input.parse()?;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after `name`"));
        }
        Ok(FactoryArgs { name: Some(name) })
    }
}

pub fn factory_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as FactoryArgs);
    let func = parse_macro_input!(item as ItemFn);

    match generate_factory(args, func) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_factory(args: FactoryArgs, mut func: ItemFn) -> syn::Result<TokenStream2> {
    let sig = &func.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[factory] functions cannot be generic",
        ));
    }
    let fn_name = sig.ident.clone();
    let fn_name_str = fn_name.unraw().to_string();
    let factory_fn = format_ident!("{}_factory", fn_name_str);
    let vis = func.vis.clone();
    let is_async = sig.asyncness.is_some();

    let output = match &sig.output {
        ReturnType::Type(_, ty) => ty.as_ref().clone(),
        ReturnType::Default => {
            return Err(syn::Error::new_spanned(
                sig,
                "#[factory] functions must return the value they produce",
            ));
        }
    };

    let mut names = Vec::new();
    let mut bindings = Vec::new();
    let mut conversions = Vec::new();

    for (index, input) in func.sig.inputs.iter_mut().enumerate() {
        let FnArg::Typed(param) = input else {
            return Err(syn::Error::new_spanned(
                input,
                "#[factory] cannot be used on methods",
            ));
        };
        let name = match inject_name(&param.attrs)? {
            Some(name) => name,
            None => match param.pat.as_ref() {
                Pat::Ident(pat) => pat.ident.unraw().to_string(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "#[factory] parameters must be plain identifiers or carry #[inject(name = \"...\")]",
                    ));
                }
            },
        };
        strip_inject(&mut param.attrs);

        let binding = format_ident!("__injecta_arg{}", index);
        let ty = &param.ty;
        conversions.push(quote! {
            let #binding = match <#ty as ::injecta::FromArg>::from_arg(args, #index) {
                ::core::result::Result::Ok(value) => value,
                ::core::result::Result::Err(err) => {
                    ::injecta::__private::tracing::warn!(
                        "Cannot call factory {}: {}", #fn_name_str, err
                    );
                    return ::core::option::Option::None;
                }
            };
        });
        names.push(name);
        bindings.push(binding);
    }

    if conversions.is_empty() {
        conversions.push(quote!(let _ = args;));
    }

    let call = quote!(#fn_name(#(#bindings),*));
    let body = if is_async {
        let settled = match result_inner(&output) {
            Some(inner) => {
                let wrapped = wrap_output(inner, quote!(value), &fn_name_str);
                quote! {
                    let value = #call.await.map_err(|err| {
                        ::injecta::__private::anyhow::Error::msg(::std::string::ToString::to_string(&err))
                    })?;
                    ::injecta::__private::anyhow::Ok(#wrapped)
                }
            }
            None => {
                let wrapped = wrap_output(&output, quote!(value), &fn_name_str);
                quote! {
                    let value = #call.await;
                    ::injecta::__private::anyhow::Ok(#wrapped)
                }
            }
        };
        quote! {
            ::core::option::Option::Some(::injecta::Produced::pending(async move {
                #settled
            }))
        }
    } else {
        wrap_output(&output, call, &fn_name_str)
    };

    let named = args.name.map(|name| quote!(.named(#name)));

    Ok(quote! {
        #func

        #vis fn #factory_fn() -> ::injecta::Factory {
            ::injecta::Factory::function(
                #fn_name_str,
                |args: &::injecta::Args| -> ::core::option::Option<::injecta::Produced> {
                    #(#conversions)*
                    #body
                },
            )
            .with_dependencies::<_, &str>([#(#names),*])
            #named
        }
    })
}

/// Last path segment of `ty` with its first generic type argument.
fn last_segment(ty: &Type) -> Option<(String, Option<&Type>)> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let first_arg = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    };
    Some((segment.ident.to_string(), first_arg))
}

fn result_inner(ty: &Type) -> Option<&Type> {
    match last_segment(ty) {
        Some((ident, inner)) if ident == "Result" => inner,
        _ => None,
    }
}

/// Expression converting `expr` of type `ty` into `Option<Produced>`.
fn wrap_output(ty: &Type, expr: TokenStream2, fn_name: &str) -> TokenStream2 {
    match last_segment(ty) {
        Some((ident, _))
            if matches!(
                ident.as_str(),
                "Produced" | "Provided" | "Components" | "Value" | "Ref"
            ) =>
        {
            quote!(::injecta::IntoProduced::into_produced(#expr))
        }
        Some((ident, Some(inner))) if ident == "Option" => {
            let wrapped = wrap_output(inner, quote!(value), fn_name);
            quote! {
                match #expr {
                    ::core::option::Option::Some(value) => #wrapped,
                    ::core::option::Option::None => ::core::option::Option::None,
                }
            }
        }
        Some((ident, Some(inner))) if ident == "Result" => {
            let wrapped = wrap_output(inner, quote!(value), fn_name);
            quote! {
                match #expr {
                    ::core::result::Result::Ok(value) => #wrapped,
                    ::core::result::Result::Err(err) => {
                        ::injecta::__private::tracing::warn!("Factory {} failed: {}", #fn_name, err);
                        ::core::option::Option::None
                    }
                }
            }
        }
        _ => quote!(::core::option::Option::Some(::injecta::Produced::value(#expr))),
    }
}
