//! `#[derive(Request)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of the `#[request(...)]` attribute.
struct RequestArgs {
    response: Option<Type>,
}

impl Parse for RequestArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut response = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "response" => {
                    response = Some(input.parse::<Type>()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown request attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(RequestArgs { response })
    }
}

pub fn derive_request_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut response = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("request")) {
        match attr.parse_args::<RequestArgs>() {
            Ok(args) => response = args.response.or(response),
            Err(err) => return err.to_compile_error().into(),
        }
    }
    let response = response.unwrap_or_else(|| syn::parse_quote!(()));

    let expanded = quote! {
        impl #impl_generics ::mediant::Request for #name #ty_generics #where_clause {
            type Response = #response;
        }
    };

    TokenStream::from(expanded)
}
