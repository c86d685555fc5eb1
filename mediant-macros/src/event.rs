//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of the `#[event(...)]` attribute.
struct EventArgs {
    name: Option<LitStr>,
}

impl Parse for EventArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "event name must not be empty"));
                    }
                    name = Some(lit);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown event attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(EventArgs { name })
    }
}

pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut name = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("event")) {
        match attr.parse_args::<EventArgs>() {
            Ok(args) => name = args.name.or(name),
            Err(err) => return err.to_compile_error().into(),
        }
    }
    let name = name.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    let expanded = quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Name this event is published and subscribed under.
            pub const EVENT_NAME: &'static str = #name;
        }

        impl #impl_generics ::mediant::Event for #ident #ty_generics #where_clause {
            fn name(&self) -> &str {
                Self::EVENT_NAME
            }
        }
    };

    TokenStream::from(expanded)
}
