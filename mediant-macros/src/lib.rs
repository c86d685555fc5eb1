//! Derive macros for `mediant`.
//!
//! - `#[derive(Request)]` with an optional `#[request(response = Type)]`
//! - `#[derive(Event)]` with an optional `#[event(name = "...")]`

use proc_macro::TokenStream;

mod event;
mod request;

/// Derive macro for implementing the `Request` trait.
///
/// The response type defaults to `()`.
///
/// ```rust,ignore
/// #[derive(Request)]
/// #[request(response = OrderId)]
/// struct CreateOrder { sku: String }
/// ```
#[proc_macro_derive(Request, attributes(request))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    request::derive_request_impl(input)
}

/// Derive macro for implementing the `Event` trait.
///
/// The event name defaults to the type name. It is also exposed as the
/// associated constant `EVENT_NAME`, for use when subscribing.
///
/// ```rust,ignore
/// #[derive(Event)]
/// #[event(name = "order.shipped")]
/// struct OrderShipped { id: u64 }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}
