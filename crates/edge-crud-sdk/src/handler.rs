//! Handler signature and the macro for defining functions
//!
//! The host keeps a table of [`HandlerFn`] pointers, one per function, and
//! calls the matching one for every request.
//!
//! # Example
//!
//! ```ignore
//! use edge_crud_sdk::prelude::*;
//!
//! handler_result!(pub async fn handle(ctx: &Context, req: Request) -> Result<Response, HandlerError> {
//!     let rows = ctx.store.select_all("User").await?;
//!     Ok(Response::ok(json!({ "fetched": rows })))
//! });
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::{Context, Request, Response};

/// Type alias for boxed future returned by handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for the handler function signature
pub type HandlerFn = for<'a> fn(&'a Context, Request) -> BoxFuture<'a, Response>;

/// Macro for defining a handler that returns Result
///
/// Expands to a function matching [`HandlerFn`]. Errors are rendered with
/// [`HandlerError::into_response`](crate::HandlerError::into_response).
#[macro_export]
macro_rules! handler_result {
    (
        $(#[$meta:meta])*
        $vis:vis async fn $name:ident($ctx:ident: &$ctx_ty:ty, $req:ident: Request) -> Result<Response, HandlerError> $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name<'a>(
            ctx: &'a $ctx_ty,
            req: $crate::Request,
        ) -> $crate::handler::BoxFuture<'a, $crate::Response> {
            async fn inner($ctx: &$ctx_ty, $req: $crate::Request) -> ::std::result::Result<$crate::Response, $crate::HandlerError> $body

            ::std::boxed::Box::pin(async move {
                match inner(ctx, req).await {
                    Ok(response) => response,
                    Err(err) => err.into_response(),
                }
            })
        }
    };
}
