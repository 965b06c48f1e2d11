//! Middleware: units of cross-cutting behavior wrapped around route handlers.
//!
//! A middleware receives the request [`Context`](crate::Context) and a [`Next`] continuation.
//! Calling [`Next::run`] executes the rest of the chain (the remaining middleware and then the
//! route handler) and yields its response. A middleware may
//!
//! - return a response without calling `next`, so nothing downstream runs,
//! - pass a replacement context to `next`,
//! - transform the response returned by `next`,
//! - inspect an error returned by `next` and recover from it.
//!
//! Middleware is attached globally with [`RouterBuilder::middleware`](crate::RouterBuilder::middleware),
//! per group with [`GroupOptions::middleware`](crate::GroupOptions::middleware) and per route with
//! [`RouteOptions::middleware`](crate::RouteOptions::middleware). The resulting order is global,
//! then group (outer to inner), then route, with the first one outermost.
//!
//! # Examples
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, header::HeaderValue, Response};
//! use routeweave::middleware;
//! use routeweave::Router;
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .middleware(middleware::from_fn(|ctx, next| async move {
//!         let mut res = next.run(ctx).await?;
//!         res.headers_mut().insert("x-powered-by", HeaderValue::from_static("routeweave"));
//!         Ok::<_, routeweave::RouteError>(res)
//!     }))
//!     .get("/", |_| async move { Ok::<_, routeweave::RouteError>(Response::new(Full::from("Home"))) })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```

use crate::types::{BoxFuture, Context, HandlerResult, RequestInfo};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

pub use self::cors::{AllowHeaders, AllowOrigin, CorsMiddleware, CorsOptions};
pub use self::next::Next;
pub use self::post::PostMiddleware;
pub use self::pre::PreMiddleware;

pub(crate) use self::next::{execute, MiddlewareChain};

mod cors;
mod next;
mod post;
mod pre;

/// The middleware contract.
///
/// Implement it for types carrying configuration, like [`CorsMiddleware`]; use [`from_fn`],
/// [`pre`] or [`post`] for closures.
pub trait Middleware<B>: Send + Sync + 'static {
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult>;
}

impl<B, M> Middleware<B> for Arc<M>
where
    M: Middleware<B> + ?Sized,
{
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult> {
        (**self).call(ctx, next)
    }
}

/// A middleware built from a closure with [`from_fn`].
pub struct FnMiddleware<F> {
    handler: F,
}

/// Creates a middleware from an async function or closure taking the context and the
/// continuation.
pub fn from_fn<B, F, R, E>(handler: F) -> FnMiddleware<F>
where
    F: Fn(Context<B>, Next<B>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    FnMiddleware { handler }
}

impl<B, F, R, E> Middleware<B> for FnMiddleware<F>
where
    F: Fn(Context<B>, Next<B>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult> {
        let fut = (self.handler)(ctx, next);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

impl<F> Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("FnMiddleware")
    }
}

/// Creates a middleware which transforms the context before the rest of the chain runs.
/// Refer to [`PreMiddleware`].
pub fn pre<B, H, R, E>(handler: H) -> PreMiddleware<B>
where
    B: Send + 'static,
    H: Fn(Context<B>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Context<B>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    PreMiddleware::new(handler)
}

/// Creates a middleware which transforms the response after the rest of the chain ran.
/// Refer to [`PostMiddleware`].
pub fn post<H, R, E>(handler: H) -> PostMiddleware
where
    H: Fn(Response<Full<Bytes>>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    PostMiddleware::new(handler)
}

/// Like [`post`], but the handler also receives the [`RequestInfo`] of the request.
pub fn post_with_info<H, R, E>(handler: H) -> PostMiddleware
where
    H: Fn(Response<Full<Bytes>>, RequestInfo) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    PostMiddleware::new_with_info(handler)
}
