//! `routeweave` is an ordered, scope-aware router with continuation-style middleware for the Rust HTTP library [hyper](https://hyper.rs/).
//!
//! Core features:
//!
//! - Routes are matched in registration order, the first match wins.
//!
//! - Nested [groups](#groups-and-domains) combine path prefixes, virtual-host domains and middleware.
//!
//! - Middleware wraps the route handler and decides whether, and with which context, the rest of
//!   the chain runs.
//!
//! - A single error boundary turns route-not-found, handler errors and panics into responses.
//!
//! - Route handlers and middleware may share state.
//!
//! - A CORS middleware ships with the crate.
//!
//! ## Basic Example
//!
//! A simple example using `routeweave` with `hyper` would look like the following:
//!
//! ```no_run
//! use http_body_util::Full;
//! use hyper::body::Bytes;
//! use hyper::service::Service;
//! use hyper::{Response, StatusCode};
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder;
//! use routeweave::{middleware, Context, RequestInfo, RouteError, Router, RouterService};
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! // Define an app state to share it across the route handlers and middlewares.
//! struct State(u64);
//!
//! // A handler for "/" page.
//! async fn home_handler(ctx: Context) -> Result<Response<Full<Bytes>>, RouteError> {
//!     // Access the app state.
//!     let state = ctx.data::<State>().unwrap();
//!     println!("State value: {}", state.0);
//!
//!     Ok(Response::new(Full::from("Home page")))
//! }
//!
//! // A handler for "/users/:userId" page.
//! async fn user_handler(ctx: Context) -> Result<Response<Full<Bytes>>, RouteError> {
//!     let user_id = ctx.param("userId").unwrap();
//!     Ok(Response::new(Full::from(format!("Hello {}", user_id))))
//! }
//!
//! // A middleware which logs an http request.
//! async fn logger(ctx: Context) -> Result<Context, RouteError> {
//!     println!("{:?} {} {}", ctx.remote_addr(), ctx.method(), ctx.uri().path());
//!     Ok(ctx)
//! }
//!
//! // Define an error handler function which will accept the `RouteError`
//! // and the request information and generates an appropriate response.
//! async fn error_handler(err: RouteError, _: RequestInfo) -> Response<Full<Bytes>> {
//!     eprintln!("{}", err);
//!     let mut res = Response::new(Full::from(format!("Something went wrong: {}", err)));
//!     *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
//!     res
//! }
//!
//! fn router() -> Router {
//!     Router::builder()
//!         // Specify the state data which will be available to every route handlers,
//!         // error handler and middlewares.
//!         .data(State(100))
//!         .middleware(middleware::pre(logger))
//!         .get("/", home_handler)
//!         .get("/users/:userId", user_handler)
//!         .err_handler_with_info(error_handler)
//!         .build()
//!         .unwrap()
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let router_service = Arc::new(RouterService::new(router()));
//!
//!     // The address on which the server will be listening.
//!     let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
//!     let listener = TcpListener::bind(addr).await?;
//!     println!("App is running on: {}", addr);
//!
//!     loop {
//!         let (stream, _) = listener.accept().await?;
//!         let router_service = Arc::clone(&router_service);
//!
//!         tokio::spawn(async move {
//!             // Get the request service for this connection.
//!             let request_service = match router_service.call(&stream).await {
//!                 Ok(svc) => svc,
//!                 Err(never) => match never {},
//!             };
//!
//!             let io = TokioIo::new(stream);
//!             let builder = Builder::new(TokioExecutor::new());
//!
//!             if let Err(err) = builder.serve_connection(io, request_service).await {
//!                 eprintln!("Error serving connection: {:?}", err);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Routing
//!
//! ### Route Handlers
//!
//! A handler is a function or closure taking the request [`Context`] and returning a future of
//! `Result<Response<Full<Bytes>>, E>` where `E` converts into [`RouteError`]:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use routeweave::{Context, Router};
//! use std::convert::Infallible;
//!
//! async fn home_handler(_: Context<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
//!     Ok(Response::new(Full::from("Home page")))
//! }
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .get("/", home_handler)
//!     .get("/about", |_| async move { Ok::<_, Infallible>(Response::new(Full::from("About page"))) })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! The per-method helpers are `get` (which answers `HEAD` too), `post`, `put`, `patch`,
//! `delete`, `options`, `head` and `all`. Any other combination of methods goes through
//! [`add_route`](RouterBuilder::add_route) with [`RouteOptions`]. Method tokens are
//! case-insensitive, both when registering and when dispatching.
//!
//! ### Route Paths
//!
//! A path is made of literal segments, `:name` parameters matching one segment, and `*name`
//! wildcards matching the rest of the path (a bare `*` is named `"0"`, `"1"` and so on).
//! Leading, trailing and duplicate slashes are ignored: `"users/"` and `"/users"` are the same
//! route.
//!
//! Request paths are percent-decoded before they are matched, and captured values are decoded
//! too. An encoded slash (`%2F`) therefore splits segments: `/users/a%2Fb` does not match
//! `/users/:name` but does match `/users/*rest`.
//!
//! Routes are tested in registration order and the first match wins, so register specific
//! routes before the general ones:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use routeweave::{Router, RouteError};
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .get("/users/me", |_| async move { Ok::<_, RouteError>(Response::new(Full::from("Me"))) })
//!     .get("/users/:userId", |ctx| async move {
//!         let user_id = ctx.param("userId").unwrap_or_default().to_owned();
//!         Ok::<_, RouteError>(Response::new(Full::from(user_id)))
//!     })
//!     .get("/files/*path", |ctx| async move {
//!         let path = ctx.param("path").unwrap_or_default().to_owned();
//!         Ok::<_, RouteError>(Response::new(Full::from(path)))
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! A route may also be declared with a [`UrlTemplate`] to restrict the protocol or the hostname,
//! or with a custom [`Matcher`] wrapped in a [`PatternSpec`].
//!
//! #### Handle 404 Pages
//!
//! An unmatched request is answered with `404 Not Found` unless an
//! [error handler](#error-handling) is set. A catch-all registered last works as well:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! use routeweave::{Router, RouteError};
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .get("/", |_| async move { Ok::<_, RouteError>(Response::new(Full::from("Home page"))) })
//!     .all("*", |_| async move {
//!         let mut res = Response::new(Full::from("Page Not Found"));
//!         *res.status_mut() = StatusCode::NOT_FOUND;
//!         Ok::<_, RouteError>(res)
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Groups and Domains
//!
//! A [group](RouterBuilder::group) registers routes under a path prefix, a set of domains and
//! group middleware. Groups nest, and a nested group adds to what its parents declared. A route
//! registered under several domains answers on each of them:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use routeweave::{GroupOptions, Router, RouteError};
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .scope("/api", |api| {
//!         api.scope("/v1", |v1| {
//!             // Matches `/api/v1/users` only.
//!             v1.get("/users", |_| async move { Ok::<_, RouteError>(Response::new(Full::from("v1"))) });
//!         });
//!     })
//!     .group(GroupOptions::new().domains(["a.test", ":tenant.b.test"]), |hosts| {
//!         hosts.get("/", |ctx| async move {
//!             let tenant = ctx.param("tenant").unwrap_or("none").to_owned();
//!             Ok::<_, RouteError>(Response::new(Full::from(tenant)))
//!         });
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ## Middleware
//!
//! A middleware receives the [`Context`] and a [`Next`] continuation, and decides if and how the
//! rest of the chain runs. Refer to the [`middleware`] module for the contract.
//!
//! Middleware is registered at three levels and wraps the handler in this order, the first one
//! outermost: global middleware, group middleware (outer groups first), route middleware. Each
//! route keeps the chain it was registered with, so global middleware registered later only
//! applies to the routes registered after it.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, header::HeaderValue, Response, StatusCode};
//! use routeweave::{middleware, GroupOptions, RouteError, Router};
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     // Runs around every route registered below.
//!     .middleware(middleware::post(|mut res| async move {
//!         res.headers_mut().insert("x-served-by", HeaderValue::from_static("routeweave"));
//!         Ok::<_, RouteError>(res)
//!     }))
//!     .group(
//!         GroupOptions::new()
//!             .prefix("/admin")
//!             // Short-circuits when the token is missing; the route never runs.
//!             .middleware(middleware::from_fn(|ctx, next| async move {
//!                 if ctx.headers().contains_key("x-admin-token") {
//!                     return next.run(ctx).await;
//!                 }
//!                 let mut res = Response::new(Full::from("Forbidden"));
//!                 *res.status_mut() = StatusCode::FORBIDDEN;
//!                 Ok::<_, RouteError>(res)
//!             })),
//!         |admin| {
//!             admin.get("/stats", |_| async move { Ok::<_, RouteError>(Response::new(Full::from("42"))) });
//!         },
//!     )
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! [`middleware::pre`] and [`middleware::post`] build middleware which only look at the request
//! or only at the response. [`CorsMiddleware`](middleware::CorsMiddleware) answers CORS
//! preflights and decorates responses with the CORS headers.
//!
//! ## Data and State Sharing
//!
//! Data registered with [`RouterBuilder::data`] is available to every handler and middleware via
//! [`Context::data`] and to the error handler via [`RequestInfo::data`], one value per type:
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response};
//! use routeweave::{Router, RouteError};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct Hits(AtomicU64);
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .data(Hits(AtomicU64::new(0)))
//!     .get("/", |ctx| async move {
//!         let hits = ctx.data::<Hits>().map(|h| h.0.fetch_add(1, Ordering::Relaxed) + 1).unwrap_or(0);
//!         Ok::<_, RouteError>(Response::new(Full::from(hits.to_string())))
//!     })
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ## Error Handling
//!
//! Every failure ends up in one place: a route that was not found, an error returned by a handler
//! or a middleware, and a panic while processing the request. Without a custom handler the
//! router answers `404 Not Found`, the status and message of an [`Error::Http`], or a generic
//! `500 Internal Server Error` which never reveals the underlying error.
//!
//! ```
//! use http_body_util::Full;
//! use hyper::{body::Bytes, Response, StatusCode};
//! use routeweave::{Error, RouteError, Router};
//!
//! async fn error_handler(err: RouteError) -> Response<Full<Bytes>> {
//!     let status = err.downcast_ref::<Error>().map(Error::status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
//!     let mut res = Response::new(Full::from(format!("Something went wrong: {}", err)));
//!     *res.status_mut() = status;
//!     res
//! }
//!
//! # fn run() -> Router<Full<Bytes>> {
//! let router = Router::builder()
//!     .get("/", |_| async move {
//!         Err::<Response<Full<Bytes>>, _>(Error::http(StatusCode::UNAUTHORIZED, "Missing token"))
//!     })
//!     .err_handler(error_handler)
//!     .build()
//!     .unwrap();
//! # router
//! # }
//! # run();
//! ```
//!
//! ### Error Handling with Request Info
//!
//! [`err_handler_with_info`](RouterBuilder::err_handler_with_info) also passes the
//! [`RequestInfo`] of the failed request, a snapshot of the request head taken before dispatch.

pub use self::error::{Error, RouteError};
pub use self::middleware::{Middleware, Next, PostMiddleware, PreMiddleware};
pub use self::pattern::{Matcher, PatternSpec, RequestUrl, UrlTemplate};
pub use self::route::RouteOptions;
pub use self::router::{GroupOptions, Router, RouterBuilder};
#[doc(hidden)]
pub use self::service::RequestService;
pub use self::service::RequestServiceBuilder;
pub use self::service::RouterService;
pub use self::types::{BoxFuture, Captures, Context, HandlerResult, RequestInfo, RouteParams};

mod constants;
mod data_map;
mod error;
mod helpers;
pub mod middleware;
mod pattern;
pub mod prelude;
mod regex_generator;
mod route;
mod router;
mod service;
mod types;

/// A Result type often returned from route handlers and middleware.
pub type Result<T> = std::result::Result<T, RouteError>;
