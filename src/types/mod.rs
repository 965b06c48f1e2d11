pub use self::context::Context;
pub(crate) use self::context::RemoteAddr;
pub use self::request_info::RequestInfo;
pub use self::route_params::{Captures, RouteParams};

mod context;
mod request_info;
mod route_params;

use crate::error::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future as returned by middleware and handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What every stage of the middleware chain resolves to.
pub type HandlerResult = Result<Response<Full<Bytes>>, RouteError>;
