use crate::constants::{INTERNAL_SERVER_ERROR_BODY, NOT_FOUND_BODY};
use crate::data_map::DataMap;
use crate::helpers;
use crate::middleware::execute;
use crate::pattern::RequestUrl;
use crate::route::RouteEntry;
use crate::types::{BoxFuture, Context, HandlerResult, RequestInfo};
use crate::{Error, RouteError};
use futures_util::FutureExt;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

pub use self::builder::RouterBuilder;
pub use self::scope::GroupOptions;

mod builder;
mod scope;

type ErrHandlerWithoutInfo = Box<dyn Fn(RouteError) -> BoxFuture<Response<Full<Bytes>>> + Send + Sync + 'static>;
type ErrHandlerWithInfo =
    Box<dyn Fn(RouteError, RequestInfo) -> BoxFuture<Response<Full<Bytes>>> + Send + Sync + 'static>;

pub(crate) enum ErrHandler {
    WithoutInfo(ErrHandlerWithoutInfo),
    WithInfo(ErrHandlerWithInfo),
}

impl ErrHandler {
    fn should_require_req_info(&self) -> bool {
        matches!(self, ErrHandler::WithInfo(_))
    }
}

/// Represents a modular, lightweight and mountable router type.
///
/// A router holds the frozen route table: for every HTTP method, the registered routes in
/// registration order, each with its own middleware chain. It is immutable once built, so it can
/// be shared behind an `Arc` and dispatch requests from any number of tasks.
///
/// This `Router<B>` type accepts one type parameter: `B`, the request body type. It defaults to
/// [`Incoming`], the body type of requests served by hyper.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use hyper::{Request, Response, StatusCode};
/// use routeweave::{Context, RouteError, Router};
///
/// async fn home_handler(_ctx: Context<Full<Bytes>>) -> Result<Response<Full<Bytes>>, RouteError> {
///     Ok(Response::new(Full::from("home")))
/// }
///
/// # async fn run() {
/// let router = Router::builder().get("/", home_handler).build().unwrap();
///
/// let req = Request::builder().uri("/").body(Full::new(Bytes::new())).unwrap();
/// let res = router.dispatch(req).await;
/// assert_eq!(res.status(), StatusCode::OK);
///
/// let req = Request::builder().uri("/missing").body(Full::new(Bytes::new())).unwrap();
/// assert_eq!(router.dispatch(req).await.status(), StatusCode::NOT_FOUND);
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
pub struct Router<B = Incoming> {
    table: HashMap<Method, Vec<RouteEntry<B>>>,
    err_handler: Option<ErrHandler>,
    data: Arc<DataMap>,
}

impl<B: Send + 'static> Router<B> {
    /// Return a [RouterBuilder](./struct.RouterBuilder.html) instance to build a `Router`.
    pub fn builder() -> RouterBuilder<B> {
        RouterBuilder::new()
    }

    /// Dispatches a request to the first matching route and returns its response.
    ///
    /// It never fails: an unmatched request, an error returned by a handler or middleware and a
    /// panic while processing the request all go through the error handler exactly once.
    pub async fn dispatch(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let req_info = match self.err_handler {
            Some(ref handler) if handler.should_require_req_info() => {
                Some(RequestInfo::new_from_req(&req, Arc::clone(&self.data)))
            }
            _ => None,
        };

        let err: RouteError = match AssertUnwindSafe(self.process(req)).catch_unwind().await {
            Ok(Ok(res)) => return res,
            Ok(Err(err)) => err,
            Err(payload) => Error::Panicked(helpers::panic_message(payload)).into(),
        };

        self.handle_error(err, req_info).await
    }

    async fn process(&self, req: Request<B>) -> HandlerResult {
        let method = helpers::normalize_request_method(req.method());
        let url = RequestUrl::from_request(&req);

        let found = self.table.get(&method).and_then(|entries| {
            entries
                .iter()
                .find_map(|entry| entry.matches(&url).map(|captures| (entry, captures)))
        });

        match found {
            Some((entry, captures)) => {
                trace!(method = %method, url = url.href(), route = ?entry.pattern, "Matched route");
                let chain = Arc::clone(&entry.chain);
                let handler = Arc::clone(&entry.handler);
                execute(chain, handler, Context::new(captures, req, Arc::clone(&self.data))).await
            }
            None => {
                trace!(method = %method, url = url.href(), "No route matched");
                Err(Error::RouteNotFound {
                    method,
                    path: url.path().to_owned(),
                }
                .into())
            }
        }
    }

    async fn handle_error(&self, err: RouteError, req_info: Option<RequestInfo>) -> Response<Full<Bytes>> {
        match (&self.err_handler, req_info) {
            (Some(ErrHandler::WithoutInfo(handler)), _) => handler(err).await,
            (Some(ErrHandler::WithInfo(handler)), Some(req_info)) => handler(err, req_info).await,
            _ => default_error_response(err),
        }
    }
}

impl<B> Router<B> {
    /// The number of route entries registered for a method, after domain fan-out.
    pub fn route_count(&self, method: &Method) -> usize {
        self.table.get(method).map(Vec::len).unwrap_or(0)
    }
}

/// Maps an error to the response sent when no custom error handler is set. Only structured
/// errors reveal their message; anything else is logged and answered with a generic 500.
pub(crate) fn default_error_response(err: RouteError) -> Response<Full<Bytes>> {
    let (status, body) = match err.downcast_ref::<Error>() {
        Some(Error::RouteNotFound { method, path }) => {
            debug!(method = %method, path = %path, "Route not found");
            (StatusCode::NOT_FOUND, NOT_FOUND_BODY.to_owned())
        }
        Some(Error::Http { status, message }) => {
            warn!(status = %status, message = %message, "Request failed");
            (*status, message.clone())
        }
        _ => {
            error!(error = %err, "Unhandled error while processing the request");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY.to_owned())
        }
    };

    let mut res = Response::new(Full::from(body));
    *res.status_mut() = status;
    res
}

impl<B> Debug for Router<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ routes: {:?}, has_err_handler: {}, data: {:?} }}",
            self.table,
            self.err_handler.is_some(),
            self.data
        )
    }
}
