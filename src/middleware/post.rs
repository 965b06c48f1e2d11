use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, Context, HandlerResult, RequestInfo};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type HandlerWithoutInfo = Arc<dyn Fn(Response<Full<Bytes>>) -> BoxFuture<HandlerResult> + Send + Sync + 'static>;
type HandlerWithInfo = Arc<dyn Fn(Response<Full<Bytes>>, RequestInfo) -> BoxFuture<HandlerResult> + Send + Sync + 'static>;

/// A middleware which only looks at the way out: its handler receives the response produced by
/// the rest of the chain and returns the (possibly transformed) response.
///
/// Errors from downstream pass through untouched; the handler only sees successful responses.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::{body::Bytes, header::HeaderValue};
/// use routeweave::{middleware, Router};
/// use std::convert::Infallible;
///
/// # fn run() -> Router<Full<Bytes>> {
/// let router = Router::builder()
///     .middleware(middleware::post(|mut res| async move {
///         res.headers_mut().insert("x-my-custom-header", HeaderValue::from_static("my-value"));
///         Ok::<_, Infallible>(res)
///     }))
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct PostMiddleware {
    handler: Handler,
}

enum Handler {
    WithoutInfo(HandlerWithoutInfo),
    WithInfo(HandlerWithInfo),
}

impl PostMiddleware {
    pub fn new<H, R, E>(handler: H) -> PostMiddleware
    where
        H: Fn(Response<Full<Bytes>>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        let handler: HandlerWithoutInfo = Arc::new(move |res: Response<Full<Bytes>>| -> BoxFuture<HandlerResult> {
            let fut = handler(res);
            Box::pin(async move { fut.await.map_err(Into::into) })
        });

        PostMiddleware {
            handler: Handler::WithoutInfo(handler),
        }
    }

    /// Creates a post middleware whose handler also receives the [request info](crate::RequestInfo),
    /// e.g. to set session cookies based on the request headers.
    pub fn new_with_info<H, R, E>(handler: H) -> PostMiddleware
    where
        H: Fn(Response<Full<Bytes>>, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        let handler: HandlerWithInfo = Arc::new(
            move |res: Response<Full<Bytes>>, req_info: RequestInfo| -> BoxFuture<HandlerResult> {
                let fut = handler(res, req_info);
                Box::pin(async move { fut.await.map_err(Into::into) })
            },
        );

        PostMiddleware {
            handler: Handler::WithInfo(handler),
        }
    }

    pub(crate) fn should_require_req_info(&self) -> bool {
        matches!(self.handler, Handler::WithInfo(_))
    }
}

impl<B: Send + 'static> Middleware<B> for PostMiddleware {
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult> {
        // The request is moved down the chain, so the info is taken on the way in.
        let handler = match self.handler {
            Handler::WithoutInfo(ref h) => Pending::WithoutInfo(Arc::clone(h)),
            Handler::WithInfo(ref h) => Pending::WithInfo(
                Arc::clone(h),
                RequestInfo::new_from_req(ctx.request(), ctx.shared_data()),
            ),
        };

        Box::pin(async move {
            let res = next.run(ctx).await?;
            match handler {
                Pending::WithoutInfo(h) => h(res).await,
                Pending::WithInfo(h, req_info) => h(res, req_info).await,
            }
        })
    }
}

enum Pending {
    WithoutInfo(HandlerWithoutInfo),
    WithInfo(HandlerWithInfo, RequestInfo),
}

impl Debug for PostMiddleware {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ with_info: {} }}", self.should_require_req_info())
    }
}
