use crate::middleware::{Middleware, MiddlewareChain};
use crate::pattern::{Pattern, PatternSpec, RequestUrl, UrlTemplate};
use crate::types::{BoxFuture, Captures, Context, HandlerResult};
use crate::RouteError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

/// A type-erased route handler, shared by every entry one registration expands into.
pub(crate) type Handler<B> = Arc<dyn Fn(Context<B>) -> BoxFuture<HandlerResult> + Send + Sync + 'static>;

pub(crate) fn boxed_handler<B, H, R, E>(handler: H) -> Handler<B>
where
    H: Fn(Context<B>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
    E: Into<RouteError> + 'static,
{
    Arc::new(move |ctx: Context<B>| -> BoxFuture<HandlerResult> {
        let fut = handler(ctx);
        Box::pin(async move { fut.await.map_err(Into::into) })
    })
}

/// One row of the route table: a compiled pattern, the handler and its frozen middleware chain.
///
/// Entries are created at registration time and never change afterwards. The handler and the
/// chain are shared with the sibling entries of a domain fan-out.
pub(crate) struct RouteEntry<B> {
    pub(crate) pattern: Pattern,
    pub(crate) handler: Handler<B>,
    pub(crate) chain: MiddlewareChain<B>,
}

impl<B> RouteEntry<B> {
    pub(crate) fn matches(&self, url: &RequestUrl) -> Option<Captures> {
        self.pattern.matches(url)
    }
}

impl<B> Clone for RouteEntry<B> {
    fn clone(&self) -> Self {
        RouteEntry {
            pattern: self.pattern.clone(),
            handler: Arc::clone(&self.handler),
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<B> Debug for RouteEntry<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ pattern: {:?}, middlewares: {} }}", self.pattern, self.chain.len())
    }
}

/// Declares a route: its pattern, the HTTP methods it answers and its own middleware.
///
/// Method tokens are case-insensitive and validated when the route is registered. The
/// per-method helpers of [`RouterBuilder`](crate::RouterBuilder) accept anything convertible
/// into `RouteOptions`, typically a path, and replace its methods.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::Response;
/// use hyper::body::Bytes;
/// use routeweave::{middleware, RouteError, RouteOptions, Router};
///
/// # fn run() -> Router<Full<Bytes>> {
/// let router = Router::builder()
///     .add_route(
///         RouteOptions::new("/reports/:year")
///             .methods(["get", "post"])
///             .middleware(middleware::post(|res| async move { Ok::<_, RouteError>(res) })),
///         |ctx| async move {
///             let year = ctx.param("year").unwrap_or_default().to_owned();
///             Ok::<_, RouteError>(Response::new(Full::from(year)))
///         },
///     )
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct RouteOptions<B> {
    pub(crate) pattern: PatternSpec,
    pub(crate) methods: Vec<String>,
    pub(crate) middlewares: Vec<Arc<dyn Middleware<B>>>,
}

impl<B> RouteOptions<B> {
    pub fn new<P: Into<PatternSpec>>(pattern: P) -> RouteOptions<B> {
        RouteOptions {
            pattern: pattern.into(),
            methods: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    /// Adds an HTTP method token, e.g. `"GET"`, `"get"` or `Method::GET`.
    pub fn method<M: AsRef<str>>(mut self, method: M) -> Self {
        self.methods.push(method.as_ref().to_owned());
        self
    }

    pub fn methods<I, M>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        self.methods
            .extend(methods.into_iter().map(|m| m.as_ref().to_owned()));
        self
    }

    /// Appends a route-level middleware. It runs after the global and group middleware.
    pub fn middleware<M: Middleware<B>>(mut self, m: M) -> Self {
        self.middlewares.push(Arc::new(m));
        self
    }

    pub(crate) fn with_methods<M: AsRef<str>>(mut self, methods: &[M]) -> Self {
        self.methods = methods.iter().map(|m| m.as_ref().to_owned()).collect();
        self
    }
}

impl<B> From<&str> for RouteOptions<B> {
    fn from(path: &str) -> RouteOptions<B> {
        RouteOptions::new(path)
    }
}

impl<B> From<String> for RouteOptions<B> {
    fn from(path: String) -> RouteOptions<B> {
        RouteOptions::new(path)
    }
}

impl<B> From<UrlTemplate> for RouteOptions<B> {
    fn from(template: UrlTemplate) -> RouteOptions<B> {
        RouteOptions::new(template)
    }
}

impl<B> From<PatternSpec> for RouteOptions<B> {
    fn from(pattern: PatternSpec) -> RouteOptions<B> {
        RouteOptions::new(pattern)
    }
}

impl<B> Debug for RouteOptions<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ pattern: {:?}, methods: {:?}, middlewares: {} }}",
            self.pattern,
            self.methods,
            self.middlewares.len()
        )
    }
}
