use crate::constants::ALL_METHODS;
use crate::data_map::DataMap;
use crate::helpers;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::route::{self, Handler, RouteEntry, RouteOptions};
use crate::router::scope::{GroupOptions, ScopeStack};
use crate::router::{ErrHandler, Router};
use crate::types::{BoxFuture, Context, RequestInfo};
use crate::{Error, RouteError};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Response};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;

/// Builder for the [`Router`](./struct.Router.html) type.
///
/// This `RouterBuilder<B>` type accepts one type parameter: `B`, the request body type the
/// route handlers and middleware receive. It defaults to [`Incoming`], the body of requests
/// served by hyper.
///
/// Routes are appended to a per-method list in registration order and the first matching one
/// wins. Each registration freezes its middleware chain: the global middleware registered so
/// far, then the middleware of the enclosing groups (outer first), then the route's own.
///
/// A registration which can not be compiled (a bad pattern, method or domain) is recorded and
/// returned by [`build`](#method.build); registrations after it are ignored.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use hyper::Response;
/// use routeweave::{RouteError, Router, RouterBuilder};
///
/// async fn home_handler<B>(_ctx: routeweave::Context<B>) -> Result<Response<Full<Bytes>>, RouteError> {
///     Ok(Response::new(Full::from("home")))
/// }
///
/// async fn upload_handler<B>(_ctx: routeweave::Context<B>) -> Result<Response<Full<Bytes>>, RouteError> {
///     Ok(Response::new(Full::from("uploaded")))
/// }
///
/// # fn run() -> Router<Full<Bytes>> {
/// // Use Router::builder() method to create a new RouterBuilder instance.
/// // We will use the default request body type `Incoming` in real servers; the tests and
/// // examples here use `Full<Bytes>`.
/// let router: Router<Full<Bytes>> = Router::builder()
///     .get("/users", home_handler)
///     .post("/upload", upload_handler)
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct RouterBuilder<B = Incoming> {
    table: HashMap<Method, Vec<RouteEntry<B>>>,
    global_middlewares: Vec<Arc<dyn Middleware<B>>>,
    scopes: ScopeStack<B>,
    data: DataMap,
    err_handler: Option<ErrHandler>,
    error: Option<Error>,
}

impl<B: Send + 'static> RouterBuilder<B> {
    /// Creates a new `RouterBuilder` instance with default options.
    pub fn new() -> RouterBuilder<B> {
        RouterBuilder {
            table: HashMap::new(),
            global_middlewares: Vec::new(),
            scopes: ScopeStack::new(),
            data: DataMap::new(),
            err_handler: None,
            error: None,
        }
    }

    /// Creates a new [`Router`](./struct.Router.html) instance from the registered routes.
    ///
    /// The builder is left empty: routes, global middleware, open groups, data and the error
    /// handler all move into the router.
    pub fn build(&mut self) -> Result<Router<B>, Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let table = mem::take(&mut self.table);
        self.global_middlewares.clear();
        self.scopes = ScopeStack::new();
        debug!(
            routes = table.values().map(Vec::len).sum::<usize>(),
            methods = table.len(),
            "Router built"
        );

        Ok(Router {
            table,
            err_handler: self.err_handler.take(),
            data: Arc::new(mem::take(&mut self.data)),
        })
    }

    /// Appends a global middleware.
    ///
    /// It wraps every route registered after this call, outside the group and route middleware.
    /// Routes registered before it are not affected.
    pub fn middleware<M: Middleware<B>>(&mut self, m: M) -> &mut Self {
        self.global_middlewares.push(Arc::new(m));
        self
    }

    /// Shares data with every route handler, middleware and the error handler, one value per
    /// type. Read it back with [`Context::data`](./struct.Context.html#method.data) or
    /// [`RequestInfo::data`](./struct.RequestInfo.html#method.data).
    pub fn data<T: Send + Sync + 'static>(&mut self, data: T) -> &mut Self {
        self.data.insert(data);
        self
    }

    /// Registers the routes of `f` under the prefix, domains and middleware of `options`,
    /// combined with those of the enclosing groups.
    ///
    /// Groups nest without limit. The group's scope is left when `f` returns or unwinds.
    pub fn group<F>(&mut self, options: GroupOptions<B>, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouterBuilder<B>),
    {
        if self.error.is_some() {
            return self;
        }

        if let Err(err) = self.scopes.enter(options) {
            self.error = Some(err);
            return self;
        }

        {
            let mut guard = ScopeGuard { builder: &mut *self };
            f(&mut guard);
        }

        self
    }

    /// Shorthand for a [`group`](#method.group) with only a path prefix.
    pub fn scope<P, F>(&mut self, prefix: P, f: F) -> &mut Self
    where
        P: Into<String>,
        F: FnOnce(&mut RouterBuilder<B>),
    {
        self.group(GroupOptions::new().prefix(prefix), f)
    }

    /// Registers a route for the methods listed in `options`.
    pub fn add_route<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.register(options.into(), route::boxed_handler(handler))
    }

    /// Adds a new route with `GET` method and the handler at the specified path. The route
    /// answers `HEAD` requests too.
    pub fn get<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::GET, Method::HEAD], options, handler)
    }

    /// Adds a new route with `POST` method and the handler at the specified path.
    pub fn post<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::POST], options, handler)
    }

    /// Adds a new route with `PUT` method and the handler at the specified path.
    pub fn put<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::PUT], options, handler)
    }

    /// Adds a new route with `PATCH` method and the handler at the specified path.
    pub fn patch<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::PATCH], options, handler)
    }

    /// Adds a new route with `DELETE` method and the handler at the specified path.
    pub fn delete<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::DELETE], options, handler)
    }

    /// Adds a new route with `OPTIONS` method and the handler at the specified path.
    pub fn options<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::OPTIONS], options, handler)
    }

    /// Adds a new route with `HEAD` method and the handler at the specified path.
    pub fn head<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&[Method::HEAD], options, handler)
    }

    /// Adds a new route with all the common HTTP methods and the handler at the specified path.
    pub fn all<O, H, R, E>(&mut self, options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        self.with_methods(&ALL_METHODS, options, handler)
    }

    /// Adds a handler to handle any error raised by the routes or any middlewares. Please refer to
    /// the [Error Handling](./index.html#error-handling) section for more info.
    ///
    /// Without one, the router answers `404 Not Found` for unmatched requests, the status and
    /// message of an [`Error::Http`](./enum.Error.html#variant.Http) and
    /// `500 Internal Server Error` for anything else.
    pub fn err_handler<H, R>(&mut self, handler: H) -> &mut Self
    where
        H: Fn(RouteError) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        let handler = move |err: RouteError| -> BoxFuture<Response<Full<Bytes>>> { Box::pin(handler(err)) };
        self.err_handler = Some(ErrHandler::WithoutInfo(Box::new(handler)));
        self
    }

    /// Like [`err_handler`](#method.err_handler), but the handler also receives the
    /// [`RequestInfo`](./struct.RequestInfo.html) of the failed request.
    pub fn err_handler_with_info<H, R>(&mut self, handler: H) -> &mut Self
    where
        H: Fn(RouteError, RequestInfo) -> R + Send + Sync + 'static,
        R: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        let handler = move |err: RouteError, req_info: RequestInfo| -> BoxFuture<Response<Full<Bytes>>> {
            Box::pin(handler(err, req_info))
        };
        self.err_handler = Some(ErrHandler::WithInfo(Box::new(handler)));
        self
    }

    fn with_methods<O, H, R, E>(&mut self, methods: &[Method], options: O, handler: H) -> &mut Self
    where
        O: Into<RouteOptions<B>>,
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Response<Full<Bytes>>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        let options = options.into().with_methods(methods);
        self.register(options, route::boxed_handler(handler))
    }

    fn register(&mut self, options: RouteOptions<B>, handler: Handler<B>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        if let Err(err) = self.try_register(options, handler) {
            self.error = Some(err);
        }

        self
    }

    fn try_register(&mut self, options: RouteOptions<B>, handler: Handler<B>) -> Result<(), Error> {
        if options.methods.is_empty() {
            return Err(Error::InvalidMethod(String::new()));
        }

        let mut methods: Vec<Method> = Vec::with_capacity(options.methods.len());
        for token in options.methods.iter() {
            let method = helpers::normalize_method(token)?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        let scope = self.scopes.current();
        let patterns = options.pattern.compile(&scope.prefix, &scope.hostnames)?;

        let chain: MiddlewareChain<B> = self
            .global_middlewares
            .iter()
            .chain(scope.middlewares.iter())
            .chain(options.middlewares.iter())
            .cloned()
            .collect();

        for method in methods {
            let entries = self.table.entry(method.clone()).or_default();
            for pattern in patterns.iter() {
                debug!(method = %method, pattern = ?pattern, middlewares = chain.len(), "Registered route");
                entries.push(RouteEntry {
                    pattern: pattern.clone(),
                    handler: Arc::clone(&handler),
                    chain: Arc::clone(&chain),
                });
            }
        }

        Ok(())
    }
}

impl<B: Send + 'static> Default for RouterBuilder<B> {
    fn default() -> Self {
        RouterBuilder::new()
    }
}

impl<B> Debug for RouterBuilder<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ routes: {:?}, global_middlewares: {}, scope_depth: {}, data: {:?}, error: {:?} }}",
            self.table,
            self.global_middlewares.len(),
            self.scopes.depth(),
            self.data,
            self.error
        )
    }
}

/// Leaves the group's scope when dropped, also while unwinding from a panic in the group block.
struct ScopeGuard<'a, B> {
    builder: &'a mut RouterBuilder<B>,
}

impl<B> Deref for ScopeGuard<'_, B> {
    type Target = RouterBuilder<B>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<B> DerefMut for ScopeGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl<B> Drop for ScopeGuard<'_, B> {
    fn drop(&mut self) {
        self.builder.scopes.exit();
    }
}
