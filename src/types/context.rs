use crate::data_map::DataMap;
use crate::types::{Captures, RouteParams};
use hyper::body::Incoming;
use hyper::{HeaderMap, Method, Request, Uri};
use std::fmt::{self, Debug, Formatter};
use std::net::SocketAddr;
use std::sync::Arc;

/// The peer address of a connection, recorded in the request extensions by
/// [`RequestService`](./struct.RequestService.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RemoteAddr(pub(crate) SocketAddr);

/// The per-dispatch value handed through the middleware chain to the route handler.
///
/// It owns the request together with the [`Captures`](./struct.Captures.html) of the matched
/// route. A middleware receives the context by value and passes it (or a replacement) on to
/// [`Next::run`](./struct.Next.html#method.run); nothing flows back upstream except the response.
pub struct Context<B = Incoming> {
    captures: Captures,
    request: Request<B>,
    data: Arc<DataMap>,
}

impl<B> Context<B> {
    pub(crate) fn new(captures: Captures, request: Request<B>, data: Arc<DataMap>) -> Context<B> {
        Context {
            captures,
            request,
            data,
        }
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn params(&self) -> &RouteParams {
        self.captures.params()
    }

    /// Returns the value of a route parameter, e.g. `ctx.param("userId")` for `/users/:userId`.
    pub fn param<P: AsRef<str>>(&self, param_name: P) -> Option<&str> {
        self.captures.params().get(param_name)
    }

    /// The full URL the route pattern matched.
    pub fn url(&self) -> &str {
        self.captures.url()
    }

    pub fn request(&self) -> &Request<B> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<B> {
        &mut self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Access data which was shared by the [`RouterBuilder::data`](./struct.RouterBuilder.html#method.data) method.
    pub fn data<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.data.get::<T>()
    }

    pub(crate) fn shared_data(&self) -> Arc<DataMap> {
        Arc::clone(&self.data)
    }

    /// The peer address, if the request came in through a [`RouterService`](./struct.RouterService.html).
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.request.extensions().get::<RemoteAddr>().map(|addr| addr.0)
    }

    /// Builds a replacement context carrying the same captures and shared data but a different
    /// request, for downstream stages.
    pub fn with_request(self, request: Request<B>) -> Context<B> {
        Context {
            captures: self.captures,
            request,
            data: self.data,
        }
    }

    /// Builds a replacement context with different captures.
    pub fn with_captures(self, captures: Captures) -> Context<B> {
        Context {
            captures,
            request: self.request,
            data: self.data,
        }
    }

    pub fn into_request(self) -> Request<B> {
        self.request
    }

    pub fn into_parts(self) -> (Captures, Request<B>) {
        (self.captures, self.request)
    }
}

impl<B> Debug for Context<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ method: {:?}, uri: {:?}, captures: {:?} }}",
            self.request.method(),
            self.request.uri(),
            self.captures
        )
    }
}
