use crate::router::Router;
use crate::types::{BoxFuture, RemoteAddr};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{service::Service, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// The per-connection [`Service`] which dispatches every request of the connection to the router.
///
/// It records the peer address in the request extensions, readable with
/// [`Context::remote_addr`](./struct.Context.html#method.remote_addr).
#[derive(Debug)]
pub struct RequestService<B> {
    pub(crate) router: Arc<Router<B>>,
    pub(crate) remote_addr: SocketAddr,
}

impl<B: Send + 'static> Service<Request<B>> for RequestService<B> {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn call(&self, mut req: Request<B>) -> Self::Future {
        let router = Arc::clone(&self.router);
        req.extensions_mut().insert(RemoteAddr(self.remote_addr));

        Box::pin(async move { Ok(router.dispatch(req).await) })
    }
}

/// Creates a [`RequestService`] per connection, all sharing one router.
#[derive(Debug)]
pub struct RequestServiceBuilder<B> {
    router: Arc<Router<B>>,
}

impl<B: Send + 'static> RequestServiceBuilder<B> {
    pub fn new(router: Router<B>) -> Self {
        RequestServiceBuilder {
            router: Arc::new(router),
        }
    }

    pub fn build(&self, remote_addr: SocketAddr) -> RequestService<B> {
        RequestService {
            router: Arc::clone(&self.router),
            remote_addr,
        }
    }
}
