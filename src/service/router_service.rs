use crate::router::Router;
use crate::service::request_service::{RequestService, RequestServiceBuilder};
use hyper::body::Incoming;
use hyper::service::Service;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tracing::warn;

/// A [`Service`] turning accepted TCP connections into [`RequestService`]s bound to one router.
///
/// # Examples
///
/// ```no_run
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use hyper::service::Service;
/// use hyper::Response;
/// use hyper_util::rt::{TokioExecutor, TokioIo};
/// use hyper_util::server::conn::auto::Builder;
/// use routeweave::{Context, RouteError, Router, RouterService};
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use tokio::net::TcpListener;
///
/// async fn home(_: Context) -> Result<Response<Full<Bytes>>, RouteError> {
///     Ok(Response::new(Full::from("Home page")))
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let router = Router::builder().get("/", home).build()?;
///
///     // Create a Service from the router above to handle incoming requests.
///     let service = Arc::new(RouterService::new(router));
///
///     let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
///     let listener = TcpListener::bind(addr).await?;
///
///     loop {
///         let (stream, _) = listener.accept().await?;
///         let router_service = Arc::clone(&service);
///
///         tokio::spawn(async move {
///             let request_service = match router_service.call(&stream).await {
///                 Ok(svc) => svc,
///                 Err(never) => match never {},
///             };
///
///             let io = TokioIo::new(stream);
///             if let Err(err) = Builder::new(TokioExecutor::new())
///                 .serve_connection(io, request_service)
///                 .await
///             {
///                 eprintln!("Error serving connection: {:?}", err);
///             }
///         });
///     }
/// }
/// ```
#[derive(Debug)]
pub struct RouterService {
    builder: RequestServiceBuilder<Incoming>,
}

impl RouterService {
    /// Creates a new service with the provided router, ready to be used with hyper's connection
    /// builders.
    pub fn new(router: Router) -> RouterService {
        RouterService {
            builder: RequestServiceBuilder::new(router),
        }
    }
}

impl Service<&TcpStream> for RouterService {
    type Response = RequestService<Incoming>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, conn: &TcpStream) -> Self::Future {
        let addr = conn.peer_addr().unwrap_or_else(|err| {
            warn!(error = %err, "Could not read the peer address of a connection");
            SocketAddr::from(([0, 0, 0, 0], 0))
        });

        ready(Ok(self.builder.build(addr)))
    }
}
