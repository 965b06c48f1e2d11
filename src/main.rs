use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::{Response, StatusCode};
use hyper_util::rt::TokioIo;
use routeweave::middleware::{self, CorsMiddleware, CorsOptions};
use routeweave::{Context, Error, GroupOptions, RequestInfo, RouteError, Router, RouterService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Define an app state to share it across the route handlers and middlewares.
struct State(u64);

// A handler for "/" page.
async fn home_handler(ctx: Context) -> Result<Response<Full<Bytes>>, RouteError> {
    let state = ctx.data::<State>().map(|s| s.0).unwrap_or_default();
    Ok(Response::new(Full::from(format!("Home page, state value: {}", state))))
}

// A handler for "/api/users/:userId" page.
async fn user_handler(ctx: Context) -> Result<Response<Full<Bytes>>, RouteError> {
    match ctx.param("userId") {
        Some("0") => Err(Error::http(StatusCode::NOT_FOUND, "No such user").into()),
        Some(user_id) => Ok(Response::new(Full::from(format!("Hello {}", user_id)))),
        None => Err(Error::http(StatusCode::BAD_REQUEST, "Missing user id").into()),
    }
}

// A middleware which logs an http request.
async fn logger(ctx: Context) -> Result<Context, RouteError> {
    info!(remote_addr = ?ctx.remote_addr(), method = %ctx.method(), path = ctx.uri().path(), "Request");
    Ok(ctx)
}

// Logs the failure and falls back to the status of structured errors.
async fn error_handler(err: RouteError, req_info: RequestInfo) -> Response<Full<Bytes>> {
    let status = match err.downcast_ref::<Error>() {
        Some(err) => err.status(),
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, method = %req_info.method(), uri = %req_info.uri(), "Request failed");

    let mut res = Response::new(Full::from(status.canonical_reason().unwrap_or("Error")));
    *res.status_mut() = status;
    res
}

fn router() -> Result<Router, Error> {
    let cors = CorsMiddleware::new(
        CorsOptions::new()
            .allow_origins(["http://localhost:8080"])
            .allow_credentials(true)
            .max_age(600),
    )?;

    Router::builder()
        .data(State(100))
        .middleware(middleware::pre(logger))
        .get("/", home_handler)
        .group(GroupOptions::new().prefix("/api").middleware(cors), |api| {
            api.options("*", |_| async move { Ok::<_, RouteError>(Response::new(Full::new(Bytes::new()))) })
                .get("/users/:userId", user_handler);
        })
        .err_handler_with_info(error_handler)
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let service = Arc::new(RouterService::new(router()?));

    // The address on which the server will be listening.
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "App is running");

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                error!(error = %err, "Error accepting connection");
                continue;
            }
        };

        let service = Arc::clone(&service);
        tokio::task::spawn(async move {
            let request_service = match service.call(&stream).await {
                Ok(svc) => svc,
                Err(never) => match never {},
            };

            let io = TokioIo::new(stream);
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, request_service)
                .await
            {
                error!(error = %err, "Error serving connection");
            }
        });
    }
}
