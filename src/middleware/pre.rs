use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, Context, HandlerResult};
use crate::RouteError;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

type Handler<B> = Arc<dyn Fn(Context<B>) -> HandlerReturn<B> + Send + Sync + 'static>;
type HandlerReturn<B> = BoxFuture<Result<Context<B>, RouteError>>;

/// A middleware which only looks at the way in: its handler receives the context and returns the
/// context (possibly a transformed one) the rest of the chain runs with.
///
/// An error returned by the handler stops the chain and goes to the error handler.
///
/// # Examples
///
/// ```
/// use http_body_util::Full;
/// use hyper::body::Bytes;
/// use routeweave::{middleware, Router};
/// use std::convert::Infallible;
///
/// # fn run() -> Router<Full<Bytes>> {
/// let router = Router::builder()
///     .middleware(middleware::pre(|ctx| async move {
///         println!("{} {}", ctx.method(), ctx.uri().path());
///         Ok::<_, Infallible>(ctx)
///     }))
///     .build()
///     .unwrap();
/// # router
/// # }
/// # run();
/// ```
pub struct PreMiddleware<B> {
    handler: Handler<B>,
}

impl<B: Send + 'static> PreMiddleware<B> {
    pub fn new<H, R, E>(handler: H) -> PreMiddleware<B>
    where
        H: Fn(Context<B>) -> R + Send + Sync + 'static,
        R: Future<Output = Result<Context<B>, E>> + Send + 'static,
        E: Into<RouteError> + 'static,
    {
        let handler: Handler<B> = Arc::new(move |ctx: Context<B>| -> HandlerReturn<B> {
            let fut = handler(ctx);
            Box::pin(async move { fut.await.map_err(Into::into) })
        });

        PreMiddleware { handler }
    }
}

impl<B: Send + 'static> Middleware<B> for PreMiddleware<B> {
    fn call(&self, ctx: Context<B>, next: Next<B>) -> BoxFuture<HandlerResult> {
        let fut = (self.handler)(ctx);
        Box::pin(async move {
            let ctx = fut.await?;
            next.run(ctx).await
        })
    }
}

impl<B> Debug for PreMiddleware<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("PreMiddleware")
    }
}
