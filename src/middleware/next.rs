use crate::middleware::Middleware;
use crate::route::Handler;
use crate::types::{BoxFuture, Context, HandlerResult};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// A frozen, ordered middleware chain shared by every route entry created from one registration.
pub(crate) type MiddlewareChain<B> = Arc<[Arc<dyn Middleware<B>>]>;

/// The continuation handed to a middleware: the rest of the chain followed by the route handler.
///
/// It is a position in the chain rather than a nested closure. `run` executes the middleware at
/// that position with a `Next` pointing one further, or the handler once the chain is exhausted.
///
/// `Next` is cheap to clone. Running a clone executes the remainder of the chain again; nothing
/// guards against it.
pub struct Next<B> {
    chain: MiddlewareChain<B>,
    index: usize,
    handler: Handler<B>,
}

impl<B: Send + 'static> Next<B> {
    pub(crate) fn new(chain: MiddlewareChain<B>, handler: Handler<B>) -> Next<B> {
        Next {
            chain,
            index: 0,
            handler,
        }
    }

    /// Runs the rest of the chain with `ctx`, which is either the context this middleware
    /// received or a replacement for the downstream stages.
    pub fn run(self, ctx: Context<B>) -> BoxFuture<HandlerResult> {
        match self.chain.get(self.index) {
            Some(middleware) => {
                let middleware = Arc::clone(middleware);
                let next = Next {
                    chain: self.chain,
                    index: self.index + 1,
                    handler: self.handler,
                };
                middleware.call(ctx, next)
            }
            None => (self.handler)(ctx),
        }
    }
}

impl<B> Next<B> {
    /// The number of middleware still ahead of the route handler.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

impl<B> Clone for Next<B> {
    fn clone(&self) -> Self {
        Next {
            chain: Arc::clone(&self.chain),
            index: self.index,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<B> Debug for Next<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ index: {}, chain_len: {} }}", self.index, self.chain.len())
    }
}

/// Executes `chain` around `handler` for one request.
pub(crate) fn execute<B: Send + 'static>(
    chain: MiddlewareChain<B>,
    handler: Handler<B>,
    ctx: Context<B>,
) -> BoxFuture<HandlerResult> {
    Next::new(chain, handler).run(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_map::DataMap;
    use crate::middleware::from_fn;
    use crate::types::{Captures, RouteParams};
    use crate::RouteError;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Request, Response, StatusCode};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn ctx() -> Context<()> {
        let req = Request::builder().uri("/").body(()).unwrap();
        Context::new(Captures::new("http:///", RouteParams::new()), req, Arc::new(DataMap::new()))
    }

    fn handler(log: Log) -> Handler<()> {
        Arc::new(move |_ctx: Context<()>| -> BoxFuture<HandlerResult> {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(String::from("handler"));
                Ok(Response::new(Full::from("done")))
            })
        })
    }

    fn tracing_middleware(name: &'static str, log: Log) -> Arc<dyn Middleware<()>> {
        Arc::new(from_fn(move |ctx: Context<()>, next: Next<()>| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("{} before", name));
                let res = next.run(ctx).await;
                log.lock().unwrap().push(format!("{} after", name));
                res
            }
        }))
    }

    #[tokio::test]
    async fn empty_chain_runs_the_handler() {
        let log = Log::default();
        let res = execute(Arc::from(Vec::new()), handler(log.clone()), ctx()).await.unwrap();

        assert_eq!(res.into_body().collect().await.unwrap().to_bytes(), Bytes::from("done"));
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn wraps_in_declaration_order() {
        let log = Log::default();
        let chain: MiddlewareChain<()> = Arc::from(vec![
            tracing_middleware("a", log.clone()),
            tracing_middleware("b", log.clone()),
        ]);

        execute(chain, handler(log.clone()), ctx()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a before", "b before", "handler", "b after", "a after"]
        );
    }

    #[tokio::test]
    async fn running_a_cloned_next_repeats_the_remainder() {
        let log = Log::default();
        let twice: Arc<dyn Middleware<()>> = Arc::new(from_fn(|ctx: Context<()>, next: Next<()>| async move {
            let again = next.clone();
            assert_eq!(again.remaining(), 0);
            let (captures, req) = ctx.into_parts();
            let replay = Request::builder().uri(req.uri().clone()).body(()).unwrap();
            next.run(Context::new(captures.clone(), req, Arc::new(DataMap::new()))).await?;
            again
                .run(Context::new(captures, replay, Arc::new(DataMap::new())))
                .await
        }));

        execute(Arc::from(vec![twice]), handler(log.clone()), ctx()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["handler", "handler"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_downstream() {
        let log = Log::default();
        let guard: Arc<dyn Middleware<()>> = Arc::new(from_fn(|_ctx: Context<()>, _next: Next<()>| async move {
            let mut res = Response::new(Full::from("denied"));
            *res.status_mut() = StatusCode::FORBIDDEN;
            Ok::<_, RouteError>(res)
        }));
        let chain: MiddlewareChain<()> = Arc::from(vec![guard, tracing_middleware("inner", log.clone())]);

        let res = execute(chain, handler(log.clone()), ctx()).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }
}
