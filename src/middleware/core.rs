use std::time::{Duration, Instant};

use crate::dispatcher::{Request, Response};

/// Continuation handed to a middleware: the rest of the chain, ending at
/// the route's endpoint
pub type Next<'a> = &'a dyn Fn(&Request) -> Response;

/// Wraps a request on its way to the endpoint
///
/// Implementors either override [`handle`](Middleware::handle) for full
/// control over the continuation, or the `before`/`after` hooks: `before`
/// may short-circuit by returning a response, `after` sees the response and
/// the time spent in the rest of the chain.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request) -> Option<Response> {
        None
    }

    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}

    fn handle(&self, req: &Request, next: Next<'_>) -> Response {
        if let Some(early) = self.before(req) {
            return early;
        }
        let start = Instant::now();
        let mut res = next(req);
        self.after(req, &mut res, start.elapsed());
        res
    }
}

/// Middleware backed by a closure, see [`from_fn`]
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Request, Next<'_>) -> Response + Send + Sync,
{
    fn handle(&self, req: &Request, next: Next<'_>) -> Response {
        (self.f)(req, next)
    }
}

/// Build a middleware from a closure taking the request and the continuation
///
/// ```rust
/// use radixmux::middleware::{from_fn, Next};
/// use radixmux::dispatcher::{Request, Response};
///
/// let stamp = from_fn(|req: &Request, next: Next<'_>| {
///     let mut res = next(req);
///     res.set_header("x-served-by", "radixmux".to_string());
///     res
/// });
/// # let _ = stamp;
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&Request, Next<'_>) -> Response + Send + Sync,
{
    FnMiddleware { f }
}
