use tracing::{field, info_span};

use super::{Middleware, Next};
use crate::dispatcher::{Request, Response};

/// Opens a `request` span around the rest of the chain
///
/// The span carries the request ID, method, path and matched route, and
/// records the response status and latency once the chain returns.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &Request, next: Next<'_>) -> Response {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            route = req.route.as_deref().unwrap_or(""),
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let start = std::time::Instant::now();
        let res = span.in_scope(|| next(req));
        span.record("status", res.status);
        span.record("latency_ms", start.elapsed().as_millis() as u64);
        res
    }
}
