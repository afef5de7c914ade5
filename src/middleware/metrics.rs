use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{Request, Response};

/// Middleware for collecting request metrics
///
/// All counters use atomic operations for thread-safe updates without locks.
///
/// Metrics collected:
/// - Total request count
/// - Average latency (time spent in the rest of the chain)
/// - Requests that resolved to no route
/// - Server errors (5xx responses)
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    unmatched: AtomicUsize,
    server_errors: AtomicUsize,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Calculate the average request latency
    ///
    /// Returns zero duration if no requests have been processed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Requests served by the not-found endpoint
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.load(Ordering::Relaxed)
    }

    pub fn server_error_count(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &Request) -> Option<Response> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if req.route.is_none() {
            self.unmatched.fetch_add(1, Ordering::Relaxed);
        }
        if res.status >= 500 {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}
