//! Dispatcher core module - hot path for request dispatch.
//!
//! # Allocation discipline
//!
//! Route parameters and headers use `SmallVec` storage and the middleware
//! chain is walked recursively over borrowed slices, so dispatching a
//! request does not allocate for the common case.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::middleware::Middleware;
use crate::path::ParamVec;
use crate::router::{RouteMatch, RouteTable};

/// Maximum inline headers before heap allocation
/// Most requests have <=16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
///
/// Header names use `Arc<str>` because they repeat across requests
/// (`content-type`, `authorization`, ...) and `Arc::clone()` is O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Terminal response producer bound to a route
pub type Endpoint = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Request handed to middleware and endpoints
///
/// The network layer fills in method, path, headers and body. Route
/// parameters and the matched pattern are attached by the [`Dispatcher`]
/// before any middleware runs. Each request owns its parameters; they are
/// never shared across requests.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Request path, without query string
    pub path: String,
    /// Pattern of the matched route (e.g. `/user/:id`), `None` when unmatched
    pub route: Option<Arc<str>>,
    /// Variables bound by the matched route (stack-allocated for <=8 params)
    pub route_params: ParamVec,
    /// HTTP headers (stack-allocated for <=16 headers)
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present); the router never inspects it
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            route: None,
            route_params: ParamVec::new(),
            headers: HeaderVec::new(),
            body: None,
        }
    }

    /// Add a header; a valid `x-request-id` also becomes the request id
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            if let Some(id) = RequestId::from_header(&value) {
                self.request_id = id;
            }
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a route parameter by name
    ///
    /// Uses "last write wins" semantics: if a name is bound twice
    /// (`/org/:id/user/:id`), the last occurrence is returned.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert route_params to HashMap
    /// Note: This allocates - use param() in hot paths
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.route_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Response produced by an endpoint or a short-circuiting middleware
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type` header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// `{"error": message}` JSON response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Response without a body
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Resolves requests against a frozen [`RouteTable`] and runs them through
/// their middleware chain
///
/// Cloning is cheap and every clone shares the same read-only table, so a
/// dispatcher can be handed to as many worker threads as the network layer
/// uses.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a method and path without dispatching
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.table.lookup(method, path)
    }

    /// Dispatch a request and return its response
    ///
    /// Unmatched requests are served by the not-found endpoint, wrapped in
    /// the global middleware only. Never fails: a panicking endpoint is
    /// turned into a 500 response.
    #[must_use]
    pub fn dispatch(&self, mut req: Request) -> Response {
        let table = &self.table;
        let target = match table.lookup(&req.method, &req.path) {
            Some(RouteMatch {
                target,
                path_params,
            }) => {
                req.route_params = path_params;
                req.route = Some(Arc::clone(&target.pattern));
                Some(target)
            }
            None => None,
        };

        let (endpoint, route_middlewares): (&Endpoint, &[Arc<dyn Middleware>]) =
            match target.as_deref() {
                Some(t) => (&t.endpoint, t.middlewares.as_slice()),
                None => (table.not_found(), [].as_slice()),
            };

        // D1: Dispatch start
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            global_middleware = table.global_middlewares().len(),
            route_middleware = route_middlewares.len(),
            "Dispatching request"
        );

        let start = Instant::now();
        let response = run_chain(table.global_middlewares(), route_middlewares, endpoint, &req);

        // D2: Dispatch complete
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            route = req.route.as_deref().unwrap_or("<not found>"),
            status = response.status,
            latency_us = start.elapsed().as_micros() as u64,
            "Request dispatched"
        );
        response
    }
}

/// Run `req` through `global` then `route` middleware, ending at `endpoint`
///
/// Equivalent to right-folding the chain around the endpoint: the first
/// global middleware is outermost and the last route middleware sits
/// directly in front of the endpoint.
fn run_chain(
    global: &[Arc<dyn Middleware>],
    route: &[Arc<dyn Middleware>],
    endpoint: &Endpoint,
    req: &Request,
) -> Response {
    if let Some((first, rest)) = global.split_first() {
        return first.handle(req, &|r: &Request| run_chain(rest, route, endpoint, r));
    }
    if let Some((first, rest)) = route.split_first() {
        return first.handle(req, &|r: &Request| run_chain(&[], rest, endpoint, r));
    }
    call_endpoint(endpoint, req)
}

fn call_endpoint(endpoint: &Endpoint, req: &Request) -> Response {
    match catch_unwind(AssertUnwindSafe(|| endpoint(req))) {
        Ok(response) => response,
        Err(panic) => {
            let panic_message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                panic_message = %panic_message,
                "Endpoint panicked - CRITICAL"
            );
            Response::error(500, &format!("Handler panicked: {panic_message}"))
        }
    }
}
