//! # Dispatcher Module
//!
//! The dispatcher turns a `(method, path)` pair into a response. For every
//! request it:
//!
//! 1. Looks the route up in the frozen [`RouteTable`](crate::router::RouteTable)
//! 2. Attaches the extracted route parameters to the [`Request`]
//! 3. Substitutes the configured not-found endpoint when nothing matched
//! 4. Runs the global middleware, then the route middleware, then the endpoint
//!
//! ## Middleware Order
//!
//! With global middleware `[A, B]` and route middleware `[C]`, a request
//! passes `A -> B -> C -> endpoint` on the way in and the response unwinds
//! `endpoint -> C -> B -> A`.
//!
//! ```rust
//! use radixmux::dispatcher::{Request, Response};
//! use radixmux::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get("/user/:id", |req: &Request| {
//!     Response::json(200, serde_json::json!({ "id": req.param("id") }))
//! });
//! let dispatcher = router.into_dispatcher().expect("valid routes");
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/user/42"));
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body["id"], "42");
//! ```
//!
//! ## Concurrency
//!
//! A [`Dispatcher`] only reads the table it wraps, so clones of it can serve
//! requests from any number of threads at once. Nothing in the dispatch path
//! blocks or suspends.
//!
//! ## Error Handling
//!
//! - Unknown routes go to the not-found endpoint (404 by default)
//! - Endpoint panics are caught and returned as 500 responses

mod core;

pub use core::{Dispatcher, Endpoint, HeaderVec, Request, Response, MAX_INLINE_HEADERS};
