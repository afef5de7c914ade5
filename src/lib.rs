//! # radixmux
//!
//! **radixmux** is an HTTP request router built on per-method radix trees.
//! Routes are registered with `:variable` segments, grouped under shared
//! prefixes, wrapped in middleware and then frozen into an immutable table
//! that resolves requests without locking.
//!
//! ## Architecture
//!
//! - **[`path`]** - Route patterns: segment parsing, matching and parameter extraction
//! - **[`router`]** - Radix trees, the route registry, overlap validation and the
//!   registration API (`Router`, `RouteGroup`, `RouteBuilder`)
//! - **[`dispatcher`]** - Request/response types and the middleware chain runner
//! - **[`middleware`]** - The `Middleware` trait plus tracing, metrics and auth middleware
//! - **[`manifest`]** - Declarative route files (YAML, TOML, JSON)
//! - **[`cli`]** - The `radixmux` command-line tool
//!
//! ## Lifecycle
//!
//! ```rust
//! use radixmux::dispatcher::{Request, Response};
//! use radixmux::middleware::MetricsMiddleware;
//! use radixmux::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.use_middleware(MetricsMiddleware::new());
//! router.handle("/user/:id", |req: &Request| {
//!     Response::json(200, serde_json::json!({ "user": req.param("id") }))
//! }, &["GET", "DELETE"]);
//!
//! // Registration is over: seal the routes and serve.
//! let dispatcher = router.into_dispatcher().expect("valid routes");
//! let res = dispatcher.dispatch(Request::new(Method::DELETE, "/user/7"));
//! assert_eq!(res.body["user"], "7");
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/nope"));
//! assert_eq!(res.status, 404);
//! ```
//!
//! ## Configuration
//!
//! Runtime knobs come from `RADIXMUX_*` environment variables, see
//! [`config::RuntimeConfig`] and [`logging::LogConfig`].

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod ids;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod path;
pub mod router;

pub use dispatcher::{Dispatcher, Endpoint, Request, Response};
pub use error::{RegistrationErrors, RouterError};
pub use ids::RequestId;
pub use middleware::Middleware;
pub use path::{ParamVec, Path};
pub use router::{RouteGroup, RouteTable, Router};
