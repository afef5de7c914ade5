//! # Router Module
//!
//! Radix-tree route registration and resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering routes (pattern, methods, endpoint, middleware) and
//!   rejecting overlapping ones
//! - Keeping one compressed prefix tree per HTTP method
//! - Matching incoming request paths and extracting `:variable` segments
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: [`Router`] collects routes through `handle`, the
//!    per-method helpers and [`RouteGroup`]s. Each route is inserted into the
//!    [`MethodTree`] of every method it serves. Mistakes are collected rather
//!    than aborting the chain.
//!
//! 2. **Serving**: [`Router::freeze`] seals the registry into an immutable
//!    [`RouteTable`]. Lookups walk one method tree in O(k) for a path of
//!    length k, trying literal edges before the variable edge of a node and
//!    backtracking when a literal branch dead-ends.
//!
//! ## Example
//!
//! ```rust
//! use radixmux::router::Router;
//! use radixmux::dispatcher::{Request, Response};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get("/user/:id", |_: &Request| Response::empty(200));
//! router.get("/user/me", |_: &Request| Response::empty(200));
//! let table = router.freeze().expect("valid routes");
//!
//! let m = table.lookup(&Method::GET, "/user/42").expect("matched");
//! assert_eq!(m.pattern(), "/user/:id");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//!
//! let m = table.lookup(&Method::GET, "/user/me").expect("matched");
//! assert_eq!(m.pattern(), "/user/me");
//! ```
//!
//! ## Matching Rules
//!
//! - A trailing `/` on the request path is ignored, except for `/` itself
//! - Literal segments are matched byte-for-byte unless the route was marked
//!   case-insensitive
//! - Variable values are never case-folded
//! - Differently named variables may not share a tree position

mod core;
mod radix;
mod registry;
mod route;

pub use core::{default_not_found, RouteBuilder, RouteGroup, RouteMatch, RouteTable, Router, RouterConfig};
pub use radix::{EdgeSet, Leaf, MethodTree, Node};
pub use registry::{parse_method, Phase, RouteRegistry, SUPPORTED_METHODS};
pub use route::{Route, RouteId, RouteManager, RouteTarget};
