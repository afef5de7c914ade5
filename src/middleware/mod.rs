mod auth;
mod core;
mod metrics;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::{from_fn, FnMiddleware, Middleware, Next};
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
