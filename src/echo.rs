use std::sync::Arc;

use serde_json::json;

use crate::dispatcher::{Endpoint, Request, Response};

/// Endpoint that echoes the resolved request back as JSON
///
/// Used by the CLI to serve manifest routes that have no real handler
/// attached. `handler` is the name recorded for the route.
pub fn echo_endpoint(handler: &str) -> Endpoint {
    let handler: Arc<str> = Arc::from(handler);
    Arc::new(move |req: &Request| {
        Response::json(
            200,
            json!({
                "handler": handler.as_ref(),
                "method": req.method.as_str(),
                "path": req.path,
                "route": req.route.as_deref(),
                "params": req.params_map(),
                "request_id": req.request_id,
                "received_at_ms": req.request_id.timestamp_ms(),
            }),
        )
    })
}
