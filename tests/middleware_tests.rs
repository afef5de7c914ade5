use std::sync::Arc;
use std::time::Duration;

use http::Method;
use radixmux::dispatcher::{Request, Response};
use radixmux::middleware::{AuthMiddleware, Middleware, MetricsMiddleware, TracingMiddleware};
use radixmux::router::{Router, RouterConfig};

use tracing_util::TestTracing;

fn router() -> Router {
    Router::with_config(RouterConfig::default())
}

#[test]
fn test_metrics_middleware_counts() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut r = router();
    r.use_arc(Arc::clone(&metrics) as Arc<dyn Middleware>);
    r.get("/pets/:id", |_: &Request| Response::empty(200));
    r.get("/fail", |_: &Request| Response::error(503, "down"));
    let dispatcher = r.into_dispatcher().unwrap();

    let res = dispatcher.dispatch(Request::new(Method::GET, "/pets/12345"));
    assert_eq!(res.status, 200);
    let res = dispatcher.dispatch(Request::new(Method::GET, "/nope"));
    assert_eq!(res.status, 404);
    let res = dispatcher.dispatch(Request::new(Method::GET, "/fail"));
    assert_eq!(res.status, 503);

    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.unmatched_count(), 1);
    assert_eq!(metrics.server_error_count(), 1);
}

#[test]
fn test_metrics_average_latency() {
    let metrics = MetricsMiddleware::new();
    assert_eq!(metrics.average_latency(), Duration::from_nanos(0));

    let req = Request::new(Method::GET, "/");
    let mut res = Response::empty(200);
    assert!(metrics.before(&req).is_none());
    metrics.after(&req, &mut res, Duration::from_millis(10));
    assert!(metrics.before(&req).is_none());
    metrics.after(&req, &mut res, Duration::from_millis(20));
    assert_eq!(metrics.average_latency(), Duration::from_millis(15));
}

#[test]
fn test_auth_middleware_guards_route_only() {
    let mut r = router();
    r.get("/public", |_: &Request| Response::empty(200));
    r.get("/admin", |_: &Request| Response::empty(200))
        .with(AuthMiddleware::new("Bearer secret".to_string()));
    let dispatcher = r.into_dispatcher().unwrap();

    let res = dispatcher.dispatch(Request::new(Method::GET, "/admin"));
    assert_eq!(res.status, 401);
    assert_eq!(res.body["error"], "Unauthorized");

    let res = dispatcher.dispatch(
        Request::new(Method::GET, "/admin").with_header("Authorization", "Bearer secret"),
    );
    assert_eq!(res.status, 200);

    let res = dispatcher.dispatch(Request::new(Method::GET, "/public"));
    assert_eq!(res.status, 200);
}

#[test]
fn test_tracing_middleware_records_span() {
    let tracing = TestTracing::init();
    let mut r = router();
    r.use_middleware(TracingMiddleware);
    r.get("/pets/:id", |_: &Request| Response::empty(200));
    let dispatcher = r.into_dispatcher().unwrap();

    let res = dispatcher.dispatch(Request::new(Method::GET, "/pets/1"));
    assert_eq!(res.status, 200);

    let entries = tracing.spans.entries();
    let opened = entries
        .iter()
        .find(|e| e.starts_with("new request "))
        .expect("request span opened");
    assert!(opened.contains("path=/pets/1"), "{opened}");
    assert!(opened.contains("route=/pets/:id"), "{opened}");
    assert!(entries.iter().any(|e| e.contains("status=200")), "{entries:?}");
}
