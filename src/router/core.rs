//! Router core module - registration front end and the frozen route table.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::registry::{parse_method, RouteRegistry};
use super::route::{Route, RouteId, RouteManager, RouteTarget};
use crate::config::RuntimeConfig;
use crate::dispatcher::{Dispatcher, Endpoint, Request, Response};
use crate::error::{RegistrationErrors, RouterError};
use crate::middleware::Middleware;
use crate::path::{ParamVec, Path};

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (Arc to avoid expensive clones)
    pub target: Arc<RouteTarget>,
    /// Variables extracted from the URL (e.g., `:id` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name, last occurrence winning
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.target.pattern
    }

    #[must_use]
    pub fn route_id(&self) -> RouteId {
        self.target.id
    }
}

/// Router configuration
#[derive(Clone)]
pub struct RouterConfig {
    /// Endpoint for requests that match no route
    pub not_found: Endpoint,
    pub runtime: RuntimeConfig,
}

impl RouterConfig {
    /// Default not-found endpoint with runtime settings from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            not_found: Arc::new(default_not_found),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

/// 404 with `{"error": "could not find route METHOD path"}`
pub fn default_not_found(req: &Request) -> Response {
    Response::error(
        404,
        &format!("could not find route {} {}", req.method, req.path),
    )
}

/// Route registration front end
///
/// Routes are added through [`handle`](Router::handle), the per-method
/// helpers, or a [`RouteGroup`]. Registration mistakes (overlaps, invalid
/// methods, bad group prefixes) do not abort the chain; they are collected
/// and reported by [`freeze`](Router::freeze).
///
/// ```rust
/// use radixmux::router::Router;
/// use radixmux::dispatcher::{Request, Response};
///
/// let mut router = Router::new();
/// router.get("/health", |_: &Request| Response::empty(204));
/// let mut api = router.group("/api");
/// api.post("/users", |_: &Request| Response::empty(201));
///
/// let table = router.freeze().expect("valid routes");
/// assert_eq!(table.routes().len(), 2);
/// ```
pub struct Router {
    config: RouterConfig,
    global_middlewares: Vec<Arc<dyn Middleware>>,
    routes: RouteManager,
    registry: RouteRegistry,
    errors: Vec<RouterError>,
    next_id: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_helpers {
    ($($(#[$doc:meta])* $name:ident => $method:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<F>(&mut self, path: &str, endpoint: F) -> RouteBuilder<'_>
            where
                F: Fn(&Request) -> Response + Send + Sync + 'static,
            {
                self.handle(path, endpoint, &[$method])
            }
        )*
    };
}

impl Router {
    /// Create a router configured from the environment
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            global_middlewares: Vec::new(),
            routes: RouteManager::new(),
            registry: RouteRegistry::new(),
            errors: Vec::new(),
            next_id: 0,
        }
    }

    /// Replace the endpoint serving unmatched requests
    pub fn not_found<F>(&mut self, endpoint: F) -> &mut Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.config.not_found = Arc::new(endpoint);
        self
    }

    /// Append a global middleware, run before any route middleware
    pub fn use_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        self.use_arc(Arc::new(middleware))
    }

    /// Append a shared global middleware
    pub fn use_arc(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.global_middlewares.push(middleware);
        self
    }

    /// Open a route group under `prefix`
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        let prefix = self.group_prefix("/", prefix);
        RouteGroup {
            router: self,
            prefix,
        }
    }

    /// Register `endpoint` for `methods` on `path` in the root group
    pub fn handle<F>(&mut self, path: &str, endpoint: F, methods: &[&str]) -> RouteBuilder<'_>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.register("/", path, Arc::new(endpoint), methods)
    }

    /// [`handle`](Router::handle) with an already shared endpoint
    pub fn handle_endpoint(
        &mut self,
        path: &str,
        endpoint: Endpoint,
        methods: &[&str],
    ) -> RouteBuilder<'_> {
        self.register("/", path, endpoint, methods)
    }

    method_helpers! {
        get => "GET",
        post => "POST",
        put => "PUT",
        patch => "PATCH",
        delete => "DELETE",
        connect => "CONNECT",
        head => "HEAD",
        options => "OPTIONS",
        trace => "TRACE",
    }

    /// Routes registered so far, in registration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        self.routes.routes()
    }

    /// Registration errors collected so far
    #[must_use]
    pub fn errors(&self) -> &[RouterError] {
        &self.errors
    }

    /// Take the oldest collected registration error
    pub fn take_error(&mut self) -> Option<RouterError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.remove(0))
        }
    }

    /// Remove a registered route
    pub fn remove(&mut self, id: RouteId) -> Option<Route> {
        let route = self.routes.remove(id)?;
        if let Err(err) = self.registry.remove_route(&route) {
            self.record(err);
        }
        info!(route = %route, "Route removed");
        Some(route)
    }

    /// Seal the registry into an immutable [`RouteTable`]
    ///
    /// Fails with every registration error collected while building.
    pub fn freeze(mut self) -> Result<RouteTable, RegistrationErrors> {
        if !self.errors.is_empty() {
            for err in &self.errors {
                warn!(error = %err, "Route registration error");
            }
            return Err(RegistrationErrors::new(self.errors));
        }
        self.registry.seal();
        let routes = self.routes.into_routes();
        info!(
            routes_count = routes.len(),
            global_middleware = self.global_middlewares.len(),
            "Routing table frozen"
        );
        Ok(RouteTable {
            registry: self.registry,
            routes,
            global_middlewares: self.global_middlewares,
            config: self.config,
        })
    }

    /// [`freeze`](Router::freeze) and wrap the table in a [`Dispatcher`]
    pub fn into_dispatcher(self) -> Result<Dispatcher, RegistrationErrors> {
        Ok(Dispatcher::new(Arc::new(self.freeze()?)))
    }

    fn record(&mut self, err: RouterError) {
        warn!(error = %err, "Route registration failed");
        self.errors.push(err);
    }

    /// Normalize a group prefix to `/<segments>/` under `parent`
    fn group_prefix(&mut self, parent: &str, prefix: &str) -> String {
        let trimmed = prefix.trim_start_matches('/');
        if trimmed.len() <= 1 {
            self.record(RouterError::GroupPrefixTooShort(prefix.to_string()));
        }
        let trimmed = trimmed.trim_end_matches('/');
        let mut full = String::with_capacity(parent.len() + trimmed.len() + 1);
        full.push_str(parent);
        if !trimmed.is_empty() {
            full.push_str(trimmed);
            full.push('/');
        }
        full
    }

    fn register(
        &mut self,
        prefix: &str,
        path: &str,
        endpoint: Endpoint,
        methods: &[&str],
    ) -> RouteBuilder<'_> {
        if path.is_empty() {
            self.record(RouterError::EmptyPattern);
            return RouteBuilder { router: self, id: None };
        }

        let methods = match methods
            .iter()
            .map(|m| parse_method(m))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(methods) => methods,
            Err(err) => {
                self.record(err);
                return RouteBuilder { router: self, id: None };
            }
        };

        let full = join_route_path(prefix, path);
        self.next_id += 1;
        let id = RouteId(self.next_id);
        let route = Route::new(id, Path::new(&full, false), endpoint, methods);
        let id = self.install(route);
        RouteBuilder { router: self, id }
    }

    /// Overlap-check and record a route, then insert it into the method trees
    ///
    /// A route the trees reject is taken out of every tree it already
    /// reached, so the route list and the trees stay in step.
    fn install(&mut self, route: Route) -> Option<RouteId> {
        let id = route.id;
        if let Err(err) = self.routes.add(route) {
            self.record(err);
            return None;
        }
        let route = self.routes.get(id)?;
        match self.registry.add_route(route) {
            Ok(()) => {
                info!(route = %route, id = %id, "Route registered");
                Some(id)
            }
            Err(err) => {
                self.record(err);
                if let Some(route) = self.routes.remove(id) {
                    if let Err(cleanup) = self.registry.remove_route(&route) {
                        self.record(cleanup);
                    }
                }
                None
            }
        }
    }
}

/// `prefix` + `path` with surrounding slashes normalized; `/` for the root
fn join_route_path(prefix: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    let mut full = String::with_capacity(prefix.len() + path.len());
    full.push_str(prefix);
    full.push_str(path);
    if full.len() > 1 && full.ends_with('/') {
        full.pop();
    }
    full
}

/// Routes sharing a path prefix
///
/// Prefixes are normalized to `/<prefix>/`; groups nest by concatenation.
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
}

impl<'r> RouteGroup<'r> {
    /// Normalized prefix, always starting and ending with `/`
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Open a nested group under this group's prefix
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        let prefix = self.router.group_prefix(&self.prefix, prefix);
        RouteGroup {
            router: &mut *self.router,
            prefix,
        }
    }

    pub fn handle<F>(&mut self, path: &str, endpoint: F, methods: &[&str]) -> RouteBuilder<'_>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.router
            .register(&self.prefix, path, Arc::new(endpoint), methods)
    }

    pub fn handle_endpoint(
        &mut self,
        path: &str,
        endpoint: Endpoint,
        methods: &[&str],
    ) -> RouteBuilder<'_> {
        self.router.register(&self.prefix, path, endpoint, methods)
    }

    method_helpers! {
        get => "GET",
        post => "POST",
        put => "PUT",
        patch => "PATCH",
        delete => "DELETE",
        connect => "CONNECT",
        head => "HEAD",
        options => "OPTIONS",
        trace => "TRACE",
    }
}

/// Handle on a just-registered route for attaching middleware or switching
/// it to case-insensitive matching
///
/// When registration failed the builder is inert and its methods are no-ops.
pub struct RouteBuilder<'r> {
    router: &'r mut Router,
    id: Option<RouteId>,
}

impl<'r> RouteBuilder<'r> {
    /// Id of the registered route, `None` if registration failed
    #[must_use]
    pub fn id(&self) -> Option<RouteId> {
        self.id
    }

    /// Append a route middleware and update the stored leaf
    pub fn with<M>(self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.with_arc(Arc::new(middleware))
    }

    pub fn with_arc(self, middleware: Arc<dyn Middleware>) -> Self {
        let Some(id) = self.id else {
            return self;
        };
        let router = &mut *self.router;
        let mut failure = None;
        if let Some(route) = router.routes.get_mut(id) {
            route.middlewares.push(middleware);
            failure = router.registry.add_route(route).err();
        }
        if let Some(err) = failure {
            router.record(err);
        }
        self
    }

    /// Switch the route to case-insensitive literal matching
    ///
    /// The route is removed and re-registered, so it is overlap-checked
    /// again under its new matching rules. Calling this twice is a no-op.
    pub fn ignore_case(mut self) -> Self {
        let Some(id) = self.id else {
            return self;
        };
        let router = &mut *self.router;
        if router
            .routes
            .get(id)
            .map_or(true, |route| route.path.ignore_case())
        {
            return self;
        }
        let Some(mut route) = router.routes.remove(id) else {
            return self;
        };
        if let Err(err) = router.registry.remove_route(&route) {
            router.record(err);
        }
        route.path.set_ignore_case(true);
        debug!(route = %route, "Route switched to case-insensitive matching");
        self.id = router.install(route);
        self
    }
}

/// Immutable routing table produced by [`Router::freeze`]
///
/// Lookups only read shared state, so the table can be used from any number
/// of threads at once.
pub struct RouteTable {
    registry: RouteRegistry,
    routes: Vec<Route>,
    global_middlewares: Vec<Arc<dyn Middleware>>,
    config: RouterConfig,
}

impl RouteTable {
    /// Resolve a method and path to a route
    ///
    /// Literal edges win over variable ones at every node; when the path has
    /// uppercase letters, the lowercased literal edge is tried before the
    /// variable edge to reach case-insensitive routes.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        // RT1: Route match attempt
        debug!(
            method = %method,
            path = %path,
            algorithm = "radix_tree",
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = self
            .registry
            .lookup(method, path, self.config.runtime.case_fold)
            .map(|(leaf, params)| (Arc::clone(&leaf.value), params));
        let match_duration = match_start.elapsed();

        if let Some((target, path_params)) = result {
            if match_duration > self.config.runtime.slow_match_threshold {
                warn!(
                    method = %method,
                    path = %path,
                    route_pattern = %target.pattern,
                    path_params = ?path_params,
                    duration_us = match_duration.as_micros() as u64,
                    algorithm = "radix_tree",
                    "Slow route matching detected"
                );
            } else {
                // RT3: Route matched
                info!(
                    method = %method,
                    path = %path,
                    route_pattern = %target.pattern,
                    path_params = ?path_params,
                    duration_us = match_duration.as_micros() as u64,
                    algorithm = "radix_tree",
                    "Route matched"
                );
            }
            return Some(RouteMatch {
                target,
                path_params,
            });
        }

        // RT4: No route found (404)
        warn!(
            method = %method,
            path = %path,
            duration_us = match_duration.as_micros() as u64,
            algorithm = "radix_tree",
            "No route matched"
        );
        None
    }

    /// Registered routes in registration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    #[must_use]
    pub fn global_middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.global_middlewares
    }

    #[must_use]
    pub fn not_found(&self) -> &Endpoint {
        &self.config.not_found
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}
