use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::{debug, warn};

use crate::dispatcher::Endpoint;
use crate::error::RouterError;
use crate::middleware::Middleware;
use crate::path::Path;

/// Stable identity of a registered route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) u64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a method tree leaf resolves to
///
/// Shared through an `Arc` so a lookup hands it out without copying the
/// middleware list.
pub struct RouteTarget {
    pub id: RouteId,
    /// Display form of the route pattern (`/user/:id`)
    pub pattern: Arc<str>,
    pub endpoint: Endpoint,
    /// Route-specific middleware, applied after the global middleware
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTarget")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// A registered route: endpoint, methods, pattern and route middleware
#[derive(Clone)]
pub struct Route {
    pub id: RouteId,
    pub endpoint: Endpoint,
    /// Canonical methods, parsed once at registration
    pub methods: Vec<Method>,
    pub path: Path,
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Route {
    pub(crate) fn new(id: RouteId, path: Path, endpoint: Endpoint, methods: Vec<Method>) -> Self {
        Self {
            id,
            endpoint,
            methods,
            path,
            middlewares: Vec::new(),
        }
    }

    /// Two routes overlap when their patterns are equal and they share at
    /// least one method
    #[must_use]
    pub fn overlaps_with(&self, other: &Route) -> bool {
        self.path.equals(&other.path)
            && self.methods.iter().any(|m| other.methods.contains(m))
    }

    /// Snapshot of this route as stored in the method trees
    #[must_use]
    pub fn target(&self) -> Arc<RouteTarget> {
        Arc::new(RouteTarget {
            id: self.id,
            pattern: Arc::from(self.path.to_string()),
            endpoint: Arc::clone(&self.endpoint),
            middlewares: self.middlewares.clone(),
        })
    }
}

/// `[GET POST] /user/:id`, suffixed with ` *IgnoreCase` for
/// case-insensitive routes
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(method.as_str())?;
        }
        write!(f, "] {}", self.path)?;
        if self.path.ignore_case() {
            f.write_str(" *IgnoreCase")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("methods", &self.methods)
            .field("path", &self.path.to_string())
            .field("ignore_case", &self.path.ignore_case())
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// Registration-order list of routes, guarding against overlaps
#[derive(Debug, Default, Clone)]
pub struct RouteManager {
    routes: Vec<Route>,
}

impl RouteManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First registered route that overlaps with `route`
    #[must_use]
    pub fn find_overlapping(&self, route: &Route) -> Option<&Route> {
        self.routes
            .iter()
            .find(|existing| existing.id != route.id && existing.overlaps_with(route))
    }

    /// Append a route unless it overlaps with one already present
    pub fn add(&mut self, route: Route) -> Result<(), RouterError> {
        if let Some(existing) = self.find_overlapping(&route) {
            warn!(route = %route, existing = %existing, "Route overlaps with existing route");
            return Err(RouterError::Overlap {
                route: route.to_string(),
                existing: existing.to_string(),
            });
        }
        debug!(route = %route, id = %route.id, "Route recorded");
        self.routes.push(route);
        Ok(())
    }

    pub fn remove(&mut self, id: RouteId) -> Option<Route> {
        let index = self.routes.iter().position(|r| r.id == id)?;
        Some(self.routes.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| r.id == id)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Request, Response};

    fn route(id: u64, pattern: &str, methods: &[Method], ignore_case: bool) -> Route {
        Route::new(
            RouteId(id),
            Path::new(pattern, ignore_case),
            Arc::new(|_: &Request| Response::empty(204)),
            methods.to_vec(),
        )
    }

    #[test]
    fn test_display_format() {
        assert_eq!(
            route(1, "/user/:id", &[Method::GET, Method::POST], false).to_string(),
            "[GET POST] /user/:id"
        );
        assert_eq!(
            route(2, "/Docs", &[Method::GET], true).to_string(),
            "[GET] /Docs *IgnoreCase"
        );
    }

    #[test]
    fn test_overlap_requires_shared_method() {
        let get = route(1, "/user/:id", &[Method::GET], false);
        let post = route(2, "/user/:name", &[Method::POST], false);
        let get_again = route(3, "/user/:name", &[Method::GET], false);
        assert!(!get.overlaps_with(&post));
        assert!(get.overlaps_with(&get_again));
    }

    #[test]
    fn test_manager_rejects_overlap() {
        let mut manager = RouteManager::new();
        manager.add(route(1, "/a", &[Method::GET, Method::DELETE], false)).unwrap();
        manager.add(route(2, "/a", &[Method::POST], false)).unwrap();

        let err = manager.add(route(3, "/A", &[Method::DELETE], true)).unwrap_err();
        assert_eq!(
            err,
            RouterError::Overlap {
                route: "[DELETE] /A *IgnoreCase".to_string(),
                existing: "[GET DELETE] /a".to_string(),
            }
        );
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_manager_remove_by_id() {
        let mut manager = RouteManager::new();
        manager.add(route(1, "/a", &[Method::GET], false)).unwrap();
        manager.add(route(2, "/b", &[Method::GET], false)).unwrap();
        assert_eq!(manager.remove(RouteId(1)).map(|r| r.id), Some(RouteId(1)));
        assert!(manager.remove(RouteId(1)).is_none());
        assert_eq!(manager.routes()[0].id, RouteId(2));
    }
}
