use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};

use super::radix::{Leaf, MethodTree};
use super::route::{Route, RouteTarget};
use crate::error::RouterError;
use crate::path::ParamVec;

/// Methods a route may be registered under
pub static SUPPORTED_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::CONNECT,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

/// Lifecycle of a [`RouteRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Routes may be added, updated and removed
    Registering,
    /// Read-only; every mutation fails with [`RouterError::Frozen`]
    Serving,
}

/// Uppercase a method name and check it against [`SUPPORTED_METHODS`]
pub fn parse_method(raw: &str) -> Result<Method, RouterError> {
    let upper = raw.trim().to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| RouterError::InvalidMethod(raw.to_string()))
}

/// One method tree per HTTP method, created on first use
pub struct RouteRegistry {
    method_trees: HashMap<Method, MethodTree<Arc<RouteTarget>>>,
    phase: Phase,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            method_trees: HashMap::new(),
            phase: Phase::Registering,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Enter the serving phase; there is no way back
    pub fn seal(&mut self) {
        if self.phase == Phase::Registering {
            info!(
                trees = self.method_trees.len(),
                leaves = self.method_trees.values().map(MethodTree::len).sum::<usize>(),
                "Route registry sealed"
            );
        }
        self.phase = Phase::Serving;
    }

    fn ensure_registering(&self) -> Result<(), RouterError> {
        match self.phase {
            Phase::Registering => Ok(()),
            Phase::Serving => Err(RouterError::Frozen),
        }
    }

    /// Insert or update `route` in the tree of each of its methods
    ///
    /// Methods are processed in order and the first unsupported one (or the
    /// first tree conflict) aborts the call. Trees already updated for
    /// earlier methods keep the route; [`remove_route`](Self::remove_route)
    /// clears them.
    pub fn add_route(&mut self, route: &Route) -> Result<(), RouterError> {
        self.ensure_registering()?;
        let key = route.path.tree_key();
        let target = route.target();

        for method in &route.methods {
            if !SUPPORTED_METHODS.contains(method) {
                return Err(RouterError::InvalidMethod(method.to_string()));
            }
            let tree = self
                .method_trees
                .entry(method.clone())
                .or_insert_with(|| MethodTree::new(method.clone()));
            let previous = tree.insert(&key, route.path.clone(), Arc::clone(&target))?;
            match previous {
                Some(old) if old.id != route.id => warn!(
                    method = %method,
                    key = %key,
                    replaced = %old.id,
                    by = %route.id,
                    "Route leaf replaced by a different route"
                ),
                Some(_) => debug!(method = %method, key = %key, id = %route.id, "Route leaf updated"),
                None => debug!(method = %method, key = %key, id = %route.id, "Route leaf inserted"),
            }
        }
        Ok(())
    }

    /// Remove `route` from the tree of each of its methods
    ///
    /// Returns how many trees held it. Leaves stored under the same key by
    /// another route are left alone.
    pub fn remove_route(&mut self, route: &Route) -> Result<usize, RouterError> {
        self.ensure_registering()?;
        let key = route.path.tree_key();
        let mut removed = 0;
        for method in &route.methods {
            let Some(tree) = self.method_trees.get_mut(method) else {
                continue;
            };
            if tree.get(&key).is_some_and(|leaf| leaf.value.id == route.id)
                && tree.remove(&key).is_some()
            {
                removed += 1;
            }
        }
        debug!(route = %route, removed, "Route removed from method trees");
        Ok(removed)
    }

    /// Resolve `path` in the tree for `method`
    #[must_use]
    pub fn lookup(
        &self,
        method: &Method,
        path: &str,
        case_fold: bool,
    ) -> Option<(&Leaf<Arc<RouteTarget>>, ParamVec)> {
        self.method_trees.get(method)?.lookup_with(path, case_fold)
    }

    #[must_use]
    pub fn tree(&self, method: &Method) -> Option<&MethodTree<Arc<RouteTarget>>> {
        self.method_trees.get(method)
    }

    /// Method trees in [`SUPPORTED_METHODS`] order
    pub fn trees(&self) -> impl Iterator<Item = &MethodTree<Arc<RouteTarget>>> {
        SUPPORTED_METHODS
            .iter()
            .filter_map(|m| self.method_trees.get(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Request, Response};
    use crate::path::Path;
    use crate::router::route::RouteId;

    fn route(id: u64, pattern: &str, methods: &[Method]) -> Route {
        Route::new(
            RouteId(id),
            Path::new(pattern, false),
            Arc::new(|_: &Request| Response::empty(204)),
            methods.to_vec(),
        )
    }

    fn fetch() -> Method {
        Method::from_bytes(b"FETCH").unwrap()
    }

    #[test]
    fn test_parse_method_uppercases() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method(" post ").unwrap(), Method::POST);
        assert_eq!(parse_method("Options").unwrap(), Method::OPTIONS);
        assert_eq!(
            parse_method("FETCH").unwrap_err(),
            RouterError::InvalidMethod("FETCH".to_string())
        );
    }

    #[test]
    fn test_add_route_creates_tree_per_method() {
        let mut registry = RouteRegistry::new();
        registry.add_route(&route(1, "/a/:id", &[Method::GET, Method::POST])).unwrap();

        assert_eq!(registry.trees().count(), 2);
        let (leaf, params) = registry.lookup(&Method::POST, "/a/7", true).unwrap();
        assert_eq!(leaf.value.id, RouteId(1));
        assert_eq!(params[0].1, "7");
        assert!(registry.lookup(&Method::PUT, "/a/7", true).is_none());
    }

    #[test]
    fn test_invalid_method_fails_fast_without_rollback() {
        let mut registry = RouteRegistry::new();
        let err = registry
            .add_route(&route(1, "/a", &[Method::GET, fetch(), Method::POST]))
            .unwrap_err();
        assert_eq!(err, RouterError::InvalidMethod("FETCH".to_string()));
        assert!(registry.lookup(&Method::GET, "/a", true).is_some());
        assert!(registry.tree(&Method::POST).is_none());
    }

    #[test]
    fn test_remove_route() {
        let mut registry = RouteRegistry::new();
        let r = route(1, "/a", &[Method::GET, Method::PUT]);
        registry.add_route(&r).unwrap();
        assert_eq!(registry.remove_route(&r).unwrap(), 2);
        assert!(registry.lookup(&Method::GET, "/a", true).is_none());
        assert_eq!(registry.remove_route(&r).unwrap(), 0);
    }

    #[test]
    fn test_remove_route_leaves_other_owner_alone() {
        let mut registry = RouteRegistry::new();
        registry.add_route(&route(1, "/a", &[Method::GET])).unwrap();
        assert_eq!(registry.remove_route(&route(2, "/a", &[Method::GET])).unwrap(), 0);
        let (leaf, _) = registry.lookup(&Method::GET, "/a", true).unwrap();
        assert_eq!(leaf.value.id, RouteId(1));
    }

    #[test]
    fn test_sealed_registry_rejects_mutation() {
        let mut registry = RouteRegistry::new();
        let r = route(1, "/a", &[Method::GET]);
        registry.add_route(&r).unwrap();
        registry.seal();

        assert_eq!(registry.phase(), Phase::Serving);
        assert_eq!(registry.add_route(&route(2, "/b", &[Method::GET])), Err(RouterError::Frozen));
        assert_eq!(registry.remove_route(&r), Err(RouterError::Frozen));
        assert!(registry.lookup(&Method::GET, "/a", true).is_some());
    }
}
