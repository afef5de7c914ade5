//! Radix tree implementation for HTTP route matching
//!
//! One [`MethodTree`] is kept per HTTP method. Each tree is a compressed
//! prefix tree: a node stores a multi-byte prefix, an optional [`Leaf`] and a
//! sorted set of children keyed by the first byte of their prefix.
//!
//! ## Layout
//!
//! - Literal runs share storage: `/users` and `/user/:id` share the `/user`
//!   node, which is split on insertion where the keys diverge.
//! - A variable segment (`:id`) always occupies a node of its own, reached
//!   through the `:` edge of a node that ends on a segment boundary. Its
//!   prefix is the whole token, so only one variable name can live at a
//!   given position of a tree.
//! - A node may carry a leaf and edges at the same time (`/user` is both a
//!   route and a prefix of `/user/:id`).
//!
//! ## Lookup precedence
//!
//! At every node the literal edge for the next request byte is tried first.
//! When that subtree produces no match and the request is positioned at the
//! start of a segment, the variable child is tried with the whole segment.
//! A candidate leaf is only accepted if its [`Path`] parses the original
//! request path, which also produces the route parameters.
//!
//! ## Case-insensitive routes
//!
//! Case-insensitive patterns are stored with lowercased literals (see
//! [`Path::tree_key`]). When the request contains upper-case ASCII, lookup
//! carries a lowercased copy alongside it. At every node the exact literal
//! edge is tried, then the literal edge for the lowercased bytes, and only
//! then the variable child. The leaf's [`Path`] decides whether case folding
//! was allowed.

use http::Method;
use smallvec::SmallVec;
use std::mem;

use crate::error::RouterError;
use crate::path::{trim_trailing_slash, ParamVec, Path, VARIABLE_MARKER};

/// Edge sets are keyed by a single byte and rarely hold more than a handful
/// of children.
const INLINE_EDGES: usize = 4;

/// Payload attached to a node that terminates a registered route
#[derive(Debug, Clone)]
pub struct Leaf<T> {
    /// Registered key, without a trailing `/` (unless it is exactly `/`)
    pub key: String,
    /// Parsed pattern used to confirm a match and extract parameters
    pub path: Path,
    pub value: T,
}

/// Sorted map from edge label to exclusively owned child node
///
/// Labels are unique: [`EdgeSet::insert`] reports a conflict instead of
/// creating a duplicate, and [`EdgeSet::update`] never creates an edge.
#[derive(Debug, Clone)]
pub struct EdgeSet<T> {
    edges: SmallVec<[(u8, Box<Node<T>>); INLINE_EDGES]>,
}

impl<T> Default for EdgeSet<T> {
    fn default() -> Self {
        Self {
            edges: SmallVec::new(),
        }
    }
}

impl<T> EdgeSet<T> {
    fn position(&self, label: u8) -> Result<usize, usize> {
        self.edges.binary_search_by_key(&label, |(l, _)| *l)
    }

    #[must_use]
    pub fn get(&self, label: u8) -> Option<&Node<T>> {
        self.position(label).ok().map(|i| self.edges[i].1.as_ref())
    }

    pub fn get_mut(&mut self, label: u8) -> Option<&mut Node<T>> {
        match self.position(label) {
            Ok(i) => Some(self.edges[i].1.as_mut()),
            Err(_) => None,
        }
    }

    /// Insert a new edge, keeping labels sorted
    pub fn insert(&mut self, label: u8, child: Box<Node<T>>) -> Result<(), RouterError> {
        match self.position(label) {
            Ok(_) => Err(RouterError::DuplicateEdge { label }),
            Err(i) => {
                self.edges.insert(i, (label, child));
                Ok(())
            }
        }
    }

    /// Replace the child of an existing edge, returning the previous child
    pub fn update(&mut self, label: u8, child: Box<Node<T>>) -> Result<Box<Node<T>>, RouterError> {
        match self.position(label) {
            Ok(i) => Ok(mem::replace(&mut self.edges[i].1, child)),
            Err(_) => Err(RouterError::MissingEdge { label }),
        }
    }

    pub fn remove(&mut self, label: u8) -> Option<Box<Node<T>>> {
        self.position(label).ok().map(|i| self.edges.remove(i).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Labels in ascending order
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = u8> + '_ {
        self.edges.iter().map(|(l, _)| *l)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &Node<T>)> + '_ {
        self.edges.iter().map(|(l, n)| (*l, n.as_ref()))
    }
}

/// Node of a method tree
#[derive(Debug, Clone)]
pub struct Node<T> {
    prefix: Vec<u8>,
    leaf: Option<Leaf<T>>,
    is_variable: bool,
    edges: EdgeSet<T>,
}

impl<T> Node<T> {
    fn root() -> Self {
        Self::literal(&[])
    }

    fn literal(prefix: &[u8]) -> Self {
        Self {
            prefix: prefix.to_vec(),
            leaf: None,
            is_variable: false,
            edges: EdgeSet::default(),
        }
    }

    fn variable(token: &[u8]) -> Self {
        Self {
            prefix: token.to_vec(),
            leaf: None,
            is_variable: true,
            edges: EdgeSet::default(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.is_variable
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&Leaf<T>> {
        self.leaf.as_ref()
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeSet<T> {
        &self.edges
    }

    pub fn add_edge(&mut self, label: u8, child: Box<Node<T>>) -> Result<(), RouterError> {
        self.edges.insert(label, child)
    }

    #[must_use]
    pub fn find_edge(&self, label: u8) -> Option<&Node<T>> {
        self.edges.get(label)
    }

    fn find_edge_mut(&mut self, label: u8) -> Option<&mut Node<T>> {
        self.edges.get_mut(label)
    }

    pub fn update_edge(
        &mut self,
        label: u8,
        child: Box<Node<T>>,
    ) -> Result<Box<Node<T>>, RouterError> {
        self.edges.update(label, child)
    }

    /// Split the child under `label` after `at` bytes of its prefix
    ///
    /// A new intermediate node holding the shared part takes the child's
    /// place and the shortened child hangs below it.
    fn split_edge(&mut self, label: u8, at: usize) -> Result<(), RouterError> {
        let shared = match self.find_edge(label) {
            Some(child) => child.prefix[..at].to_vec(),
            None => return Err(RouterError::MissingEdge { label }),
        };
        let mut child = self.update_edge(label, Box::new(Node::literal(&shared)))?;
        child.prefix.drain(..at);
        let child_label = *child
            .prefix
            .first()
            .ok_or(RouterError::MissingEdge { label })?;
        self.find_edge_mut(label)
            .ok_or(RouterError::MissingEdge { label })?
            .add_edge(child_label, child)
    }

    /// Fold a single literal child into this leafless literal node
    fn merge_only_child(&mut self) {
        if self.is_variable || self.leaf.is_some() || self.edges.len() != 1 {
            return;
        }
        let Some(label) = self.edges.labels().next() else {
            return;
        };
        if self.edges.get(label).is_some_and(Node::is_variable) {
            return;
        }
        if let Some(child) = self.edges.remove(label) {
            let child = *child;
            self.prefix.extend_from_slice(&child.prefix);
            self.leaf = child.leaf;
            self.edges = child.edges;
        }
    }
}

/// Radix tree holding the routes of one HTTP method
#[derive(Debug, Clone)]
pub struct MethodTree<T> {
    method: Method,
    root: Node<T>,
    size: usize,
}

impl<T> MethodTree<T> {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            root: Node::root(),
            size: 0,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Number of leaves (registered keys)
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Insert `value` under `key`
    ///
    /// Re-inserting an existing key is an update: the leaf's value and
    /// pattern are replaced and the previous value is returned. The tree
    /// size only grows when a new leaf is attached.
    pub fn insert(&mut self, key: &str, path: Path, value: T) -> Result<Option<T>, RouterError> {
        let key = trim_trailing_slash(key);
        let bytes = key.as_bytes();
        let mut node = &mut self.root;
        let mut offset = 0;

        loop {
            let search = &bytes[offset..];
            let Some(&label) = search.first() else {
                return Ok(match node.leaf.as_mut() {
                    Some(leaf) => {
                        leaf.path = path;
                        Some(mem::replace(&mut leaf.value, value))
                    }
                    None => {
                        node.leaf = Some(Leaf {
                            key: key.to_string(),
                            path,
                            value,
                        });
                        self.size += 1;
                        None
                    }
                });
            };

            if label == VARIABLE_MARKER && at_segment_start(bytes, offset) {
                let token = &search[..segment_len(search)];
                match node.find_edge(label) {
                    Some(existing) if existing.is_variable && existing.prefix == token => {}
                    Some(existing) => {
                        return Err(RouterError::ConflictingVariable {
                            existing: String::from_utf8_lossy(&existing.prefix).into_owned(),
                            new: String::from_utf8_lossy(token).into_owned(),
                        });
                    }
                    None => node.add_edge(label, Box::new(Node::variable(token)))?,
                }
                node = node
                    .find_edge_mut(label)
                    .ok_or(RouterError::MissingEdge { label })?;
                offset += token.len();
                continue;
            }

            let run = literal_run(search);
            let (common, child_len) = match node.find_edge(label) {
                Some(child) => (longest_common_prefix(run, &child.prefix), child.prefix.len()),
                None => {
                    node.add_edge(label, Box::new(Node::literal(run)))?;
                    (run.len(), run.len())
                }
            };
            if common < child_len {
                node.split_edge(label, common)?;
            }
            node = node
                .find_edge_mut(label)
                .ok_or(RouterError::MissingEdge { label })?;
            offset += common;
        }
    }

    /// Resolve a request path, trying a case-folded pass when needed
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<(&Leaf<T>, ParamVec)> {
        self.lookup_with(path, true)
    }

    /// Resolve a request path
    ///
    /// With `case_fold` disabled only exact literal edges are followed, so
    /// case-insensitive routes match lower-case requests only.
    #[must_use]
    pub fn lookup_with(&self, path: &str, case_fold: bool) -> Option<(&Leaf<T>, ParamVec)> {
        let path = trim_trailing_slash(path);
        let folded = (case_fold && path.bytes().any(|b| b.is_ascii_uppercase()))
            .then(|| path.to_ascii_lowercase());
        Self::find(
            &self.root,
            path.as_bytes(),
            folded.as_deref().map(str::as_bytes),
            true,
            path,
        )
    }

    /// `folded` is the lowercased `search`, byte-aligned with it
    fn find<'a>(
        node: &'a Node<T>,
        search: &[u8],
        folded: Option<&[u8]>,
        segment_start: bool,
        original: &str,
    ) -> Option<(&'a Leaf<T>, ParamVec)> {
        let Some(&label) = search.first() else {
            let leaf = node.leaf.as_ref()?;
            return leaf.path.parse(original).map(|params| (leaf, params));
        };

        let descend = |child: &'a Node<T>| {
            let n = child.prefix.len();
            let boundary = child.prefix.last() == Some(&b'/');
            Self::find(child, &search[n..], folded.map(|f| &f[n..]), boundary, original)
        };

        if let Some(child) = node.find_edge(label).filter(|c| !c.is_variable) {
            if search.starts_with(child.prefix.as_slice()) {
                if let Some(hit) = descend(child) {
                    return Some(hit);
                }
            }
        }

        if let Some(lower) = folded {
            if let Some(child) = lower
                .first()
                .and_then(|&l| node.find_edge(l))
                .filter(|c| !c.is_variable)
            {
                // skip the edge already walked by the exact branch
                let prefix = child.prefix.as_slice();
                if lower.starts_with(prefix) && !search.starts_with(prefix) {
                    if let Some(hit) = descend(child) {
                        return Some(hit);
                    }
                }
            }
        }

        if segment_start {
            if let Some(child) = node.find_edge(VARIABLE_MARKER).filter(|c| c.is_variable) {
                let end = segment_len(search);
                if end > 0 {
                    return Self::find(
                        child,
                        &search[end..],
                        folded.map(|f| &f[end..]),
                        false,
                        original,
                    );
                }
            }
        }
        None
    }

    /// Leaf registered under exactly `key` (variable tokens included)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Leaf<T>> {
        let mut node = &self.root;
        let mut search = trim_trailing_slash(key).as_bytes();
        while let Some(&label) = search.first() {
            node = node.find_edge(label)?;
            search = search.strip_prefix(node.prefix.as_slice())?;
        }
        node.leaf.as_ref()
    }

    /// Remove the leaf registered under exactly `key`
    ///
    /// Nodes left without a leaf and without edges are pruned, and a leafless
    /// literal node with a single literal child is merged with it.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let key = trim_trailing_slash(key);
        let removed = Self::remove_from(&mut self.root, key.as_bytes())?;
        self.size -= 1;
        Some(removed.value)
    }

    fn remove_from(node: &mut Node<T>, search: &[u8]) -> Option<Leaf<T>> {
        let Some(&label) = search.first() else {
            return node.leaf.take();
        };
        let child = node.find_edge_mut(label)?;
        let rest = search.strip_prefix(child.prefix.as_slice())?;
        let removed = Self::remove_from(child, rest)?;

        if child.leaf.is_none() {
            if child.edges.is_empty() {
                node.edges.remove(label);
            } else {
                child.merge_only_child();
            }
        }
        Some(removed)
    }

    /// All leaves in key order
    #[must_use]
    pub fn leaves(&self) -> Vec<&Leaf<T>> {
        let mut out = Vec::with_capacity(self.size);
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(leaf) = &node.leaf {
                out.push(leaf);
            }
            stack.extend(node.edges.iter().rev().map(|(_, child)| child));
        }
        out
    }

    /// Render the tree, one node per line, for debugging
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(0usize, &self.root)];
        while let Some((depth, node)) = stack.pop() {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&String::from_utf8_lossy(&node.prefix));
            if node.prefix.is_empty() {
                out.push_str("<root>");
            }
            if node.is_variable {
                out.push_str(" (var)");
            }
            if let Some(leaf) = &node.leaf {
                out.push_str(" => ");
                out.push_str(&leaf.key);
            }
            out.push('\n');
            stack.extend(
                node.edges
                    .iter()
                    .rev()
                    .map(|(_, child)| (depth + 1, child)),
            );
        }
        out
    }
}

fn at_segment_start(key: &[u8], offset: usize) -> bool {
    offset == 0 || key.get(offset - 1) == Some(&b'/')
}

/// Length of the request segment at the start of `search`
fn segment_len(search: &[u8]) -> usize {
    search
        .iter()
        .position(|&b| b == b'/')
        .unwrap_or(search.len())
}

/// Literal bytes up to (excluding) the next variable token
fn literal_run(search: &[u8]) -> &[u8] {
    let end = search
        .windows(2)
        .position(|w| w[0] == b'/' && w[1] == VARIABLE_MARKER)
        .map_or(search.len(), |i| i + 1);
    &search[..end]
}

fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MethodTree<&'static str> {
        MethodTree::new(Method::GET)
    }

    fn insert(tree: &mut MethodTree<&'static str>, key: &str, value: &'static str) -> Option<&'static str> {
        tree.insert(key, Path::new(key, false), value).unwrap()
    }

    fn resolve<'a>(tree: &'a MethodTree<&'static str>, path: &str) -> Option<(&'static str, ParamVec)> {
        tree.lookup(path).map(|(leaf, params)| (leaf.value, params))
    }

    fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
        params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    fn assert_sorted_unique_labels<T>(node: &Node<T>) {
        let labels: Vec<u8> = node.edges().labels().collect();
        assert!(
            labels.windows(2).all(|w| w[0] < w[1]),
            "labels not strictly ascending: {labels:?}"
        );
        for (label, child) in node.edges().iter() {
            assert_eq!(child.prefix().first(), Some(&label));
            assert_sorted_unique_labels(child);
        }
    }

    #[test]
    fn test_prefix_splitting() {
        let mut t = tree();
        assert_eq!(insert(&mut t, "foo", "a"), None);
        assert_eq!(insert(&mut t, "foo/bar/baz", "b"), None);
        assert_eq!(insert(&mut t, "foo/baz/bar", "c"), None);
        assert_eq!(t.len(), 3);

        assert_eq!(t.get("foo").map(|l| l.value), Some("a"));
        assert_eq!(t.get("foo/bar/baz").map(|l| l.value), Some("b"));
        assert_eq!(t.get("foo/baz/bar").map(|l| l.value), Some("c"));
        assert_eq!(resolve(&t, "foo/bar/baz").map(|r| r.0), Some("b"));
        assert_eq!(resolve(&t, "foo/baz/bar").map(|r| r.0), Some("c"));
        assert!(t.get("foo/ba").is_none());
        assert_sorted_unique_labels(t.root());

        // "foo" keeps its leaf and gains the shared "/ba" split below it
        let foo = t.root().find_edge(b'f').unwrap();
        assert_eq!(foo.prefix(), b"foo");
        assert!(foo.is_leaf());
        let shared = foo.find_edge(b'/').unwrap();
        assert_eq!(shared.prefix(), b"/ba");
        assert!(!shared.is_leaf());
        assert_eq!(shared.edges().labels().collect::<Vec<_>>(), vec![b'r', b'z']);
    }

    #[test]
    fn test_update_returns_previous_value() {
        let mut t = tree();
        assert_eq!(insert(&mut t, "/user", "first"), None);
        assert_eq!(insert(&mut t, "/users", "plural"), None);
        assert_eq!(insert(&mut t, "/user", "second"), Some("first"));
        assert_eq!(t.len(), 2);
        assert_eq!(resolve(&t, "/user").map(|r| r.0), Some("second"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let mut t = tree();
        insert(&mut t, "/docs/", "docs");
        insert(&mut t, "/", "root");
        assert_eq!(t.get("/docs").map(|l| l.key.as_str()), Some("/docs"));
        assert_eq!(t.get("/").map(|l| l.key.as_str()), Some("/"));
        assert_eq!(resolve(&t, "/docs/").map(|r| r.0), Some("docs"));
        assert_eq!(resolve(&t, "/").map(|r| r.0), Some("root"));
    }

    #[test]
    fn test_variable_extraction() {
        let mut t = tree();
        insert(&mut t, "/user/:id", "user");
        insert(&mut t, "/user/:id/posts/:post", "post");

        let (value, params) = resolve(&t, "/user/42").unwrap();
        assert_eq!(value, "user");
        assert_eq!(param(&params, "id"), Some("42"));

        let (value, params) = resolve(&t, "/user/7/posts/abc").unwrap();
        assert_eq!(value, "post");
        assert_eq!(param(&params, "id"), Some("7"));
        assert_eq!(param(&params, "post"), Some("abc"));

        assert!(resolve(&t, "/user/42/extra").is_none());
        assert!(resolve(&t, "/user").is_none());
        assert!(resolve(&t, "/user//posts/x").is_none());
    }

    #[test]
    fn test_variable_occupies_own_node() {
        let mut t = tree();
        insert(&mut t, "/user/:id/posts", "posts");
        let user = t.root().find_edge(b'/').unwrap();
        assert_eq!(user.prefix(), b"/user/");
        let var = user.find_edge(b':').unwrap();
        assert!(var.is_variable());
        assert_eq!(var.prefix(), b":id");
        assert_eq!(var.find_edge(b'/').unwrap().prefix(), b"/posts");
    }

    #[test]
    fn test_literal_takes_precedence_over_variable() {
        let mut t = tree();
        insert(&mut t, "/user/:id", "by_id");
        insert(&mut t, "/user/me", "me");
        insert(&mut t, "/user/:id/posts", "posts");

        assert_eq!(resolve(&t, "/user/me").map(|r| r.0), Some("me"));
        assert_eq!(resolve(&t, "/user/mel").map(|r| r.0), Some("by_id"));
        assert_eq!(resolve(&t, "/user/m").map(|r| r.0), Some("by_id"));
        // literal branch dead-ends, so the variable branch is tried
        let (value, params) = resolve(&t, "/user/me/posts").unwrap();
        assert_eq!(value, "posts");
        assert_eq!(param(&params, "id"), Some("me"));
    }

    #[test]
    fn test_conflicting_variable_names_rejected() {
        let mut t = tree();
        insert(&mut t, "/user/:id/posts", "posts");
        let err = t
            .insert("/user/:name/comments", Path::new("/user/:name/comments", false), "comments")
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::ConflictingVariable {
                existing: ":id".to_string(),
                new: ":name".to_string(),
            }
        );
        // same name at the same position is fine
        assert_eq!(insert(&mut t, "/user/:id/comments", "comments"), None);
    }

    #[test]
    fn test_colon_inside_segment_is_literal() {
        let mut t = tree();
        insert(&mut t, "/a:b", "literal");
        insert(&mut t, "/a", "a");
        assert_eq!(resolve(&t, "/a:b").map(|r| r.0), Some("literal"));
        assert!(resolve(&t, "/a:c").is_none());
        assert!(!t.root().find_edge(b'/').unwrap().find_edge(b':').unwrap().is_variable());
    }

    #[test]
    fn test_case_folded_pass() {
        let mut t = tree();
        let folded = Path::new("/Foo/:Name", true);
        t.insert(&folded.tree_key(), folded, "folded").unwrap();
        insert(&mut t, "/Bar", "strict");

        let (value, params) = resolve(&t, "/FOO/MiXeD").unwrap();
        assert_eq!(value, "folded");
        assert_eq!(param(&params, "Name"), Some("MiXeD"));
        assert!(resolve(&t, "/bar").is_none());
        assert!(resolve(&t, "/BAR").is_none());
        assert_eq!(resolve(&t, "/Bar").map(|r| r.0), Some("strict"));
        assert!(t.lookup_with("/FOO/x", false).is_none());
        assert!(t.lookup_with("/foo/x", false).is_some());
    }

    #[test]
    fn test_folded_literal_beats_variable_sibling() {
        let mut t = tree();
        insert(&mut t, "/:page", "page");
        let about = Path::new("/About", true);
        t.insert(&about.tree_key(), about, "about").unwrap();

        assert_eq!(resolve(&t, "/About").map(|r| r.0), Some("about"));
        assert_eq!(resolve(&t, "/ABOUT").map(|r| r.0), Some("about"));
        assert_eq!(resolve(&t, "/about").map(|r| r.0), Some("about"));
        let (value, params) = resolve(&t, "/Contact").unwrap();
        assert_eq!(value, "page");
        assert_eq!(param(&params, "page"), Some("Contact"));
        // without folding the upper-case spelling falls through to the variable
        assert_eq!(t.lookup_with("/About", false).map(|r| r.0.value), Some("page"));
    }

    #[test]
    fn test_folded_literal_under_folded_parent() {
        let mut t = tree();
        for (pattern, value) in [("/Users/:id", "user"), ("/Users/me", "me")] {
            let path = Path::new(pattern, true);
            t.insert(&path.tree_key(), path, value).unwrap();
        }

        assert_eq!(resolve(&t, "/USERS/ME").map(|r| r.0), Some("me"));
        assert_eq!(resolve(&t, "/users/Me").map(|r| r.0), Some("me"));
        let (value, params) = resolve(&t, "/Users/AbC").unwrap();
        assert_eq!(value, "user");
        assert_eq!(param(&params, "id"), Some("AbC"));
    }

    #[test]
    fn test_multibyte_prefixes() {
        let mut t = tree();
        insert(&mut t, "/caf\u{e9}", "e-acute");
        insert(&mut t, "/caf\u{e8}", "e-grave");
        assert_eq!(resolve(&t, "/caf\u{e9}").map(|r| r.0), Some("e-acute"));
        assert_eq!(resolve(&t, "/caf\u{e8}").map(|r| r.0), Some("e-grave"));
        assert_sorted_unique_labels(t.root());
    }

    #[test]
    fn test_remove_prunes_and_compacts() {
        let mut t = tree();
        insert(&mut t, "/api/alpha", "a");
        insert(&mut t, "/api/beta", "b");
        insert(&mut t, "/api/:id", "id");
        assert_eq!(t.len(), 3);

        assert_eq!(t.remove("/api/alpha"), Some("a"));
        assert_eq!(t.len(), 2);
        assert!(resolve(&t, "/api/alpha").map(|r| r.0) == Some("id"));

        assert_eq!(t.remove("/api/:id"), Some("id"));
        assert!(resolve(&t, "/api/alpha").is_none());

        // "/api/" is leafless with one literal child, so it is merged
        let only = t.root().find_edge(b'/').unwrap();
        assert_eq!(only.prefix(), b"/api/beta");
        assert!(only.is_leaf());
        assert!(only.edges().is_empty());

        assert_eq!(t.remove("/api/beta"), Some("b"));
        assert!(t.is_empty());
        assert!(t.root().edges().is_empty());
        assert_eq!(t.remove("/api/beta"), None);
    }

    #[test]
    fn test_remove_keeps_shared_prefix_leaf() {
        let mut t = tree();
        insert(&mut t, "/user", "user");
        insert(&mut t, "/users", "users");
        assert_eq!(t.remove("/users"), Some("users"));
        assert_eq!(resolve(&t, "/user").map(|r| r.0), Some("user"));
        let node = t.root().find_edge(b'/').unwrap();
        assert_eq!(node.prefix(), b"/user");
        assert!(node.edges().is_empty());
    }

    #[test]
    fn test_edge_set_rejects_duplicates_and_missing() {
        let mut edges: EdgeSet<()> = EdgeSet::default();
        edges.insert(b'b', Box::new(Node::literal(b"b"))).unwrap();
        edges.insert(b'a', Box::new(Node::literal(b"a"))).unwrap();
        assert_eq!(edges.labels().collect::<Vec<_>>(), vec![b'a', b'b']);
        assert_eq!(
            edges.insert(b'a', Box::new(Node::literal(b"a2"))),
            Err(RouterError::DuplicateEdge { label: b'a' })
        );
        assert_eq!(
            edges.update(b'z', Box::new(Node::literal(b"z"))).unwrap_err(),
            RouterError::MissingEdge { label: b'z' }
        );
        let old = edges.update(b'a', Box::new(Node::literal(b"ax"))).unwrap();
        assert_eq!(old.prefix(), b"a");
        assert_eq!(edges.get(b'a').unwrap().prefix(), b"ax");
    }

    #[test]
    fn test_leaves_and_dump() {
        let mut t = tree();
        insert(&mut t, "/b", "b");
        insert(&mut t, "/a/:id", "a");
        let keys: Vec<&str> = t.leaves().iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["/a/:id", "/b"]);
        let dump = t.dump();
        assert!(dump.contains(":id (var) => /a/:id"));
        assert!(dump.starts_with("<root>"));
    }
}
