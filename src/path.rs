//! Path Matcher
//!
//! Parses route patterns such as `/user/:id/posts` into ordered segments and
//! matches request paths against them, binding variable segments into a
//! [`ParamVec`].
//!
//! Segments are delimited by `/`. A segment that begins with the variable
//! marker `:` binds exactly one request segment; every other segment is a
//! literal, compared byte-for-byte or ASCII case-insensitively when the
//! pattern opted into case-insensitive matching. Variable values are never
//! case-folded.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Byte that introduces a variable segment in a route pattern
pub const VARIABLE_MARKER: u8 = b':';

/// Maximum number of route parameters before heap allocation.
/// Most REST APIs have <=4 path params (e.g. /users/:id/posts/:post_id).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated route parameter storage.
///
/// Param names use `Arc<str>` because they come from the registered pattern
/// (known at startup) and `Arc::clone()` is an atomic increment. Values are
/// per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One `/`-delimited component of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Literal text, or the variable name without its `:` marker
    pub value: Arc<str>,
    /// Whether this segment binds a request segment
    pub is_variable: bool,
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(char::from(VARIABLE_MARKER)) {
            Some(name) => Self {
                value: Arc::from(name),
                is_variable: true,
            },
            None => Self {
                value: Arc::from(raw),
                is_variable: false,
            },
        }
    }
}

/// A parsed route pattern
///
/// The segment count is fixed; a request path only matches when it has the
/// same number of segments.
#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<PathSegment>,
    ignore_case: bool,
}

impl Path {
    /// Parse a route pattern
    ///
    /// Empty segments are dropped, so `/user//:id/` and `/user/:id` are the
    /// same pattern. `/` parses to a pattern with no segments.
    #[must_use]
    pub fn new(pattern: &str, ignore_case: bool) -> Self {
        Self {
            segments: split_segments(pattern).map(PathSegment::parse).collect(),
            ignore_case,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub(crate) fn set_ignore_case(&mut self, ignore_case: bool) {
        self.ignore_case = ignore_case;
    }

    /// Names of the variable segments, in pattern order
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.is_variable)
            .map(|s| s.value.as_ref())
    }

    /// Match a request path against this pattern
    ///
    /// Returns the bound variables on success, `None` when the segment count
    /// differs or a literal segment does not match.
    #[must_use]
    pub fn parse(&self, route: &str) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        let mut parts = split_segments(route);

        for segment in &self.segments {
            let part = parts.next()?;
            if segment.is_variable {
                params.push((Arc::clone(&segment.value), part.to_string()));
            } else if self.ignore_case {
                if !segment.value.eq_ignore_ascii_case(part) {
                    return None;
                }
            } else if segment.value.as_ref() != part {
                return None;
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Structural equality used for overlap detection
    ///
    /// Variable segments are equal regardless of their names since they
    /// bind the same requests. Literal segments compare case-insensitively
    /// when either pattern ignores case.
    #[must_use]
    pub fn equals(&self, other: &Path) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }
        let fold = self.ignore_case || other.ignore_case;
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(a, b)| match (a.is_variable, b.is_variable) {
                (true, true) => true,
                (false, false) if fold => a.value.eq_ignore_ascii_case(&b.value),
                (false, false) => a.value == b.value,
                _ => false,
            })
    }

    /// Key under which this pattern is stored in a method tree
    ///
    /// Literal segments of case-insensitive patterns are lowercased so the
    /// case-folded lookup pass can reach them.
    #[must_use]
    pub fn tree_key(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut key = String::new();
        for segment in &self.segments {
            key.push('/');
            if segment.is_variable {
                key.push(char::from(VARIABLE_MARKER));
                key.push_str(&segment.value);
            } else if self.ignore_case {
                key.push_str(&segment.value.to_ascii_lowercase());
            } else {
                key.push_str(&segment.value);
            }
        }
        key
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            f.write_str("/")?;
            if segment.is_variable {
                write!(f, "{}", char::from(VARIABLE_MARKER))?;
            }
            f.write_str(&segment.value)?;
        }
        Ok(())
    }
}

fn split_segments(route: &str) -> impl Iterator<Item = &str> {
    route.split('/').filter(|s| !s.is_empty())
}

/// Drop a trailing `/` from a request path, keeping `/` itself
#[must_use]
pub fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
