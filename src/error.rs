use std::fmt;

/// Errors raised while building or mutating the routing tables
///
/// Structural variants (`DuplicateEdge`, `MissingEdge`, `ConflictingVariable`)
/// are tree invariant violations. They are returned instead of panicking so
/// that a broken invariant surfaces as a registration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// An edge with this label already exists on the node
    DuplicateEdge {
        /// First byte of the child prefix
        label: u8,
    },
    /// An edge was expected on the node but was never created
    MissingEdge {
        /// First byte of the child prefix
        label: u8,
    },
    /// Two differently named variables compete for the same tree position
    ///
    /// e.g. `/user/:id/posts` and `/user/:name/comments` in one method tree.
    ConflictingVariable {
        /// Variable token already in the tree (`:id`)
        existing: String,
        /// Variable token being inserted (`:name`)
        new: String,
    },
    /// HTTP method outside the supported set
    InvalidMethod(String),
    /// Route pattern was empty
    EmptyPattern,
    /// Route group prefix needs at least two characters after trimming `/`
    GroupPrefixTooShort(String),
    /// Two routes share a path pattern and at least one method
    Overlap {
        /// Display form of the rejected route
        route: String,
        /// Display form of the route already registered
        existing: String,
    },
    /// The registry has entered the serving phase and rejects mutation
    Frozen,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::DuplicateEdge { label } => {
                write!(f, "edge '{}' already exists on node", char::from(*label))
            }
            RouterError::MissingEdge { label } => {
                write!(f, "replacing missing edge '{}'", char::from(*label))
            }
            RouterError::ConflictingVariable { existing, new } => write!(
                f,
                "variable segment \"{new}\" conflicts with \"{existing}\" at the same position"
            ),
            RouterError::InvalidMethod(method) => {
                write!(f, "method \"{method}\" is not a supported HTTP method")
            }
            RouterError::EmptyPattern => write!(f, "route must not be empty"),
            RouterError::GroupPrefixTooShort(prefix) => write!(
                f,
                "route group \"{prefix}\" needs to have at least one symbol"
            ),
            RouterError::Overlap { route, existing } => write!(
                f,
                "the route \"{route}\" overlaps with the existing route \"{existing}\""
            ),
            RouterError::Frozen => write!(f, "routes cannot be registered once serving has begun"),
        }
    }
}

impl std::error::Error for RouterError {}

/// Registration failures collected while a router was being built
///
/// Returned by [`Router::freeze`](crate::router::Router::freeze) so a batch
/// of configuration mistakes is reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationErrors {
    errors: Vec<RouterError>,
}

impl RegistrationErrors {
    pub(crate) fn new(errors: Vec<RouterError>) -> Self {
        Self { errors }
    }

    /// All collected errors in registration order
    #[must_use]
    pub fn errors(&self) -> &[RouterError] {
        &self.errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} route registration error(s)", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RegistrationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_names_both_routes() {
        let err = RouterError::Overlap {
            route: "[GET] /user/:id".to_string(),
            existing: "[GET DELETE] /user/:id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the route \"[GET] /user/:id\" overlaps with the existing route \"[GET DELETE] /user/:id\""
        );
    }

    #[test]
    fn test_registration_errors_lists_every_error() {
        let errs = RegistrationErrors::new(vec![
            RouterError::InvalidMethod("FETCH".to_string()),
            RouterError::EmptyPattern,
        ]);
        let text = errs.to_string();
        assert!(text.starts_with("2 route registration error(s)"));
        assert!(text.contains("FETCH"));
        assert!(text.contains("must not be empty"));
        assert_eq!(errs.len(), 2);
    }
}
