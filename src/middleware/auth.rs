use super::Middleware;
use crate::dispatcher::{Request, Response};

/// Rejects requests whose `authorization` header does not carry the
/// configured token
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, req: &Request) -> Option<Response> {
        match req.header("authorization") {
            Some(h) if h == self.token => None,
            _ => Some(Response::error(401, "Unauthorized")),
        }
    }
}
