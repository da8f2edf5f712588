use super::Middleware;
use crate::handler::{Request, Response};

/// Header-presence API key gate.
///
/// Rejects with 401 when the configured header is absent or empty. The
/// key's value is not validated against any store; a stricter
/// middleware layered inside this one owns value validation.
pub struct ApiKeyMiddleware {
    header: String,
}

impl ApiKeyMiddleware {
    /// Gate on the default `X-API-Key` header.
    #[must_use]
    pub fn new() -> Self {
        Self::with_header("X-API-Key")
    }

    /// Gate on a custom header name.
    #[must_use]
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Default for ApiKeyMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for ApiKeyMiddleware {
    fn before(&self, req: &mut Request) -> Option<Response> {
        match req.get_header(&self.header) {
            Some(value) if !value.is_empty() => None,
            _ => Some(Response::error(401, "Unauthorized")),
        }
    }
}
