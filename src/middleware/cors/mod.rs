mod builder;
mod error;

pub use builder::CorsMiddlewareBuilder;
pub use error::CorsConfigError;

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use regex::Regex;
use tracing::debug;

use crate::handler::{Request, Response};
use crate::middleware::Middleware;

/// Origin validation strategy.
#[derive(Clone)]
pub enum OriginValidation {
    /// Exact string matching.
    Exact(Vec<String>),
    /// Wildcard (allow all origins).
    Wildcard,
    /// Regex pattern matching.
    Regex(Vec<Regex>),
    /// Custom validation function.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl std::fmt::Debug for OriginValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginValidation::Exact(origins) => f.debug_tuple("Exact").field(origins).finish(),
            OriginValidation::Wildcard => write!(f, "Wildcard"),
            OriginValidation::Regex(patterns) => f
                .debug_tuple("Regex")
                .field(&patterns.iter().map(|re| re.as_str()).collect::<Vec<_>>())
                .finish(),
            OriginValidation::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl OriginValidation {
    fn is_allowed(&self, origin: &str) -> bool {
        match self {
            OriginValidation::Exact(origins) => origins.iter().any(|o| o == origin),
            OriginValidation::Wildcard => true,
            OriginValidation::Regex(patterns) => patterns.iter().any(|re| re.is_match(origin)),
            OriginValidation::Custom(validator) => validator(origin),
        }
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Wildcard)
    }
}

/// CORS (Cross-Origin Resource Sharing) middleware.
///
/// Requests without an `Origin` header pass through untouched. Requests
/// from a disallowed origin also pass through, just without any CORS
/// permission headers: the engine never rejects based on origin, it only
/// withholds the grant, leaving same-origin and non-browser clients
/// unaffected.
///
/// An `OPTIONS` preflight from an allowed origin short-circuits with 204
/// and the permission headers; the wrapped handler never runs. Allowed
/// simple requests get `Access-Control-Allow-Origin` (plus credentials
/// and exposed headers when configured) attached on the way out.
///
/// # Credentials
///
/// When `allow_credentials` is `true`, wildcard origin (`*`) is not
/// permitted by the CORS specification. [`CorsMiddleware::new`] panics
/// on that combination; [`CorsMiddlewareBuilder`] reports it as a
/// [`CorsConfigError`] instead.
///
/// # Usage
///
/// ```
/// use manifold::middleware::CorsMiddlewareBuilder;
/// use http::Method;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .allowed_origins(&["https://example.com"])
///     .allowed_methods(&[Method::GET, Method::POST])
///     .allow_credentials(true)
///     .build()
///     .expect("valid CORS configuration");
/// ```
pub struct CorsMiddleware {
    pub(crate) origin_validation: OriginValidation,
    pub(crate) allowed_headers: Vec<String>,
    pub(crate) allowed_methods: Vec<Method>,
    pub(crate) allow_credentials: bool,
    pub(crate) expose_headers: Vec<String>,
    pub(crate) max_age: Option<u32>,
}

impl CorsMiddleware {
    /// Create a CORS middleware from explicit configuration.
    ///
    /// `allowed_origins` may contain `"*"` to allow all origins; only
    /// one origin is ever returned per response.
    ///
    /// # Panics
    ///
    /// Panics if `allow_credentials` is `true` and `allowed_origins`
    /// contains `"*"`: that combination violates the CORS specification.
    /// Construction happens at startup, never on the dispatch path.
    pub fn new(
        allowed_origins: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
        allow_credentials: bool,
        expose_headers: Vec<String>,
        max_age: Option<u32>,
    ) -> Self {
        let origin_validation = if allowed_origins.iter().any(|o| o == "*") {
            OriginValidation::Wildcard
        } else {
            OriginValidation::Exact(allowed_origins)
        };

        if allow_credentials && origin_validation.is_wildcard() {
            #[allow(clippy::panic)]
            panic!(
                "CORS configuration error: cannot use wildcard origin (*) with credentials. \
                When allow_credentials is true, you must specify exact origins."
            );
        }

        Self {
            origin_validation,
            allowed_headers,
            allowed_methods,
            allow_credentials,
            expose_headers,
            max_age,
        }
    }

    /// Create a CORS middleware whose origins are matched by regex.
    ///
    /// # Panics
    ///
    /// Panics if any pattern fails to compile. Construction happens at
    /// startup, never on the dispatch path.
    pub fn with_regex_patterns(
        origin_patterns: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
        allow_credentials: bool,
        expose_headers: Vec<String>,
        max_age: Option<u32>,
    ) -> Self {
        let patterns: Result<Vec<Regex>, _> = origin_patterns.iter().map(|p| Regex::new(p)).collect();
        let patterns = patterns.unwrap_or_else(|e| {
            #[allow(clippy::panic)]
            panic!("CORS configuration error: invalid regex pattern: {e}");
        });

        Self {
            origin_validation: OriginValidation::Regex(patterns),
            allowed_headers,
            allowed_methods,
            allow_credentials,
            expose_headers,
            max_age,
        }
    }

    /// Create a CORS middleware with a custom origin validator.
    pub fn with_custom_validator<F>(
        validator: F,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
        allow_credentials: bool,
        expose_headers: Vec<String>,
        max_age: Option<u32>,
    ) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            origin_validation: OriginValidation::Custom(Arc::new(validator)),
            allowed_headers,
            allowed_methods,
            allow_credentials,
            expose_headers,
            max_age,
        }
    }

    /// A permissive configuration for development and testing.
    ///
    /// Allows all origins with common methods and headers. Do not use in
    /// production.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            origin_validation: OriginValidation::Wildcard,
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allow_credentials: false,
            expose_headers: vec![],
            max_age: None,
        }
    }

    /// Validate an origin, returning the value to echo in
    /// `Access-Control-Allow-Origin`: `"*"` under wildcard validation,
    /// the origin itself otherwise. `None` means not allowed.
    fn validate_origin(&self, origin: &str) -> Option<String> {
        if self.origin_validation.is_allowed(origin) {
            if self.origin_validation.is_wildcard() {
                Some("*".to_string())
            } else {
                Some(origin.to_string())
            }
        } else {
            None
        }
    }

    /// Whether the request targets its own origin, in which case CORS
    /// headers are unnecessary. Compares the `Host` header against the
    /// host (and host:port) of the `Origin` value.
    fn is_same_origin(&self, req: &Request, origin: &str) -> bool {
        let host = match req.get_header("host") {
            Some(h) => h,
            None => return false,
        };

        let origin_parts: Vec<&str> = origin.split("://").collect();
        if origin_parts.len() != 2 {
            return false;
        }

        let origin_host_port = origin_parts[1];
        let origin_host = origin_host_port.split(':').next().unwrap_or(origin_host_port);

        host.eq_ignore_ascii_case(origin_host) || host.eq_ignore_ascii_case(origin_host_port)
    }

    fn preflight_response(&self, origin: &str) -> Response {
        let mut res = Response::empty(204);
        res.set_header("access-control-allow-origin", origin.to_string());
        res.set_header(
            "access-control-allow-methods",
            self.allowed_methods
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );
        res.set_header(
            "access-control-allow-headers",
            self.allowed_headers.join(", "),
        );
        if self.allow_credentials {
            res.set_header("access-control-allow-credentials", "true".to_string());
        }
        if let Some(age) = self.max_age {
            res.set_header("access-control-max-age", age.to_string());
        }
        res.set_header("vary", "Origin".to_string());
        res
    }
}

/// Secure by default: no origins allowed until configured explicitly.
/// For development, use [`CorsMiddleware::permissive`].
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            origin_validation: OriginValidation::Exact(vec![]),
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allow_credentials: false,
            expose_headers: vec![],
            max_age: None,
        }
    }
}

impl Middleware for CorsMiddleware {
    /// Short-circuit allowed-origin preflights with 204 and the
    /// permission headers. Everything else proceeds downstream,
    /// including preflights from disallowed origins (which get no CORS
    /// headers at all).
    fn before(&self, req: &mut Request) -> Option<Response> {
        if req.method != Method::OPTIONS {
            return None;
        }
        let origin = req.get_header("origin")?;
        let validated = self.validate_origin(origin)?;
        Some(self.preflight_response(&validated))
    }

    /// Attach the cross-origin grant to responses for allowed origins.
    fn after(&self, req: &Request, res: &mut Response, _latency: Duration) {
        let origin = match req.get_header("origin") {
            Some(o) => o,
            None => return,
        };

        if self.is_same_origin(req, origin) {
            debug!("CORS: same-origin request, skipping CORS headers");
            return;
        }

        let validated = match self.validate_origin(origin) {
            Some(o) => o,
            None => return,
        };

        // Only one origin per response, per the CORS spec.
        res.set_header("access-control-allow-origin", validated);
        if self.allow_credentials {
            res.set_header("access-control-allow-credentials", "true".to_string());
        }
        if !self.expose_headers.is_empty() {
            res.set_header(
                "access-control-expose-headers",
                self.expose_headers.join(", "),
            );
        }
        res.set_header("vary", "Origin".to_string());
    }
}
