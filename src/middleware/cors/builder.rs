use http::Method;

use super::{CorsConfigError, CorsMiddleware};

/// Builder for [`CorsMiddleware`] with a fluent API.
///
/// Unlike [`CorsMiddleware::new`], which panics on contradictory
/// settings, `build()` surfaces them as a [`CorsConfigError`].
///
/// # Example
///
/// ```
/// use manifold::middleware::CorsMiddlewareBuilder;
/// use http::Method;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_methods(&[Method::GET, Method::POST, Method::PUT])
///     .allowed_headers(&["Content-Type", "Authorization"])
///     .expose_headers(&["X-Total-Count"])
///     .max_age(3600)
///     .build()
///     .expect("valid CORS configuration");
/// ```
pub struct CorsMiddlewareBuilder {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
    max_age: Option<u32>,
}

impl CorsMiddlewareBuilder {
    /// Secure defaults: no origins allowed, common headers
    /// (`Content-Type`, `Authorization`), common methods
    /// (GET/POST/PUT/DELETE/OPTIONS), no credentials, nothing exposed,
    /// no preflight caching.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_origins: vec![],
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

    /// Set allowed origins. `&["*"]` allows all origins and cannot be
    /// combined with `allow_credentials(true)`.
    #[must_use]
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.allowed_origins = origins.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set allowed HTTP methods.
    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = methods.to_vec();
        self
    }

    /// Set allowed request headers. `&["*"]` allows all headers.
    #[must_use]
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.allowed_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Enable `Access-Control-Allow-Credentials`. Requires exact
    /// origins.
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Set headers exposed to client-side JavaScript.
    #[must_use]
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the preflight cache duration in seconds.
    #[must_use]
    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Validate the configuration and build the middleware.
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::WildcardWithCredentials`] when credentials
    ///   are enabled together with a `*` origin.
    /// - [`CorsConfigError::EmptyOriginsWithCredentials`] when
    ///   credentials are enabled but no origin was configured.
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        if self.allow_credentials && self.allowed_origins.iter().any(|o| o == "*") {
            return Err(CorsConfigError::WildcardWithCredentials);
        }
        if self.allow_credentials && self.allowed_origins.is_empty() {
            return Err(CorsConfigError::EmptyOriginsWithCredentials);
        }

        Ok(CorsMiddleware::new(
            self.allowed_origins,
            self.allowed_headers,
            self.allowed_methods,
            self.allow_credentials,
            self.expose_headers,
            self.max_age,
        ))
    }
}

impl Default for CorsMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}
