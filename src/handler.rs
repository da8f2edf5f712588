//! Handler seam and the engine-owned request/response types.
//!
//! A [`Handler`] receives a mutable [`Request`] view and writes into a
//! [`Response`]. Completion is signaled by returning; handlers have no
//! return value and no error channel. Rejections, 404s, and recovered
//! panics are all expressed as responses.

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::ids::RequestId;

/// Maximum inline path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage for the dispatch hot path.
///
/// Parameter names use `Arc<str>` because they are shared with the route
/// pattern that produced them; cloning is an atomic increment rather
/// than a string copy. Values are per-request data and stay `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header/cookie storage for the dispatch hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A request handler.
///
/// Implemented by closures of the form
/// `Fn(&mut Request, &mut Response) + Send + Sync`. Composed handlers
/// produced by [`chain`](crate::middleware::chain) implement it too, so
/// middleware wrapping is invisible to the caller.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) {
        self(req, res)
    }
}

/// An inbound HTTP request as seen by handlers and middleware.
///
/// Header and cookie names are stored lowercased; lookup is
/// case-insensitive regardless. Path parameters are injected by the
/// router after a successful match, before the composed handler runs.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for log correlation.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path with the query string already split off.
    pub path: String,
    /// HTTP headers (lowercased names).
    pub headers: HeaderVec,
    /// Cookies parsed from the `Cookie` header.
    pub cookies: HeaderVec,
    /// Query string parameters, in wire order.
    pub query_params: ParamVec,
    /// Path parameters bound from named pattern segments.
    pub path_params: ParamVec,
    /// Raw request body bytes.
    pub body: Vec<u8>,
    /// Peer address, when the transport exposes one.
    pub remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Create an empty request for the given method and path.
    ///
    /// The server adapter fills the remaining fields from the wire;
    /// tests use this directly.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            query_params: ParamVec::new(),
            path_params: ParamVec::new(),
            body: Vec::new(),
            remote_addr: None,
        }
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: with duplicate parameter names
    /// at different path depths (e.g. `/org/{id}/user/{id}`), the
    /// deepest binding is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name, last occurrence winning
    /// (`?limit=10&limit=20` yields `20`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a header (name stored lowercased).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value));
    }

    /// The body as UTF-8 text, lossily converted.
    #[must_use]
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parse the body as JSON, if present and well-formed.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        match serde_json::from_slice(&self.body) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "JSON body parse failed");
                None
            }
        }
    }
}

/// An outbound HTTP response under construction.
///
/// A response starts unwritten; the constructors below produce written
/// responses, and assignment (`*res = Response::json(...)`) is the
/// conventional way for a handler or short-circuiting middleware to
/// commit one. The recovery middleware consults
/// [`Response::is_written`] to decide whether a 500 may still be
/// emitted.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, in emission order.
    pub headers: HeaderVec,
    /// Response body bytes.
    pub body: Vec<u8>,
    written: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// An unwritten response with status 200 and no headers or body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
            written: false,
        }
    }

    /// A plain-text response.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain".to_string()));
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
            written: true,
        }
    }

    /// A JSON response with a `content-type: application/json` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body: body.to_string().into_bytes(),
            written: true,
        }
    }

    /// An error response with the `{"error": message}` body shape.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// A raw-byte response with an explicit content type.
    #[must_use]
    pub fn bytes(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_string()));
        Self {
            status,
            headers,
            body,
            written: true,
        }
    }

    /// An empty-bodied response with the given status (e.g. 204).
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Vec::new(),
            written: true,
        }
    }

    /// Whether a handler or middleware has committed this response.
    #[inline]
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive on the name).
    ///
    /// Setting headers alone does not mark the response written; only
    /// committing a status and body does.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// The body as UTF-8 text, lossily converted.
    #[must_use]
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
