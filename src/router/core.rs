//! Top-level route registry and dispatch entry point
//!
//! The [`Router`] owns the segment trie and the list of global middleware.
//! Registration composes middleware around the handler immediately, so the
//! trie only ever stores fully composed handlers and dispatch never consults
//! a middleware list.
//!
//! ## Lifecycle
//!
//! Build-then-serve: all registration methods take `&mut self` and the
//! serving path takes `&self`, so the borrow checker enforces that the
//! router is fully built before it is shared with a serving loop. Routes
//! are never removed once registered.

use http::Method;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::group::Group;
use super::trie::{PathTrie, RouteMatch};
use crate::handler::{Handler, Request, Response};
use crate::middleware::{chain, Middleware};
use crate::path::{join, normalize};
use crate::static_files::StaticHandler;

/// HTTP router with registration-time middleware composition.
///
/// Middleware attached with [`use_middleware`](Router::use_middleware) is
/// snapshotted into each route at the moment that route is registered.
/// Attaching middleware after a route has been registered does not affect
/// that route, only later registrations.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use manifold::{Request, Response, Router};
///
/// let mut router = Router::new();
/// router.get("/hello/{name}", |req: &mut Request, res: &mut Response| {
///     let name = req.get_path_param("name").unwrap_or("world");
///     *res = Response::text(200, format!("hello {name}"));
/// });
///
/// let mut req = Request::new(Method::GET, "/hello/rust");
/// let res = router.serve(&mut req);
/// assert_eq!(res.body_str(), "hello rust");
/// ```
pub struct Router {
    trie: PathTrie,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router with no routes and no global middleware.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie: PathTrie::new(),
            middleware: Vec::new(),
        }
    }

    /// Append a middleware to the global list.
    ///
    /// Only routes registered after this call observe the middleware;
    /// composition happens at registration time, not at dispatch time.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Register a handler for `GET` requests on `path`.
    pub fn get(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::GET, path, handler);
    }

    /// Register a handler for `POST` requests on `path`.
    pub fn post(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::POST, path, handler);
    }

    /// Register a handler for `PUT` requests on `path`.
    pub fn put(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::PUT, path, handler);
    }

    /// Register a handler for `PATCH` requests on `path`.
    pub fn patch(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::PATCH, path, handler);
    }

    /// Register a handler for `DELETE` requests on `path`.
    pub fn delete(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::DELETE, path, handler);
    }

    /// Register a handler for an arbitrary method on `path`.
    pub fn route(&mut self, method: Method, path: &str, handler: impl Handler + 'static) {
        self.route_with(method, path, handler, Vec::new());
    }

    /// Register a handler with route-specific middleware.
    ///
    /// The composed order is global middleware first, then the
    /// route-specific list, then the handler.
    pub fn route_with(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler + 'static,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let pattern = normalize(path);
        self.register(method, &pattern, Arc::new(handler), middleware);
    }

    /// Create a scoped [`Group`] under `prefix` and run `setup` against it.
    ///
    /// All registration inside `setup` happens before this method returns;
    /// the group itself is registration-time scaffolding and is not stored.
    pub fn group(&mut self, prefix: &str, setup: impl FnOnce(&mut Group<'_>)) {
        let mut group = Group::new(self, normalize(prefix));
        setup(&mut group);
    }

    /// Serve files from `directory` under `prefix`.
    ///
    /// Registers `GET` and `HEAD` handlers on `prefix/{path...}`; any other
    /// method on that pattern yields a 405 with `Allow: GET, HEAD`. Path
    /// traversal outside `directory` is rejected with a 404 by the file
    /// handler.
    pub fn static_dir(&mut self, prefix: &str, directory: impl Into<PathBuf>) {
        self.static_dir_with(prefix, directory, Vec::new());
    }

    /// Serve files from `directory` under `prefix`, with route middleware.
    pub fn static_dir_with(
        &mut self,
        prefix: &str,
        directory: impl Into<PathBuf>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let pattern = join(&normalize(prefix), "/{path...}");
        let handler: Arc<dyn Handler> = Arc::new(StaticHandler::new(directory));
        self.register(
            Method::GET,
            &pattern,
            Arc::clone(&handler),
            middleware.clone(),
        );
        self.register(Method::HEAD, &pattern, handler, middleware);
    }

    /// Compose and insert a route.
    ///
    /// `scoped` carries the non-global middleware in precedence order
    /// (group ancestors outermost first, then route-specific). The current
    /// global list is snapshotted in front of it here.
    pub(crate) fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn Handler>,
        scoped: Vec<Arc<dyn Middleware>>,
    ) {
        let mut middleware = self.middleware.clone();
        middleware.extend(scoped);
        let composed = chain(handler, &middleware);
        self.trie.insert(method.clone(), pattern, composed);
        debug!(method = %method, pattern, middleware = middleware.len(), "route registered");
    }

    /// Dispatch a request to its composed handler and return the response.
    ///
    /// Produces a JSON 404 when no pattern matches the path and a JSON 405
    /// with an `Allow` header when a pattern matches but the method does
    /// not. `HEAD` responses have their body stripped after the handler
    /// runs.
    pub fn serve(&self, req: &mut Request) -> Response {
        let match_start = Instant::now();
        let outcome = self.trie.dispatch(&req.method, &req.path);
        let match_duration = match_start.elapsed();
        if match_duration > Duration::from_millis(1) {
            warn!(
                method = %req.method,
                path = %req.path,
                duration_us = match_duration.as_micros() as u64,
                "slow route match"
            );
        }
        let mut res = Response::new();
        match outcome {
            RouteMatch::Matched { handler, params } => {
                debug!(method = %req.method, path = %req.path, "route matched");
                req.path_params = params;
                handler.handle(req, &mut res);
            }
            RouteMatch::MethodNotAllowed { allow } => {
                let allow = allow
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                warn!(method = %req.method, path = %req.path, allow = %allow, "method not allowed");
                res = Response::json(
                    405,
                    serde_json::json!({
                        "error": "Method Not Allowed",
                        "method": req.method.as_str(),
                        "path": req.path
                    }),
                );
                res.set_header("allow", allow);
            }
            RouteMatch::NotFound => {
                warn!(method = %req.method, path = %req.path, "no route matched");
                res = Response::json(
                    404,
                    serde_json::json!({
                        "error": "Not Found",
                        "method": req.method.as_str(),
                        "path": req.path
                    }),
                );
            }
        }
        if req.method == Method::HEAD {
            res.body.clear();
        }
        res
    }
}
