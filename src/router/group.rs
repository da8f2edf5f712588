//! Prefix- and middleware-scoped route registration
//!
//! A [`Group`] is a registration-time view over a [`Router`]: it carries an
//! absolute path prefix and an ordered middleware list, and forwards every
//! registration to the router with both applied. Groups hold a mutable
//! borrow of the router, so they cannot outlive the registration phase.

use http::Method;
use std::path::PathBuf;
use std::sync::Arc;

use super::core::Router;
use crate::handler::Handler;
use crate::middleware::Middleware;
use crate::path::{join, normalize};
use crate::static_files::StaticHandler;

/// A scoped view of a [`Router`] bound to a path prefix and a middleware
/// list.
///
/// Middleware semantics are value-copy at creation time: a nested group
/// copies its parent's middleware list when it is created, so middleware
/// the parent attaches afterwards applies only to routes and sub-groups
/// created after that point. Two children branched from the same parent at
/// different times can therefore carry different middleware sets.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use manifold::{Request, Response, Router};
///
/// let mut router = Router::new();
/// router.group("/api", |api| {
///     api.group("/v1", |v1| {
///         v1.get("/users", |_req: &mut Request, res: &mut Response| {
///             *res = Response::text(200, "[]");
///         });
///     });
/// });
///
/// let mut req = Request::new(Method::GET, "/api/v1/users");
/// assert_eq!(router.serve(&mut req).status, 200);
/// ```
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String) -> Self {
        Self {
            router,
            prefix,
            middleware: Vec::new(),
        }
    }

    /// The absolute prefix all routes in this group are registered under.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Append a middleware to this group's list.
    ///
    /// Affects only routes and sub-groups created on this group after the
    /// call; routes already registered keep their composed chain.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Register a handler for `GET` requests on `path`, relative to the
    /// group prefix.
    pub fn get(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::GET, path, handler);
    }

    /// Register a handler for `POST` requests on `path`, relative to the
    /// group prefix.
    pub fn post(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::POST, path, handler);
    }

    /// Register a handler for `PUT` requests on `path`, relative to the
    /// group prefix.
    pub fn put(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::PUT, path, handler);
    }

    /// Register a handler for `PATCH` requests on `path`, relative to the
    /// group prefix.
    pub fn patch(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::PATCH, path, handler);
    }

    /// Register a handler for `DELETE` requests on `path`, relative to the
    /// group prefix.
    pub fn delete(&mut self, path: &str, handler: impl Handler + 'static) {
        self.route(Method::DELETE, path, handler);
    }

    /// Register a handler for an arbitrary method on `path`, relative to
    /// the group prefix.
    pub fn route(&mut self, method: Method, path: &str, handler: impl Handler + 'static) {
        self.route_with(method, path, handler, Vec::new());
    }

    /// Register a handler with route-specific middleware.
    ///
    /// The composed order is the router's global middleware, then this
    /// group's list (ancestors outermost first), then `middleware`.
    pub fn route_with(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler + 'static,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let pattern = join(&self.prefix, &normalize(path));
        let mut scoped = self.middleware.clone();
        scoped.extend(middleware);
        self.router.register(method, &pattern, Arc::new(handler), scoped);
    }

    /// Create a nested group under `join(self.prefix, prefix)`.
    ///
    /// The child starts with a copy of this group's middleware list as it
    /// stands right now.
    pub fn group(&mut self, prefix: &str, setup: impl FnOnce(&mut Group<'_>)) {
        let mut child = Group {
            router: &mut *self.router,
            prefix: join(&self.prefix, &normalize(prefix)),
            middleware: self.middleware.clone(),
        };
        setup(&mut child);
    }

    /// Serve files from `directory` under `join(self.prefix, prefix)`.
    ///
    /// Same contract as [`Router::static_dir`], with the group's prefix and
    /// middleware applied.
    pub fn static_dir(&mut self, prefix: &str, directory: impl Into<PathBuf>) {
        self.static_dir_with(prefix, directory, Vec::new());
    }

    /// Serve files from `directory` under the group, with route middleware.
    pub fn static_dir_with(
        &mut self,
        prefix: &str,
        directory: impl Into<PathBuf>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) {
        let base = join(&self.prefix, &normalize(prefix));
        let pattern = join(&base, "/{path...}");
        let handler: Arc<dyn Handler> = Arc::new(StaticHandler::new(directory));

        let mut scoped = self.middleware.clone();
        scoped.extend(middleware);

        self.router
            .register(Method::GET, &pattern, Arc::clone(&handler), scoped.clone());
        self.router
            .register(Method::HEAD, &pattern, handler, scoped);
    }
}
