//! Segment trie for route matching
//!
//! Registered patterns are split into `/`-separated segments and arranged in a
//! tree where each node owns its static children, its parameter children, and
//! at most one trailing catch-all. Lookup walks the request path one segment
//! at a time, so matching cost is O(k) in the path length rather than O(n) in
//! the number of registered routes.
//!
//! ## Pattern syntax
//!
//! - Static segments (e.g. `users`) match exactly
//! - Parameter segments (e.g. `{id}`) match any single segment and bind it
//! - A trailing catch-all (e.g. `{path...}`) matches the remainder of the
//!   path, slashes included, and must be the final segment of its pattern
//!
//! ## Matching rules
//!
//! At each node, static children are tried before parameter children, and the
//! catch-all only applies when neither descends to a route for the request
//! method. The walk backtracks: a static child that matches the current
//! segment but leads nowhere does not shadow a parameter sibling. Parameter
//! bindings pushed along an abandoned branch are popped again, so the final
//! binding set reflects exactly the matched route.
//!
//! Handlers are stored per HTTP method at terminal nodes. When a path matches
//! some route but no route for the request method, [`PathTrie::dispatch`]
//! reports the full set of methods registered across every pattern that
//! matches the path, for use in a `405` `Allow` header.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{Handler, ParamVec};

/// Node in the segment trie.
///
/// Each node represents one path segment. A node is terminal when its
/// handler map is non-empty; interior nodes created on the way to a
/// deeper registration carry an empty map.
struct TrieNode {
    /// The path segment this node represents (without leading `/`).
    segment: String,
    /// Handlers registered at this exact depth, keyed by HTTP method.
    handlers: HashMap<Method, Arc<dyn Handler>>,
    /// Parameter name if this segment is a path parameter (`{id}` -> `id`).
    param_name: Option<Arc<str>>,
    /// Static child nodes.
    children: Vec<TrieNode>,
    /// Parameter child nodes. Multiple entries are supported so that routes
    /// with different parameter names at the same position
    /// (e.g. `/users/{id}/posts` vs `/users/{user_id}/comments`) each keep
    /// their own subtree and bind their own name.
    param_children: Vec<TrieNode>,
    /// Trailing catch-all registered at this node, if any.
    catch_all: Option<Box<CatchAll>>,
}

/// Terminal for a trailing `{name...}` segment.
///
/// Kept separate from ordinary children because a catch-all consumes the
/// whole remaining path and can never have children of its own.
struct CatchAll {
    name: Arc<str>,
    handlers: HashMap<Method, Arc<dyn Handler>>,
}

impl TrieNode {
    fn new(segment: String) -> Self {
        Self {
            segment,
            handlers: HashMap::new(),
            param_name: None,
            children: Vec::new(),
            param_children: Vec::new(),
            catch_all: None,
        }
    }

    fn new_param(param_name: Arc<str>) -> Self {
        Self {
            segment: String::new(),
            handlers: HashMap::new(),
            param_name: Some(param_name),
            children: Vec::new(),
            param_children: Vec::new(),
            catch_all: None,
        }
    }

    /// Insert a route into the tree.
    ///
    /// Panics on a duplicate method+pattern registration and on malformed
    /// patterns (empty parameter name, non-trailing catch-all). Registration
    /// happens once at startup, so conflicts abort there instead of
    /// surfacing as runtime misrouting.
    fn insert(&mut self, segments: &[&str], method: Method, handler: Arc<dyn Handler>, pattern: &str) {
        if segments.is_empty() {
            if self.handlers.contains_key(&method) {
                panic!("duplicate route registration: {method} {pattern}");
            }
            self.handlers.insert(method, handler);
            return;
        }

        let segment = segments[0];
        let remaining = &segments[1..];

        if let Some(name) = catch_all_name(segment) {
            if name.is_empty() {
                panic!("catch-all parameter name must not be empty: {pattern}");
            }
            if !remaining.is_empty() {
                panic!("catch-all segment must be the final segment: {pattern}");
            }
            match &mut self.catch_all {
                Some(catch) => {
                    if catch.name.as_ref() != name {
                        panic!(
                            "conflicting catch-all names {:?} and {:?} at the same position: {pattern}",
                            catch.name, name
                        );
                    }
                    if catch.handlers.contains_key(&method) {
                        panic!("duplicate route registration: {method} {pattern}");
                    }
                    catch.handlers.insert(method, handler);
                }
                None => {
                    let mut handlers = HashMap::new();
                    handlers.insert(method, handler);
                    self.catch_all = Some(Box::new(CatchAll {
                        name: Arc::from(name),
                        handlers,
                    }));
                }
            }
            return;
        }

        if let Some(name) = param_name(segment) {
            if name.is_empty() {
                panic!("path parameter name must not be empty: {pattern}");
            }
            // Reuse the param child with the same name, if one exists.
            for param_child in &mut self.param_children {
                if param_child.param_name.as_deref() == Some(name) {
                    param_child.insert(remaining, method, handler, pattern);
                    return;
                }
            }
            let mut new_param_child = TrieNode::new_param(Arc::from(name));
            new_param_child.insert(remaining, method, handler, pattern);
            self.param_children.push(new_param_child);
            return;
        }

        for child in &mut self.children {
            if child.segment == segment {
                child.insert(remaining, method, handler, pattern);
                return;
            }
        }

        let mut new_child = TrieNode::new(segment.to_string());
        new_child.insert(remaining, method, handler, pattern);
        self.children.push(new_child);
    }

    /// Find the handler for `method` along the given segments.
    ///
    /// Tries static children first, then parameter children, then the
    /// catch-all. Returns the first route whose terminal carries the
    /// requested method; bindings pushed on branches that fail are popped
    /// before the next branch is tried.
    fn find(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<dyn Handler>> {
        if segments.is_empty() {
            if let Some(handler) = self.handlers.get(method) {
                return Some(Arc::clone(handler));
            }
            // A catch-all also matches an empty remainder, binding "".
            if let Some(catch) = &self.catch_all {
                if let Some(handler) = catch.handlers.get(method) {
                    params.push((Arc::clone(&catch.name), String::new()));
                    return Some(Arc::clone(handler));
                }
            }
            return None;
        }

        let segment = segments[0];
        let remaining = &segments[1..];

        for child in &self.children {
            if child.segment == segment {
                if let Some(handler) = child.find(remaining, method, params) {
                    return Some(handler);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(name) = &param_child.param_name {
                params.push((Arc::clone(name), segment.to_string()));
                if let Some(handler) = param_child.find(remaining, method, params) {
                    return Some(handler);
                }
                // Backtrack: drop the binding if this branch failed.
                params.pop();
            }
        }

        if let Some(catch) = &self.catch_all {
            if let Some(handler) = catch.handlers.get(method) {
                params.push((Arc::clone(&catch.name), segments.join("/")));
                return Some(Arc::clone(handler));
            }
        }

        None
    }

    /// Collect every method registered on any pattern matching the segments.
    ///
    /// Used to build the `Allow` header for 405 responses; runs only after
    /// [`find`](TrieNode::find) has already failed.
    fn collect_methods(&self, segments: &[&str], found: &mut Vec<Method>) {
        if segments.is_empty() {
            for method in self.handlers.keys() {
                if !found.contains(method) {
                    found.push(method.clone());
                }
            }
            if let Some(catch) = &self.catch_all {
                for method in catch.handlers.keys() {
                    if !found.contains(method) {
                        found.push(method.clone());
                    }
                }
            }
            return;
        }

        let segment = segments[0];
        let remaining = &segments[1..];

        for child in &self.children {
            if child.segment == segment {
                child.collect_methods(remaining, found);
            }
        }
        for param_child in &self.param_children {
            param_child.collect_methods(remaining, found);
        }
        if let Some(catch) = &self.catch_all {
            for method in catch.handlers.keys() {
                if !found.contains(method) {
                    found.push(method.clone());
                }
            }
        }
    }
}

/// Outcome of matching a request against the trie.
pub enum RouteMatch {
    /// A route exists for this method and path.
    Matched {
        /// The composed handler stored at registration time.
        handler: Arc<dyn Handler>,
        /// Parameter bindings extracted from named segments, in path order.
        params: ParamVec,
    },
    /// At least one pattern matches the path, but none for this method.
    MethodNotAllowed {
        /// Every method registered for the path, sorted by name.
        allow: Vec<Method>,
    },
    /// No pattern matches the path.
    NotFound,
}

/// Segment trie mapping `(method, path)` to composed handlers.
///
/// Built single-threaded during startup via [`insert`](PathTrie::insert),
/// then read-only for the lifetime of the serving loop. Lookup is O(k) in
/// the number of path segments.
pub struct PathTrie {
    root: TrieNode,
}

impl Default for PathTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTrie {
    /// Create an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(String::new()),
        }
    }

    /// Register a handler for a method and normalized path pattern.
    ///
    /// # Panics
    ///
    /// Panics when the same method+pattern pair is registered twice, when a
    /// catch-all is not the final segment, or when a parameter name is
    /// empty. All of these are startup-time registration bugs.
    pub fn insert(&mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) {
        let segments: Vec<&str> = pattern
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        self.root.insert(&segments, method, handler, pattern);
    }

    /// Match a request method and path against the registered routes.
    pub fn dispatch(&self, method: &Method, path: &str) -> RouteMatch {
        let segments: Vec<&str> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut params = ParamVec::new();
        if let Some(handler) = self.root.find(&segments, method, &mut params) {
            return RouteMatch::Matched { handler, params };
        }

        let mut allow = Vec::new();
        self.root.collect_methods(&segments, &mut allow);
        if allow.is_empty() {
            RouteMatch::NotFound
        } else {
            allow.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            RouteMatch::MethodNotAllowed { allow }
        }
    }
}

/// Parse a trailing catch-all segment (`{name...}` -> `name`).
fn catch_all_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|s| s.strip_suffix("...}"))
}

/// Parse a parameter segment (`{name}` -> `name`).
///
/// Checked after [`catch_all_name`], which would otherwise be parsed as a
/// parameter literally named `name...`.
fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}
