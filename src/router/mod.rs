//! # Router Module
//!
//! Route registration, grouping, and dispatch. This is the composition core
//! of the crate: it maps `(method, path)` pairs to handlers that were
//! wrapped with their applicable middleware when they were registered.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering `(method, path pattern)` bindings, per verb or generically
//! - Composing global, group, and route middleware around each handler at
//!   registration time
//! - Matching incoming requests and extracting named path parameters
//! - Producing 404 and 405 responses (with an `Allow` header) when no
//!   route fits
//!
//! ## Architecture
//!
//! Three pieces share this module:
//!
//! 1. [`PathTrie`]: a segment trie storing composed handlers per method at
//!    terminal nodes. Static segments beat parameters, parameters beat the
//!    trailing catch-all, and lookups backtrack across those tiers.
//! 2. [`Router`]: the mutable registry owning the trie and the global
//!    middleware list, plus the `serve` entry point used by the server
//!    adapter and by tests.
//! 3. [`Group`]: a borrow-scoped registration view carrying a path prefix
//!    and a middleware snapshot, supporting arbitrary nesting.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use manifold::{Request, Response, Router};
//!
//! let mut router = Router::new();
//! router.group("/api", |api| {
//!     api.get("/health", |_req: &mut Request, res: &mut Response| {
//!         *res = Response::json(200, serde_json::json!({ "status": "ok" }));
//!     });
//! });
//!
//! let mut req = Request::new(Method::GET, "/api/health");
//! assert_eq!(router.serve(&mut req).status, 200);
//! ```

mod core;
mod group;
mod trie;

pub use core::Router;
pub use group::Group;
pub use trie::{PathTrie, RouteMatch};
