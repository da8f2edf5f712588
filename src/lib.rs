//! # Manifold
//!
//! **Manifold** is a coroutine-powered HTTP router and middleware-composition
//! engine for Rust, built on the `may` runtime.
//!
//! ## Overview
//!
//! Manifold maps incoming requests to handlers, composes cross-cutting
//! behavior (logging, panic recovery, CORS, rate limiting, auth gating)
//! around those handlers, and organizes routes into hierarchically-prefixed,
//! hierarchically-middleware-scoped groups. Composition happens once, at
//! registration time: the route table stores fully wrapped handlers, and the
//! dispatch hot path does nothing but match a path and invoke one of them.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`path`]** - Path normalization and joining; pure functions, no state
//! - **[`handler`]** - The [`Handler`] seam plus the engine-owned
//!   [`Request`]/[`Response`] types
//! - **[`middleware`]** - The [`Middleware`](middleware::Middleware) trait,
//!   the onion-ordering chain builder, and the built-in middleware set
//! - **[`router`]** - The segment trie, the [`Router`] registry, and
//!   [`Group`] scoping
//! - **[`static_files`]** - Hardened static file serving for catch-all routes
//! - **[`server`]** - HTTP server adapter built on `may_minihttp`
//! - **[`ids`]** - ULID-backed request IDs for log correlation
//! - **[`runtime_config`]** - Environment-driven coroutine runtime tuning
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant Service as RouterService
//!     participant Router as Router
//!     participant Chain as Composed Chain
//!     participant Handler as Handler
//!
//!     Client->>Server: HTTP Request<br/>GET /users/123
//!     Server->>Service: call(req, res)
//!     Service->>Service: Parse request<br/>(headers, cookies, query, body)
//!     Service->>Router: serve(request)
//!     Router->>Router: Trie dispatch<br/>bind {id: "123"}
//!
//!     alt No Route Match
//!         Router-->>Client: 404 Not Found
//!     end
//!     alt Method Mismatch
//!         Router-->>Client: 405 + Allow header
//!     end
//!
//!     Router->>Chain: handle(request, response)
//!     Note over Chain: middleware before()<br/>in registration order
//!     Chain->>Handler: handle(request, response)
//!     Handler-->>Chain: response written
//!     Note over Chain: middleware after()<br/>in reverse order
//!     Chain-->>Router: response
//!     Router-->>Service: response
//!     Service-->>Client: HTTP Response<br/>200 OK + X-Request-Id
//! ```
//!
//! ### Middleware Ordering
//!
//! For global middleware `[L]`, group middleware `[G]`, and route middleware
//! `[R]` around handler `H`, every request observes
//! `L.before, G.before, R.before, H, R.after, G.after, L.after`. A
//! middleware snapshot is taken when each route is registered; attaching
//! middleware later never changes already-registered routes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use manifold::middleware::{LoggingMiddleware, RecoveryMiddleware};
//! use manifold::server::{HttpServer, RouterService};
//! use manifold::{Request, Response, Router};
//!
//! let mut router = Router::new();
//! router.use_middleware(Arc::new(RecoveryMiddleware));
//! router.use_middleware(Arc::new(LoggingMiddleware));
//!
//! router.get("/health", |_req: &mut Request, res: &mut Response| {
//!     *res = Response::json(200, serde_json::json!({ "status": "ok" }));
//! });
//! router.group("/api/v1", |v1| {
//!     v1.get("/users/{id}", |req: &mut Request, res: &mut Response| {
//!         let id = req.get_path_param("id").unwrap_or_default();
//!         *res = Response::json(200, serde_json::json!({ "id": id }));
//!     });
//! });
//! router.static_dir("/assets", "./public");
//!
//! let handle = HttpServer(RouterService::new(router))
//!     .start("0.0.0.0:8080")
//!     .expect("failed to bind");
//! handle.join().expect("server crashed");
//! ```
//!
//! ## Lifecycle
//!
//! Registration is single-threaded by construction: every registration
//! method takes `&mut Router`, while `serve` takes `&Router`. Build the
//! router and all groups during startup, then hand it to the server. Once
//! serving begins the route table is read-only and dispatch is safe for
//! unbounded concurrent use; the only mutable router-adjacent state is the
//! rate limiter's counter map, which synchronizes internally.
//!
//! ## Runtime Considerations
//!
//! Manifold uses the `may` coroutine runtime, not tokio or async-std:
//!
//! - Each connection is served on a lightweight coroutine
//! - Stack size is configurable via the `MANIFOLD_STACK_SIZE` environment
//!   variable (see [`runtime_config`])
//! - The runtime is incompatible with tokio-based libraries without bridging
//! - Handlers run synchronously to completion; blocking I/O blocks only the
//!   coroutine, not the OS thread
//!
//! ## Panics and Recovery
//!
//! A handler panic is recovered only when
//! [`RecoveryMiddleware`](middleware::RecoveryMiddleware) is part of that
//! route's composed chain; there is no global safety net. Attach it first
//! (outermost) on the router so every route registered afterwards is
//! covered.

pub mod handler;
pub mod ids;
pub mod middleware;
pub mod path;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use handler::{Handler, HeaderVec, ParamVec, Request, Response};
pub use ids::RequestId;
pub use router::{Group, Router};
