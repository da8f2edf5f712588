//! Group prefix and scoping behavior over a live server.

use std::sync::Arc;
use std::time::Duration;

use manifold::middleware::Middleware;
use manifold::{Request, Response, Router};

mod common;
use common::http::{header_value, parse_response_parts, send_request};
use common::test_server::TestServer;

struct ScopeHeader {
    value: &'static str,
}

impl Middleware for ScopeHeader {
    fn after(&self, _req: &Request, res: &mut Response, _latency: Duration) {
        res.set_header("x-scope", self.value.to_string());
    }
}

#[test]
fn test_nested_group_route_reachable_at_joined_prefix() {
    let mut router = Router::new();
    router.group("/api", |api| {
        api.group("/v1", |v1| {
            v1.get("/users/{id}", |req: &mut Request, res: &mut Response| {
                let id = req.get_path_param("id").unwrap_or_default().to_string();
                *res = Response::text(200, id);
            });
        });
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /api/v1/users/7 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, _ct, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "7");

    // The route must not leak to shorter prefixes.
    for path in ["/users/7", "/v1/users/7", "/api/users/7"] {
        let resp = send_request(
            &server.addr(),
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        );
        let (status, _ct, _body) = parse_response_parts(&resp);
        assert_eq!(status, 404, "unexpected match at {path}");
    }
}

#[test]
fn test_group_middleware_applies_only_inside_the_group() {
    let mut router = Router::new();
    router.get("/public", |_req: &mut Request, res: &mut Response| {
        *res = Response::text(200, "public");
    });
    router.group("/admin", |admin| {
        admin.use_middleware(Arc::new(ScopeHeader { value: "admin" }));
        admin.get("/panel", |_req: &mut Request, res: &mut Response| {
            *res = Response::text(200, "panel");
        });
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /admin/panel HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(header_value(&resp, "x-scope").as_deref(), Some("admin"));

    let resp = send_request(
        &server.addr(),
        "GET /public HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(header_value(&resp, "x-scope"), None);
}

#[test]
fn test_sibling_groups_do_not_share_middleware() {
    let mut router = Router::new();
    router.group("/a", |a| {
        a.use_middleware(Arc::new(ScopeHeader { value: "a" }));
        a.get("/ping", |_req: &mut Request, res: &mut Response| {
            *res = Response::text(200, "a");
        });
    });
    router.group("/b", |b| {
        b.get("/ping", |_req: &mut Request, res: &mut Response| {
            *res = Response::text(200, "b");
        });
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /a/ping HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(header_value(&resp, "x-scope").as_deref(), Some("a"));

    let resp = send_request(
        &server.addr(),
        "GET /b/ping HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(header_value(&resp, "x-scope"), None);
}

#[test]
fn test_group_prefix_normalization() {
    let mut router = Router::new();
    router.group("api/", |api| {
        api.get("health/", |_req: &mut Request, res: &mut Response| {
            *res = Response::text(200, "ok");
        });
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /api/health HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, _ct, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}
