//! End-to-end routing tests against a live server.
//!
//! Each test builds a `Router`, mounts it on a free port through
//! `RouterService`, and speaks raw HTTP/1.1 over a `TcpStream`.

use http::Method;
use manifold::{Request, Response, Router};
use serde_json::json;

mod common;
use common::http::{header_value, parse_response, parse_response_parts, send_request};
use common::test_server::TestServer;

#[test]
fn test_path_param_round_trip() {
    let mut router = Router::new();
    router.get("/users/{id}", |req: &mut Request, res: &mut Response| {
        let id = req.get_path_param("id").unwrap_or_default().to_string();
        *res = Response::text(200, id);
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, _ct, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "42");
}

#[test]
fn test_root_route() {
    let mut router = Router::new();
    router.get("/", |_req: &mut Request, res: &mut Response| {
        *res = Response::json(200, json!({"service": "manifold"}));
    });
    let server = TestServer::start(router);

    let resp = send_request(&server.addr(), "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body["service"], "manifold");
}

#[test]
fn test_unknown_path_is_404_with_json_body() {
    let mut router = Router::new();
    router.get("/known", |_req: &mut Request, res: &mut Response| {
        *res = Response::text(200, "ok");
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/nope");
}

#[test]
fn test_wrong_method_is_405_with_allow_header() {
    let mut router = Router::new();
    router.get("/things", |_req: &mut Request, res: &mut Response| {
        *res = Response::text(200, "list");
    });
    router.post("/things", |_req: &mut Request, res: &mut Response| {
        *res = Response::text(201, "created");
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "DELETE /things HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 405);
    assert_eq!(body["error"], "Method Not Allowed");
    assert_eq!(header_value(&resp, "allow").as_deref(), Some("GET, POST"));
}

#[test]
fn test_query_params_reach_the_handler() {
    let mut router = Router::new();
    router.get("/search", |req: &mut Request, res: &mut Response| {
        *res = Response::json(
            200,
            json!({
                "q": req.get_query_param("q"),
                "limit": req.get_query_param("limit"),
            }),
        );
    });
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "GET /search?q=rust%20http&limit=10 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body["q"], "rust http");
    assert_eq!(body["limit"], "10");
}

#[test]
fn test_post_body_reaches_the_handler() {
    let mut router = Router::new();
    router.post("/echo", |req: &mut Request, res: &mut Response| {
        let body = req.json_body().unwrap_or(json!(null));
        *res = Response::json(200, json!({ "received": body }));
    });
    let server = TestServer::start(router);

    let request = concat!(
        "POST /echo HTTP/1.1\r\n",
        "Host: localhost\r\n",
        "Content-Type: application/json\r\n",
        "Content-Length: 16\r\n",
        "\r\n",
        "{\"name\":\"socks\"}"
    );
    let resp = send_request(&server.addr(), request);
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body["received"]["name"], "socks");
}

#[test]
fn test_head_route_keeps_headers_strips_body() {
    let mut router = Router::new();
    router.route(
        Method::HEAD,
        "/status",
        |_req: &mut Request, res: &mut Response| {
            *res = Response::text(200, "this body must not be sent");
        },
    );
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "HEAD /status HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, content_type, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(content_type, "text/plain");
    assert_eq!(body, "");
}

#[test]
fn test_head_on_unknown_path_is_bodyless_404() {
    let router = Router::new();
    let server = TestServer::start(router);

    let resp = send_request(
        &server.addr(),
        "HEAD /missing HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    let (status, _ct, body) = parse_response_parts(&resp);
    assert_eq!(status, 404);
    assert_eq!(body, "");
}

#[test]
fn test_cookies_are_parsed() {
    let mut router = Router::new();
    router.get("/whoami", |req: &mut Request, res: &mut Response| {
        *res = Response::json(
            200,
            json!({
                "session": req.get_cookie("session"),
                "theme": req.get_cookie("theme"),
            }),
        );
    });
    let server = TestServer::start(router);

    let request = concat!(
        "GET /whoami HTTP/1.1\r\n",
        "Host: localhost\r\n",
        "Cookie: session=abc123; theme=dark\r\n",
        "\r\n"
    );
    let resp = send_request(&server.addr(), request);
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body["session"], "abc123");
    assert_eq!(body["theme"], "dark");
}
