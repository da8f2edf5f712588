use http::Method;
use may_minihttp::Request as MiniRequest;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

use crate::handler::{HeaderVec, ParamVec, Request};
use crate::ids::RequestId;

/// Parse cookies out of an already-lowercased header list.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    let mut cookies = HeaderVec::new();
    let Some(raw) = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "cookie")
        .map(|(_, v)| v.as_str())
    else {
        return cookies;
    };
    for pair in raw.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let Some(name) = parts.next() else { continue };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = parts.next().unwrap_or("").trim().to_string();
        cookies.push((Arc::from(name), value));
    }
    cookies
}

/// Parse query string parameters from a URL path.
///
/// Extracts everything after the `?` and URL-decodes names and values,
/// preserving wire order so repeated keys keep last-write-wins lookup
/// semantics.
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.find('?') {
        Some(pos) => url::form_urlencoded::parse(path[pos + 1..].as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Parse an incoming wire request into the engine's [`Request`].
///
/// Header names are lowercased, the query string is split off the path,
/// and the body is read fully into memory. The request ID is taken from an
/// `X-Request-Id` header when the client sent a valid one, otherwise
/// generated fresh.
pub fn parse_request(req: MiniRequest) -> Request {
    let method = req.method().parse::<Method>().unwrap_or(Method::GET);
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let request_id = RequestId::from_header_or_new(
        headers
            .iter()
            .find(|(k, _)| k.as_ref() == "x-request-id")
            .map(|(_, v)| v.as_str()),
    );

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        debug!(request_id = %request_id, error = %e, "request body read failed");
        body.clear();
    }

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        header_count = headers.len(),
        body_bytes = body.len(),
        "request parsed"
    );

    Request {
        request_id,
        method,
        path,
        headers,
        cookies,
        query_params,
        path_params: ParamVec::new(),
        body,
        // may_minihttp does not expose the peer address; clients behind a
        // proxy are identified via X-Real-IP / X-Forwarded-For instead.
        remote_addr: None,
    }
}
