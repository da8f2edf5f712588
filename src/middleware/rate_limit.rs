use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::Middleware;
use crate::handler::{Request, Response};

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window rate limiting keyed by client IP.
///
/// The client key prefers `X-Real-IP`, then the first entry of
/// `X-Forwarded-For`, then the connection's remote address, falling back
/// to `"unknown"` when none is available. Exceeding `requests` within
/// `window` yields 429 with a `Retry-After` header carrying the
/// remaining window time in whole seconds (rounded up, never negative).
///
/// Window reset is lazy: a key's window resets the next time that key is
/// seen after the window elapsed; there is no background sweep. As a
/// consequence the counter map gains one entry per distinct client key
/// and never shrinks; memory is bounded only by the client population
/// over the process lifetime.
///
/// The map is sharded (`DashMap`); the per-entry lock guards the
/// read-modify-write of the counter and window start, and is released
/// before the request proceeds downstream.
pub struct RateLimitMiddleware {
    requests: u32,
    window: Duration,
    counters: DashMap<String, WindowEntry>,
}

impl RateLimitMiddleware {
    /// Allow `requests` per client per `window`.
    #[must_use]
    pub fn new(requests: u32, window: Duration) -> Self {
        Self {
            requests,
            window,
            counters: DashMap::new(),
        }
    }

    fn client_key(&self, req: &Request) -> String {
        if let Some(ip) = req.get_header("x-real-ip") {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
        if let Some(forwarded) = req.get_header("x-forwarded-for") {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
        match req.remote_addr {
            Some(addr) => addr.ip().to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl Middleware for RateLimitMiddleware {
    fn before(&self, req: &mut Request) -> Option<Response> {
        let key = self.client_key(req);
        let now = Instant::now();

        // Decide under the entry lock, then release it before answering.
        let remaining = {
            let mut entry = self.counters.entry(key).or_insert_with(|| WindowEntry {
                count: 0,
                window_start: now,
            });
            if now.duration_since(entry.window_start) >= self.window {
                entry.count = 0;
                entry.window_start = now;
            }
            entry.count += 1;
            if entry.count > self.requests {
                Some(
                    self.window
                        .saturating_sub(now.duration_since(entry.window_start)),
                )
            } else {
                None
            }
        };

        remaining.map(|rem| {
            let retry_after = rem.as_secs_f64().ceil() as u64;
            let mut res = Response::error(429, "Too Many Requests");
            res.set_header("retry-after", retry_after.to_string());
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::Arc;

    fn request_from(ip: &str) -> Request {
        let mut req = Request::new(Method::GET, "/");
        req.headers.push((Arc::from("x-real-ip"), ip.to_string()));
        req
    }

    #[test]
    fn test_limit_enforced_within_window() {
        let mw = RateLimitMiddleware::new(3, Duration::from_secs(60));
        let mut req = request_from("10.0.0.1");
        for _ in 0..3 {
            assert!(mw.before(&mut req).is_none());
        }
        let rejected = mw.before(&mut req).expect("fourth request rejected");
        assert_eq!(rejected.status, 429);
        let retry_after: u64 = rejected
            .get_header("retry-after")
            .expect("retry-after set")
            .parse()
            .expect("retry-after numeric");
        assert!(retry_after <= 60);
    }

    #[test]
    fn test_distinct_clients_counted_separately() {
        let mw = RateLimitMiddleware::new(1, Duration::from_secs(60));
        assert!(mw.before(&mut request_from("10.0.0.1")).is_none());
        assert!(mw.before(&mut request_from("10.0.0.2")).is_none());
        assert!(mw.before(&mut request_from("10.0.0.1")).is_some());
    }

    #[test]
    fn test_lazy_window_reset() {
        let mw = RateLimitMiddleware::new(1, Duration::from_millis(50));
        let mut req = request_from("10.0.0.9");
        assert!(mw.before(&mut req).is_none());
        assert!(mw.before(&mut req).is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(mw.before(&mut req).is_none(), "window should have reset");
    }

    #[test]
    fn test_client_key_preference_order() {
        let mw = RateLimitMiddleware::new(1, Duration::from_secs(60));

        let mut req = Request::new(Method::GET, "/");
        req.headers
            .push((Arc::from("x-real-ip"), "1.1.1.1".to_string()));
        req.headers
            .push((Arc::from("x-forwarded-for"), "2.2.2.2, 3.3.3.3".to_string()));
        assert_eq!(mw.client_key(&req), "1.1.1.1");

        let mut req = Request::new(Method::GET, "/");
        req.headers
            .push((Arc::from("x-forwarded-for"), "2.2.2.2, 3.3.3.3".to_string()));
        assert_eq!(mw.client_key(&req), "2.2.2.2");

        let req = Request::new(Method::GET, "/");
        assert_eq!(mw.client_key(&req), "unknown");
    }
}
