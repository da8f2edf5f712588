use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::handler::{Request, Response};

/// Structured request logging.
///
/// Emits one `tracing` event per request after the wrapped handler (or
/// an inner short-circuit) completes, carrying the method, path, final
/// status, and elapsed wall-clock time. The response is never altered.
/// Place it first in the global list so its `after` observes the final
/// status of everything inside it.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "request completed"
        );
    }
}
