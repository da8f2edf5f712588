use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use super::Middleware;
use crate::handler::{Handler, Request, Response};

/// Panic recovery at a single downstream boundary.
///
/// Wraps exactly one invocation of the rest of the chain in
/// `catch_unwind`. A panic anywhere downstream is logged with its
/// payload and a captured backtrace, then converted into a 500 response
/// if nothing was written yet. A panic after the response was committed
/// cannot be unwritten; recovery is best-effort in that case and only
/// suppresses the unwind.
///
/// Recovery is opt-in. A route whose composed chain does not include it
/// propagates panics to the runtime's default behavior, which for the
/// coroutine server means the connection is dropped. Attach it at the
/// front of the global middleware list to cover every route.
pub struct RecoveryMiddleware;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

impl Middleware for RecoveryMiddleware {
    fn around(&self, req: &mut Request, res: &mut Response, next: &dyn Handler) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| next.handle(req, res)));
        if let Err(payload) = result {
            let backtrace = std::backtrace::Backtrace::capture();
            error!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                panic_message = panic_message(payload.as_ref()),
                backtrace = %backtrace,
                "handler panicked"
            );
            if !res.is_written() {
                *res = Response::error(500, "Internal Server Error");
            }
        }
    }
}
