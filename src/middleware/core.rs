//! Middleware trait and the chain builder.
//!
//! Composition happens once, at route registration time. [`chain`]
//! folds the middleware list in reverse into nested [`Handler`] nodes,
//! so the first list element is the outermost wrapper: its `before`
//! runs first and its `after` runs last. Dispatch never consults a
//! middleware list; it just invokes the pre-built chain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::handler::{Handler, Request, Response};

/// Cross-cutting behavior wrapped around a handler.
///
/// Most middleware implement `before` and/or `after`. Returning
/// `Some(response)` from `before` short-circuits the request: the
/// wrapped handler (and this middleware's own `after`) never run, while
/// outer middleware still observe the response on their way out.
///
/// `around` is the raw wrapping hook. Override it only when the
/// middleware must control the downstream invocation itself, as the
/// recovery middleware does to install its unwind boundary.
pub trait Middleware: Send + Sync {
    /// Runs before the wrapped handler. `Some` rejects the request with
    /// the given response.
    fn before(&self, _req: &mut Request) -> Option<Response> {
        None
    }

    /// Runs after the wrapped handler (or an inner short-circuit)
    /// completed. `latency` is the wall-clock time spent downstream of
    /// this middleware.
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}

    /// Wrap one downstream invocation.
    fn around(&self, req: &mut Request, res: &mut Response, next: &dyn Handler) {
        let start = Instant::now();
        if let Some(short) = self.before(req) {
            debug!(
                middleware = std::any::type_name_of_val(self),
                status = short.status,
                "middleware short-circuited request"
            );
            *res = short;
            return;
        }
        next.handle(req, res);
        self.after(req, res, start.elapsed());
    }
}

/// One composed link: a middleware wrapped around the rest of the chain.
struct Wrapped {
    mw: Arc<dyn Middleware>,
    next: Arc<dyn Handler>,
}

impl Handler for Wrapped {
    fn handle(&self, req: &mut Request, res: &mut Response) {
        self.mw.around(req, res, self.next.as_ref());
    }
}

/// Compose `middleware` around `handler` in onion order.
///
/// For a list `[m1, m2]` the invocation order is
/// `m1.before, m2.before, handler, m2.after, m1.after`. Callers
/// concatenate global, group (outermost ancestor first), and
/// route-specific middleware in that precedence order before calling
/// this. Composition itself cannot fail.
#[must_use]
pub fn chain(handler: Arc<dyn Handler>, middleware: &[Arc<dyn Middleware>]) -> Arc<dyn Handler> {
    middleware.iter().rev().fold(handler, |next, mw| {
        Arc::new(Wrapped {
            mw: Arc::clone(mw),
            next,
        }) as Arc<dyn Handler>
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            self.log.lock().unwrap().push(format!("{}.before", self.name));
            None
        }

        fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {
            self.log.lock().unwrap().push(format!("{}.after", self.name));
        }
    }

    struct Rejector {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Rejector {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            self.log.lock().unwrap().push("rejector.before".to_string());
            Some(Response::error(401, "Unauthorized"))
        }

        fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {
            self.log.lock().unwrap().push("rejector.after".to_string());
        }
    }

    fn terminal(log: Arc<Mutex<Vec<String>>>) -> Arc<dyn Handler> {
        Arc::new(move |_req: &mut Request, res: &mut Response| {
            log.lock().unwrap().push("handler".to_string());
            *res = Response::text(200, "ok");
        })
    }

    #[test]
    fn test_onion_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let m1: Arc<dyn Middleware> = Arc::new(Recorder {
            name: "m1",
            log: Arc::clone(&log),
        });
        let m2: Arc<dyn Middleware> = Arc::new(Recorder {
            name: "m2",
            log: Arc::clone(&log),
        });

        let composed = chain(terminal(Arc::clone(&log)), &[m1, m2]);
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        composed.handle(&mut req, &mut res);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["m1.before", "m2.before", "handler", "m2.after", "m1.after"]
        );
        assert_eq!(res.status, 200);
    }

    #[test]
    fn test_short_circuit_skips_handler_but_not_outer_after() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer: Arc<dyn Middleware> = Arc::new(Recorder {
            name: "outer",
            log: Arc::clone(&log),
        });
        let rejector: Arc<dyn Middleware> = Arc::new(Rejector {
            log: Arc::clone(&log),
        });

        let composed = chain(terminal(Arc::clone(&log)), &[outer, rejector]);
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        composed.handle(&mut req, &mut res);

        // The rejector's own after is skipped; the outer middleware
        // still sees the 401 on the way out.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer.before", "rejector.before", "outer.after"]
        );
        assert_eq!(res.status, 401);
    }

    #[test]
    fn test_empty_chain_is_the_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let composed = chain(terminal(Arc::clone(&log)), &[]);
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        composed.handle(&mut req, &mut res);
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
        assert_eq!(res.status, 200);
    }
}
