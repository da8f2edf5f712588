use may_minihttp::{HttpService, Request as MiniRequest, Response as MiniResponse};
use std::io;
use std::sync::Arc;

use super::request::parse_request;
use super::response::write_response;
use crate::router::Router;

/// [`HttpService`] adapter driving a [`Router`].
///
/// The server runtime clones one service per connection; clones share the
/// router through an `Arc`. The router must be fully built before it is
/// handed over here, since only the serving API remains reachable.
pub struct RouterService {
    router: Arc<Router>,
}

impl Clone for RouterService {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl RouterService {
    /// Seal a built router for serving.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: MiniRequest, res: &mut MiniResponse) -> io::Result<()> {
        let mut request = parse_request(req);
        let mut response = self.router.serve(&mut request);
        // Echo the request ID so clients and logs can be correlated.
        if response.get_header("x-request-id").is_none() {
            response.set_header("x-request-id", request.request_id.to_string());
        }
        write_response(res, response);
        Ok(())
    }
}
