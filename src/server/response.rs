use may_minihttp::Response as MiniResponse;

use crate::handler::Response;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Copy an engine [`Response`] onto the wire response.
pub fn write_response(out: &mut MiniResponse, response: Response) {
    out.status_code(response.status as usize, status_reason(response.status));
    for (name, value) in &response.headers {
        // may_minihttp takes header lines as `&'static str`, so each
        // dynamic line is leaked.
        let line = format!("{name}: {value}").into_boxed_str();
        out.header(Box::leak(line));
    }
    out.body_vec(response.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(204), "No Content");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(429), "Too Many Requests");
        assert_eq!(status_reason(999), "OK");
    }
}
