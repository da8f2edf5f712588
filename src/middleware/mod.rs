mod api_key;
mod core;
mod cors;
mod logging;
mod rate_limit;
mod recovery;

pub use api_key::ApiKeyMiddleware;
pub use core::{chain, Middleware};
pub use cors::{CorsConfigError, CorsMiddleware, CorsMiddlewareBuilder, OriginValidation};
pub use logging::LoggingMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use recovery::RecoveryMiddleware;
