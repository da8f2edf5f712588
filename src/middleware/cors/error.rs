use std::fmt;

/// CORS configuration error.
///
/// Returned by [`CorsMiddlewareBuilder::build`](super::CorsMiddlewareBuilder::build)
/// when the configuration violates CORS specification requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// Wildcard origin (`*`) cannot be used with credentials.
    WildcardWithCredentials,
    /// Credentials require at least one configured origin.
    EmptyOriginsWithCredentials,
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: cannot use wildcard origin (*) with credentials. \
                    When allow_credentials is true, you must specify exact origins."
                )
            }
            CorsConfigError::EmptyOriginsWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: cannot use credentials with an empty origins list. \
                    When allow_credentials is true, at least one origin must be specified."
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
