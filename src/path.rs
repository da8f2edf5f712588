//! Path normalization helpers used by route and group registration.
//!
//! Both functions are pure; the router calls them once per registration,
//! never on the dispatch hot path.

/// Normalize a path template or prefix.
///
/// Trims surrounding whitespace, collapses leading and trailing slash
/// runs, and guarantees a single leading `/`. Empty input (or input
/// consisting only of slashes) yields `/`.
///
/// Idempotent: `normalize(normalize(p)) == normalize(p)`.
///
/// # Examples
///
/// ```
/// use manifold::path::normalize;
///
/// assert_eq!(normalize("users"), "/users");
/// assert_eq!(normalize("  /users/ "), "/users");
/// assert_eq!(normalize("//users//"), "/users");
/// assert_eq!(normalize(""), "/");
/// ```
#[must_use]
pub fn normalize(path: &str) -> String {
    let stripped = path.trim().trim_matches('/');
    if stripped.is_empty() {
        return "/".to_string();
    }
    format!("/{stripped}")
}

/// Join a normalized prefix and path into an absolute path.
///
/// Both inputs are normalized first. `/` acts as the identity on either
/// side, so joining through intermediate prefixes one at a time produces
/// the same result as pre-joining them.
#[must_use]
pub fn join(prefix: &str, path: &str) -> String {
    let prefix = normalize(prefix);
    let path = normalize(path);
    if prefix == "/" {
        return path;
    }
    if path == "/" {
        return prefix;
    }
    format!("{prefix}{path}")
}
