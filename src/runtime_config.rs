//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the coroutine runtime the server
//! adapter runs on.
//!
//! ## Environment Variables
//!
//! ### `MANIFOLD_STACK_SIZE`
//!
//! Sets the stack size for request-handling coroutines. Accepts values in:
//! - Decimal: `16384` (16 KB)
//! - Hexadecimal: `0x4000` (16 KB)
//!
//! Default: `0x4000` (16 KB)
//!
//! Each concurrent request runs on its own coroutine, so total stack
//! memory is `stack_size x concurrent_requests`. Handlers with deep call
//! chains or large locals need more; `0x8000` is a reasonable next step.
//!
//! ## Usage
//!
//! ```rust
//! use manifold::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! config.apply();
//! ```

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Load at startup with [`RuntimeConfig::from_env`] and install with
/// [`apply`](RuntimeConfig::apply) before starting the server.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000).
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { stack_size: 0x4000 }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let stack_size = match env::var("MANIFOLD_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(0x4000)
                } else {
                    val.parse().unwrap_or(0x4000)
                }
            }
            Err(_) => 0x4000,
        };
        RuntimeConfig { stack_size }
    }

    /// Install this configuration into the coroutine runtime.
    ///
    /// Takes effect for coroutines spawned afterwards; call it once before
    /// [`HttpServer::start`](crate::server::HttpServer::start).
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test touches the env var so the cases cannot race each other.
    #[test]
    fn test_from_env_parses_hex_decimal_and_garbage() {
        env::remove_var("MANIFOLD_STACK_SIZE");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x4000);

        env::set_var("MANIFOLD_STACK_SIZE", "0x8000");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x8000);

        env::set_var("MANIFOLD_STACK_SIZE", "32768");
        assert_eq!(RuntimeConfig::from_env().stack_size, 32768);

        env::set_var("MANIFOLD_STACK_SIZE", "not-a-number");
        assert_eq!(RuntimeConfig::from_env().stack_size, 0x4000);

        env::remove_var("MANIFOLD_STACK_SIZE");
    }
}
