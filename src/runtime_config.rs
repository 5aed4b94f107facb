//! Environment-based runtime configuration.
//!
//! `ROUTEDEF_STACK_SIZE` sets the stack size for handler coroutines, in
//! decimal (`16384`) or hexadecimal (`0x4000`) bytes. Default: 16 KB.
//! Total memory scales with `stack_size × concurrent requests`, so tune
//! it to handler complexity rather than leaving generous headroom.

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 16 KB).
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("ROUTEDEF_STACK_SIZE") {
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
}
