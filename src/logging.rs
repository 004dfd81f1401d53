//! Logging prelude module for convenient access to tracing macros.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("[server] worker {} accepted {}", id, peer);
//! debug!("[client] sending {:?}", message);
//! ```

pub use tracing::{debug, error, info, trace, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (from the config file
/// or `DIRFETCH_LOG`) is used:
///
/// ```bash
/// RUST_LOG=debug dirfetch serve
/// RUST_LOG=dirfetch::supervisor=debug,dirfetch::protocol=trace dirfetch serve
/// ```
pub fn init_tracing(default_level: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
