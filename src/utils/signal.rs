//! Signal handling for graceful server shutdown

use tracing::{debug, warn};

/// Resolves once SIGINT or SIGTERM arrives.
///
/// If a handler cannot be installed the corresponding branch never fires, so
/// the server keeps running and can still be stopped by the other signal.
pub async fn shutdown_signal() {
	let interrupt = async {
		match tokio::signal::ctrl_c().await {
			Ok(()) => debug!("Received SIGINT, shutting down..."),
			Err(e) => {
				warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{signal, SignalKind};

		match signal(SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
				debug!("Received SIGTERM, shutting down...");
			}
			Err(e) => {
				warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = interrupt => {}
		_ = terminate => {}
	}
}

// vim: ts=4
