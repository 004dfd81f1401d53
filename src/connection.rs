//! Client connection to a dirfetch server

use tokio::net::{lookup_host, TcpStream};

use crate::error::FetchError;
use crate::logging::*;
use crate::protocol::{FrameLimits, Framer};

/// Resolve `host` and connect to the first address that accepts.
///
/// Every resolved address is tried in order; the last failure is reported if
/// none of them answers.
pub async fn connect(host: &str, port: u16, limits: FrameLimits) -> Result<Framer<TcpStream>, FetchError> {
	let addrs = lookup_host((host, port))
		.await
		.map_err(|e| FetchError::transport(format!("Cannot resolve {}", host), e))?;

	let mut last_error = None;
	for addr in addrs {
		debug!("[client] trying {}", addr);
		match TcpStream::connect(addr).await {
			Ok(stream) => {
				if let Err(e) = stream.set_nodelay(true) {
					debug!("[client] cannot set TCP_NODELAY: {}", e);
				}
				info!("[client] connected to {}", addr);
				return Ok(Framer::new(stream, limits));
			}
			Err(e) => {
				debug!("[client] {} refused: {}", addr, e);
				last_error = Some(e);
			}
		}
	}

	let source = last_error.unwrap_or_else(|| {
		std::io::Error::new(std::io::ErrorKind::NotFound, "host has no addresses")
	});
	Err(FetchError::transport(format!("Cannot connect to {}:{}", host, port), source))
}


// vim: ts=4
