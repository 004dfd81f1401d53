//! Protocol error types
//!
//! Errors raised while moving framed messages over a connection. Transport
//! failures and framing violations both end the session that observes them.

use std::fmt;
use std::io;

/// Protocol error type
#[derive(Debug)]
pub enum ProtocolError {
	/// I/O error from the underlying stream
	Io(io::Error),
	/// Peer closed the connection before a complete message arrived
	Disconnected,
	/// No data arrived within the configured read timeout
	Timeout,
	/// The accumulation buffer reached the ceiling without a terminator
	TerminatorNotFound { limit: usize },
	/// Payload plus terminator does not fit in one message
	MessageTooLarge { size: usize, max: usize },
	/// Payload contains the terminator and would be split by the receiver
	TerminatorInPayload { offset: usize },
	/// Peer answered with something the exchange does not allow
	UnexpectedResponse(String),
}

impl ProtocolError {
	/// True for failures of the byte stream itself (as opposed to framing violations)
	pub fn is_transport(&self) -> bool {
		matches!(self, ProtocolError::Io(_) | ProtocolError::Disconnected | ProtocolError::Timeout)
	}
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::Io(e) => write!(f, "I/O error: {}", e),
			ProtocolError::Disconnected => write!(f, "Connection closed by peer"),
			ProtocolError::Timeout => write!(f, "Timed out waiting for peer"),
			ProtocolError::TerminatorNotFound { limit } => {
				write!(f, "No message terminator within {} bytes", limit)
			}
			ProtocolError::MessageTooLarge { size, max } => {
				write!(f, "Message of {} bytes exceeds maximum of {} bytes", size, max)
			}
			ProtocolError::TerminatorInPayload { offset } => {
				write!(f, "Payload contains the message terminator at byte {}", offset)
			}
			ProtocolError::UnexpectedResponse(msg) => write!(f, "Unexpected response: {}", msg),
		}
	}
}

impl std::error::Error for ProtocolError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ProtocolError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ProtocolError {
	fn from(e: io::Error) -> Self {
		match e.kind() {
			io::ErrorKind::UnexpectedEof => ProtocolError::Disconnected,
			_ => ProtocolError::Io(e),
		}
	}
}

impl From<tokio::time::error::Elapsed> for ProtocolError {
	fn from(_: tokio::time::error::Elapsed) -> Self {
		ProtocolError::Timeout
	}
}


// vim: ts=4
