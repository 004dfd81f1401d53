//! Error types for dirfetch operations

use std::error::Error;
use std::fmt;
use std::io;

use crate::protocol::ProtocolError;
use crate::transfer::TransferError;
use crate::validation::ValidationError;

/// Main error type for client and server operations
#[derive(Debug)]
pub enum FetchError {
	/// Malformed command line input (port, argument count)
	InvalidArgument { message: String },

	/// Connect, bind, listen or accept failed
	Transport { context: String, source: io::Error },

	/// Framing violation or transport failure seen through the framer
	Protocol(ProtocolError),

	/// Local file could not be read or written
	Filesystem { path: String, source: Box<dyn Error + Send + Sync> },

	/// Interactive input could not be obtained
	UserInput { message: String },

	/// Invalid configuration
	Config { message: String },

	/// I/O error
	Io(io::Error),
}

impl FetchError {
	pub fn transport(context: impl Into<String>, source: io::Error) -> Self {
		FetchError::Transport { context: context.into(), source }
	}

	/// Process exit status for this error
	pub fn exit_code(&self) -> i32 {
		match self {
			FetchError::InvalidArgument { .. } | FetchError::Config { .. } => 2,
			_ => 1,
		}
	}
}

impl fmt::Display for FetchError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FetchError::InvalidArgument { message } => write!(f, "Invalid argument: {}", message),
			FetchError::Transport { context, source } => write!(f, "{}: {}", context, source),
			FetchError::Protocol(e) => write!(f, "Protocol error: {}", e),
			FetchError::Filesystem { path, source } => write!(f, "{}: {}", path, source),
			FetchError::UserInput { message } => write!(f, "Input error: {}", message),
			FetchError::Config { message } => write!(f, "Invalid configuration: {}", message),
			FetchError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for FetchError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			FetchError::Transport { source, .. } => Some(source),
			FetchError::Protocol(e) => Some(e),
			FetchError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for FetchError {
	fn from(e: io::Error) -> Self {
		FetchError::Io(e)
	}
}

impl From<ProtocolError> for FetchError {
	fn from(e: ProtocolError) -> Self {
		FetchError::Protocol(e)
	}
}

impl From<TransferError> for FetchError {
	fn from(e: TransferError) -> Self {
		let path = match &e {
			TransferError::Open { path, .. }
			| TransferError::NotRegularFile { path, .. }
			| TransferError::TooLarge { path, .. }
			| TransferError::ContainsTerminator { path }
			| TransferError::Write { path, .. } => path.display().to_string(),
		};
		FetchError::Filesystem { path, source: Box::new(e) }
	}
}

impl From<ValidationError> for FetchError {
	fn from(e: ValidationError) -> Self {
		match e {
			ValidationError::PortError(message) => FetchError::InvalidArgument { message },
			ValidationError::PathError(message) => FetchError::InvalidArgument { message },
			ValidationError::ConfigError(message) => FetchError::Config { message },
		}
	}
}

impl From<toml::de::Error> for FetchError {
	fn from(e: toml::de::Error) -> Self {
		FetchError::Config { message: e.to_string() }
	}
}


// vim: ts=4
