//! Centralized validation for dirfetch
//!
//! This module provides common validation functions for:
//! - Port numbers given on the command line or in config files
//! - Configuration limits (message size, timeouts)
//! - Local file names derived from remote paths

use std::error::Error;
use std::fmt;

pub mod config;
pub mod path;
pub mod port;

pub use config::*;
pub use path::*;
pub use port::*;

/// Generic validation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// Invalid port number
	PortError(String),
	/// Invalid configuration
	ConfigError(String),
	/// Invalid path
	PathError(String),
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValidationError::PortError(msg) => write!(f, "Port validation error: {}", msg),
			ValidationError::ConfigError(msg) => write!(f, "Config validation error: {}", msg),
			ValidationError::PathError(msg) => write!(f, "Path validation error: {}", msg),
		}
	}
}

impl Error for ValidationError {}


// vim: ts=4
