//! Configuration validation functions

use super::ValidationError;

/// Smallest message ceiling that still fits every fixed protocol message
pub const MIN_MESSAGE_SIZE: usize = 64;
/// Largest message ceiling accepted from configuration
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Validate the maximum wire message size (terminator included)
pub fn validate_message_size(size: usize) -> Result<(), ValidationError> {
	if size < MIN_MESSAGE_SIZE {
		return Err(ValidationError::ConfigError(format!(
			"maxMessageSize must be at least {}, got {}",
			MIN_MESSAGE_SIZE, size
		)));
	}
	if size > MAX_MESSAGE_SIZE {
		return Err(ValidationError::ConfigError(format!(
			"maxMessageSize must be at most {}, got {}",
			MAX_MESSAGE_SIZE, size
		)));
	}
	Ok(())
}

/// Validate timeout in seconds
pub fn validate_timeout_secs(timeout_secs: u64) -> Result<(), ValidationError> {
	if timeout_secs == 0 {
		return Err(ValidationError::ConfigError("Timeout must be greater than 0".to_string()));
	}
	if timeout_secs > 86400 {
		return Err(ValidationError::ConfigError(format!(
			"Timeout too large: {} seconds (max 86400)",
			timeout_secs
		)));
	}
	Ok(())
}

/// Validate listen backlog
pub fn validate_backlog(backlog: u32) -> Result<(), ValidationError> {
	if backlog == 0 {
		return Err(ValidationError::ConfigError("Backlog must be greater than 0".to_string()));
	}
	Ok(())
}


// vim: ts=4
