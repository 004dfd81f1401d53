//! Port number validation

use super::ValidationError;

/// Lowest port a user may choose
pub const MIN_USER_PORT: u16 = 1025;
/// Highest port a user may choose
pub const MAX_USER_PORT: u16 = 65534;

/// Parse a user-supplied port.
///
/// The text must be all ASCII digits and the value must lie within
/// `MIN_USER_PORT..=MAX_USER_PORT`.
pub fn parse_port(text: &str) -> Result<u16, ValidationError> {
	if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
		return Err(ValidationError::PortError(format!(
			"port must be all numeric, got {:?}",
			text
		)));
	}
	// All digits, so the only parse failure left is overflow
	let value: u32 = text.parse().unwrap_or(u32::MAX);
	if value < u32::from(MIN_USER_PORT) || value > u32::from(MAX_USER_PORT) {
		return Err(ValidationError::PortError(format!(
			"port must be between {} and {}, got {}",
			MIN_USER_PORT, MAX_USER_PORT, text
		)));
	}
	Ok(value as u16)
}

/// Validate a port that is already numeric (config files, env)
pub fn validate_port(port: u16) -> Result<(), ValidationError> {
	parse_port(&port.to_string()).map(|_| ())
}


// vim: ts=4
