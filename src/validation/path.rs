//! Path validation functions

use std::path::{Component, Path};

use super::ValidationError;

/// Derive the local file name for a download.
///
/// Only the final component of the remote name is used, so a download always
/// lands directly inside the local download directory.
///
/// # Returns
/// The file name, or `Err(ValidationError)` when the name has no usable final component
pub fn local_file_name(remote: &str) -> Result<String, ValidationError> {
	let path = Path::new(remote.trim());
	match path.components().last() {
		Some(Component::Normal(name)) => Ok(name.to_string_lossy().into_owned()),
		_ => Err(ValidationError::PathError(format!(
			"{:?} does not name a file",
			remote
		))),
	}
}


// vim: ts=4
