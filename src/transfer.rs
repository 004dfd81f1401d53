//! Whole-file transfer helpers
//!
//! A file travels as a single message, so anything that does not fit in one
//! payload (or that contains the terminator) is refused up front.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs as afs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::protocol::framing::contains_terminator;

/// Errors while preparing or storing a transferred file
#[derive(Debug)]
pub enum TransferError {
	/// File could not be opened or inspected
	Open { path: PathBuf, source: io::Error },
	/// Path exists but is a directory or special file
	NotRegularFile { path: PathBuf, is_dir: bool },
	/// File does not fit in one message
	TooLarge { path: PathBuf, size: u64, limit: usize },
	/// Content would be split by the framer
	ContainsTerminator { path: PathBuf },
	/// Received content could not be written
	Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for TransferError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransferError::Open { source, .. } => write!(f, "{}", source),
			TransferError::NotRegularFile { path, is_dir: true } => {
				write!(f, "{} is a directory not a file!", display_name(path))
			}
			TransferError::NotRegularFile { path, is_dir: false } => {
				write!(f, "{} is not a regular file!", display_name(path))
			}
			TransferError::TooLarge { path, size, limit } => {
				write!(f, "{} is {} bytes, the limit is {} bytes", display_name(path), size, limit)
			}
			TransferError::ContainsTerminator { path } => write!(
				f,
				"{} contains the message terminator and cannot be sent",
				display_name(path)
			),
			TransferError::Write { path, source } => {
				write!(f, "Cannot write {}: {}", path.display(), source)
			}
		}
	}
}

impl std::error::Error for TransferError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			TransferError::Open { source, .. } | TransferError::Write { source, .. } => Some(source),
			_ => None,
		}
	}
}

fn display_name(path: &Path) -> String {
	path.file_name().unwrap_or(path.as_os_str()).to_string_lossy().into_owned()
}

/// Check `path` is a regular file that fits in `max_payload` bytes, then read
/// it completely.
///
/// The kind is checked before opening; opening a FIFO for reading would wait
/// for a writer that may never come.
pub async fn load_for_send(path: &Path, max_payload: usize) -> Result<Vec<u8>, TransferError> {
	let meta = afs::metadata(path)
		.await
		.map_err(|source| TransferError::Open { path: path.to_path_buf(), source })?;
	check_sendable(path, &meta, max_payload)?;

	let mut file = open_for_send(path)
		.await
		.map_err(|source| TransferError::Open { path: path.to_path_buf(), source })?;
	// The path may have been replaced between the two calls
	let meta = file
		.metadata()
		.await
		.map_err(|source| TransferError::Open { path: path.to_path_buf(), source })?;
	check_sendable(path, &meta, max_payload)?;

	let mut content = Vec::with_capacity(meta.len() as usize);
	(&mut file)
		.take(max_payload as u64 + 1)
		.read_to_end(&mut content)
		.await
		.map_err(|source| TransferError::Open { path: path.to_path_buf(), source })?;

	// File may have grown since the metadata call
	if content.len() > max_payload {
		return Err(TransferError::TooLarge {
			path: path.to_path_buf(),
			size: content.len() as u64,
			limit: max_payload,
		});
	}
	if contains_terminator(&content) {
		return Err(TransferError::ContainsTerminator { path: path.to_path_buf() });
	}
	Ok(content)
}

fn check_sendable(path: &Path, meta: &std::fs::Metadata, max_payload: usize) -> Result<(), TransferError> {
	if !meta.is_file() {
		return Err(TransferError::NotRegularFile { path: path.to_path_buf(), is_dir: meta.is_dir() });
	}
	if meta.len() > max_payload as u64 {
		return Err(TransferError::TooLarge {
			path: path.to_path_buf(),
			size: meta.len(),
			limit: max_payload,
		});
	}
	Ok(())
}

#[cfg(unix)]
async fn open_for_send(path: &Path) -> io::Result<afs::File> {
	afs::OpenOptions::new().read(true).custom_flags(libc::O_NONBLOCK).open(path).await
}

#[cfg(not(unix))]
async fn open_for_send(path: &Path) -> io::Result<afs::File> {
	afs::File::open(path).await
}

/// Write a received payload verbatim, creating or truncating `path`
pub async fn store_received(path: &Path, content: &[u8]) -> Result<u64, TransferError> {
	let mut file = afs::File::create(path)
		.await
		.map_err(|source| TransferError::Write { path: path.to_path_buf(), source })?;
	file.write_all(content)
		.await
		.map_err(|source| TransferError::Write { path: path.to_path_buf(), source })?;
	file.flush().await.map_err(|source| TransferError::Write { path: path.to_path_buf(), source })?;
	Ok(content.len() as u64)
}

/// Whether something already occupies `path` locally
pub async fn exists_locally(path: &Path) -> bool {
	afs::symlink_metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_load_regular_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("report.txt");
		std::fs::write(&path, b"quarterly numbers\n").unwrap();

		let content = load_for_send(&path, 4998).await.unwrap();
		assert_eq!(content, b"quarterly numbers\n".to_vec());
	}

	#[tokio::test]
	async fn test_load_missing_file() {
		let dir = TempDir::new().unwrap();
		let err = load_for_send(&dir.path().join("nope"), 4998).await.unwrap_err();
		assert!(matches!(err, TransferError::Open { .. }));
	}

	#[tokio::test]
	async fn test_load_directory() {
		let dir = TempDir::new().unwrap();
		std::fs::create_dir(dir.path().join("sub")).unwrap();

		let err = load_for_send(&dir.path().join("sub"), 4998).await.unwrap_err();
		assert!(matches!(err, TransferError::NotRegularFile { is_dir: true, .. }));
		assert_eq!(err.to_string(), "sub is a directory not a file!");
	}

	#[tokio::test]
	async fn test_load_too_large() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("big.bin");
		std::fs::write(&path, vec![b'x'; 100]).unwrap();

		match load_for_send(&path, 99).await {
			Err(TransferError::TooLarge { size, limit, .. }) => {
				assert_eq!(size, 100);
				assert_eq!(limit, 99);
			}
			other => panic!("expected TooLarge, got {:?}", other),
		}
		assert!(load_for_send(&path, 100).await.is_ok());
	}

	#[tokio::test]
	async fn test_load_refuses_terminator() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("smiley.txt");
		std::fs::write(&path, b"have a nice day :)\n").unwrap();

		let err = load_for_send(&path, 4998).await.unwrap_err();
		assert!(matches!(err, TransferError::ContainsTerminator { .. }));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn test_load_fifo_is_refused_without_blocking() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("pipe");
		let c_path = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
		assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) }, 0);

		let result = tokio::time::timeout(std::time::Duration::from_secs(5), load_for_send(&path, 4998))
			.await
			.expect("load_for_send blocked on a FIFO");
		let err = result.unwrap_err();
		assert!(matches!(err, TransferError::NotRegularFile { is_dir: false, .. }));
		assert_eq!(err.to_string(), "pipe is not a regular file!");
	}

	#[tokio::test]
	async fn test_store_and_overwrite() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("out.txt");
		assert!(!exists_locally(&path).await);

		assert_eq!(store_received(&path, b"first version").await.unwrap(), 13);
		assert!(exists_locally(&path).await);
		store_received(&path, b"v2").await.unwrap();
		assert_eq!(std::fs::read(&path).unwrap(), b"v2".to_vec());
	}
}

// vim: ts=4
