//! Types shared by the server and client dispatchers

use std::path::{Path, PathBuf};

use super::command::Command;
use super::messages::{FILE_MARKER, LISTING_HEADER};

/// Exchange phase of a server session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
	AwaitCommand,
	Executing(Command),
	Terminated,
}

/// Whether a dispatcher keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
	Continue,
	Finished,
}

/// Per-connection server state
#[derive(Debug, Clone)]
pub struct SessionState {
	/// Directory against which relative paths resolve
	pub working_dir: PathBuf,
	pub phase: SessionPhase,
	pub commands_handled: u64,
	pub bytes_sent: u64,
}

impl SessionState {
	pub fn new(working_dir: PathBuf) -> Self {
		SessionState {
			working_dir,
			phase: SessionPhase::AwaitCommand,
			commands_handled: 0,
			bytes_sent: 0,
		}
	}

	/// Resolve a peer-supplied path against the working directory
	pub fn resolve(&self, requested: &str) -> PathBuf {
		let requested = Path::new(requested);
		if requested.is_absolute() {
			requested.to_path_buf()
		} else {
			self.working_dir.join(requested)
		}
	}
}

/// What a worker hands back to the supervisor when its session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
	pub commands_handled: u64,
	pub bytes_sent: u64,
	/// True when the peer said `bye`, false when it just went away
	pub clean_disconnect: bool,
}

/// One line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
	pub name: String,
	pub is_regular_file: bool,
}

/// Render a listing payload: header, then one line per entry
pub fn format_listing(entries: &[DirectoryEntry]) -> String {
	let mut out = String::from(LISTING_HEADER);
	for entry in entries {
		out.push_str(&entry.name);
		if entry.is_regular_file {
			out.push_str(FILE_MARKER);
		}
		out.push('\n');
	}
	out
}

/// Parse a listing payload back into entries
pub fn parse_listing(payload: &str) -> Vec<DirectoryEntry> {
	payload
		.strip_prefix(LISTING_HEADER)
		.unwrap_or(payload)
		.lines()
		.filter(|line| !line.is_empty())
		.map(|line| match line.strip_suffix(FILE_MARKER) {
			Some(name) => DirectoryEntry { name: name.to_string(), is_regular_file: true },
			None => DirectoryEntry { name: line.to_string(), is_regular_file: false },
		})
		.collect()
}


// vim: ts=4
