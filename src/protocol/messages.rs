//! Fixed message texts exchanged by client and server
//!
//! Both sides compare some of these verbatim (`READY`, `STOP`), so they live
//! in one place.

use std::fmt::Display;
use std::path::Path;

/// Unsolicited first message after accept
pub const GREETING: &str = "Hello Client. ";
/// Response to `bye`
pub const FAREWELL: &str = "Good Bye Client.";
/// Prompt sent after `cd`
pub const CHANGE_DIR_PROMPT: &str = "Enter the New Directory: ";
/// Prompt sent after `download`
pub const DOWNLOAD_PROMPT: &str = "Enter the File Name: ";
/// File is available (server) / send it (client)
pub const READY: &str = "READY";
/// Client declines a file offered with `READY`
pub const STOP: &str = "STOP";
/// Server acknowledgment of `STOP`
pub const DOWNLOAD_CANCELLED: &str = "Download Canceled.";
/// Client acknowledgment after storing a file
pub const RECEIVED_ACK: &str = "File received successfully";
/// Header of every directory listing
pub const LISTING_HEADER: &str = "\nFiles are marked with **\n\n";
/// Suffix appended to regular files in a listing
pub const FILE_MARKER: &str = "  **";

pub fn change_dir_ok(dir: &Path) -> String {
	format!("Directory has Successfully Changed to: {}", dir.display())
}

pub fn change_dir_failed(err: impl Display) -> String {
	format!("Couldn't change to specified directory: {}", err)
}

pub fn query_dir_failed(err: impl Display) -> String {
	format!("Couldn't get current working directory: {}", err)
}

pub fn list_dir_failed(err: impl Display) -> String {
	format!("Couldn't list directory: {}", err)
}

pub fn listing_too_large(size: usize, max: usize) -> String {
	format!("Directory listing too large: {} bytes, the limit is {} bytes", size, max)
}

pub fn download_failed(err: impl Display) -> String {
	format!("Download failed: {}", err)
}

pub fn download_aborted(reply: &str) -> String {
	format!("Download aborted: expected {} or {}, got {:?}", READY, STOP, reply)
}

pub fn unrecognized_command(text: &str) -> String {
	format!("Unrecognized command: {}", text)
}

/// Marks a reply shortened by `fit_reply`
const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `max_payload` bytes, cutting on a character
/// boundary and marking the cut.
///
/// Replies echo peer input and filesystem paths, so their length is only
/// bounded by the message ceiling.
pub fn fit_reply(text: &str, max_payload: usize) -> String {
	if text.len() <= max_payload {
		return text.to_string();
	}
	let room = max_payload.saturating_sub(ELLIPSIS.len());
	let mut cut = room;
	while cut > 0 && !text.is_char_boundary(cut) {
		cut -= 1;
	}
	let mut fitted = String::with_capacity(max_payload);
	fitted.push_str(&text[..cut]);
	if max_payload >= ELLIPSIS.len() {
		fitted.push_str(ELLIPSIS);
	}
	fitted
}


// vim: ts=4
