//! Server-side command dispatcher
//!
//! One `ServerSession` owns one connection. After the greeting it sits in
//! `AwaitCommand`, executes each command it decodes against its own working
//! directory, and goes back to waiting until the peer says `bye` or the
//! connection fails.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs as afs;
use tokio::io::{AsyncRead, AsyncWrite};

use super::command::Command;
use super::error::ProtocolError;
use super::framing::{contains_terminator, Framer};
use super::messages;
use super::types::*;
use super::ProtocolResult;
use crate::logging::*;
use crate::transfer;

pub struct ServerSession<S> {
	framer: Framer<S>,
	state: SessionState,
	peer: String,
}

impl<S> ServerSession<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	/// Create a session starting in `working_dir` (should be absolute)
	pub fn new(framer: Framer<S>, working_dir: PathBuf, peer: impl Into<String>) -> Self {
		Self { framer, state: SessionState::new(working_dir), peer: peer.into() }
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	/// Greet the peer and serve commands until `bye` or a connection failure.
	///
	/// A peer that disappears while the session is waiting for a command ends
	/// the session normally; a failure in the middle of an exchange is an error.
	pub async fn run(mut self) -> ProtocolResult<SessionSummary> {
		self.framer.send_text(messages::GREETING).await?;
		info!("[server] {} connected, working directory {}", self.peer, self.state.working_dir.display());

		loop {
			self.state.phase = SessionPhase::AwaitCommand;
			let message = match self.framer.receive_text().await {
				Ok(message) => message,
				Err(ProtocolError::Disconnected) => {
					info!("[server] {} closed the connection without bye", self.peer);
					return Ok(self.summary(false));
				}
				Err(e) => return Err(e),
			};

			let command = Command::from_wire(&message);
			debug!("[server] {} sent {:?}", self.peer, message);
			self.state.phase = SessionPhase::Executing(command.clone());
			let flow = self.dispatch(command).await?;
			self.state.commands_handled += 1;

			if flow == SessionFlow::Finished {
				self.state.phase = SessionPhase::Terminated;
				return Ok(self.summary(true));
			}
		}
	}

	/// Execute one command and write its response message(s)
	pub async fn dispatch(&mut self, command: Command) -> ProtocolResult<SessionFlow> {
		match command {
			Command::QueryDir => self.handle_query_dir().await,
			Command::ListDir => self.handle_list_dir().await,
			Command::ChangeDir => self.handle_change_dir().await,
			Command::Download => self.handle_download().await,
			Command::Disconnect => self.handle_disconnect().await,
			Command::Unknown(text) => self.handle_unknown(&text).await,
		}
	}

	fn summary(&self, clean_disconnect: bool) -> SessionSummary {
		SessionSummary {
			commands_handled: self.state.commands_handled,
			bytes_sent: self.state.bytes_sent,
			clean_disconnect,
		}
	}

	/// Send one reply, shortened if it would not fit in a message
	async fn respond(&mut self, text: &str) -> ProtocolResult<SessionFlow> {
		let reply = messages::fit_reply(text, self.framer.limits().max_payload());
		if reply.len() < text.len() {
			debug!("[server] {} reply of {} bytes shortened to {}", self.peer, text.len(), reply.len());
		}
		self.framer.send_text(&reply).await?;
		Ok(SessionFlow::Continue)
	}

	async fn handle_query_dir(&mut self) -> ProtocolResult<SessionFlow> {
		let dir = self.state.working_dir.clone();
		let response = match afs::metadata(&dir).await {
			Ok(_) if contains_terminator(dir.to_string_lossy().as_bytes()) => {
				warn!("[server] {} pwd: {} contains the message terminator", self.peer, dir.display());
				messages::query_dir_failed("Path contains the message terminator")
			}
			Ok(meta) if meta.is_dir() => dir.display().to_string(),
			Ok(_) => messages::query_dir_failed("Not a directory"),
			Err(e) => {
				warn!("[server] {} pwd: cannot stat {}: {}", self.peer, dir.display(), e);
				messages::query_dir_failed(e)
			}
		};
		info!("[server] {} pwd -> {}", self.peer, response);
		self.respond(&response).await
	}

	async fn handle_list_dir(&mut self) -> ProtocolResult<SessionFlow> {
		let entries = match list_directory(&self.state.working_dir).await {
			Ok(entries) => entries,
			Err(e) => {
				warn!(
					"[server] {} dir: cannot open {}: {}",
					self.peer,
					self.state.working_dir.display(),
					e
				);
				return self.respond(&messages::list_dir_failed(e)).await;
			}
		};

		let listing = format_listing(&entries);
		let max_payload = self.framer.limits().max_payload();
		info!("[server] {} dir -> {} entries", self.peer, entries.len());
		if listing.len() > max_payload {
			warn!("[server] {} dir: listing of {} bytes does not fit", self.peer, listing.len());
			return self.respond(&messages::listing_too_large(listing.len(), max_payload)).await;
		}
		self.respond(&listing).await
	}

	async fn handle_change_dir(&mut self) -> ProtocolResult<SessionFlow> {
		self.framer.send_text(messages::CHANGE_DIR_PROMPT).await?;
		let requested = self.framer.receive_text().await?;

		match self.resolve_directory(&requested).await {
			Ok(dir) => {
				info!("[server] {} cd -> {}", self.peer, dir.display());
				let response = messages::change_dir_ok(&dir);
				self.state.working_dir = dir;
				self.respond(&response).await
			}
			Err(e) => {
				warn!("[server] {} cd {:?} failed: {}", self.peer, requested, e);
				self.respond(&messages::change_dir_failed(e)).await
			}
		}
	}

	async fn resolve_directory(&self, requested: &str) -> io::Result<PathBuf> {
		if requested.is_empty() {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, "No directory given"));
		}
		let dir = afs::canonicalize(self.state.resolve(requested)).await?;
		if !afs::metadata(&dir).await?.is_dir() {
			return Err(io::Error::new(io::ErrorKind::Other, "Not a directory"));
		}
		// pwd could never report such a directory
		if contains_terminator(dir.to_string_lossy().as_bytes()) {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, "Path contains the message terminator"));
		}
		Ok(dir)
	}

	async fn handle_download(&mut self) -> ProtocolResult<SessionFlow> {
		self.framer.send_text(messages::DOWNLOAD_PROMPT).await?;
		let name = self.framer.receive_text().await?;
		if name.is_empty() {
			return self.respond(&messages::download_failed("No file name given")).await;
		}

		let path = self.state.resolve(&name);
		let max_payload = self.framer.limits().max_payload();
		let content = match transfer::load_for_send(&path, max_payload).await {
			Ok(content) => content,
			Err(e) => {
				warn!("[server] {} download {:?} refused: {}", self.peer, name, e);
				return self.respond(&messages::download_failed(e)).await;
			}
		};

		self.framer.send_text(messages::READY).await?;
		let reply = self.framer.receive_text().await?;
		match reply.as_str() {
			messages::READY => {
				self.framer.send(&content).await?;
				self.state.bytes_sent += content.len() as u64;
				let ack = self.framer.receive_text().await?;
				info!(
					"[server] {} download {:?}: sent {} bytes, client said {:?}",
					self.peer,
					name,
					content.len(),
					ack
				);
				Ok(SessionFlow::Continue)
			}
			messages::STOP => {
				info!("[server] {} download {:?} cancelled by client", self.peer, name);
				self.respond(messages::DOWNLOAD_CANCELLED).await
			}
			other => {
				warn!("[server] {} download {:?}: unexpected reply {:?}", self.peer, name, other);
				self.respond(&messages::download_aborted(other)).await
			}
		}
	}

	async fn handle_disconnect(&mut self) -> ProtocolResult<SessionFlow> {
		self.framer.send_text(messages::FAREWELL).await?;
		if let Err(e) = self.framer.shutdown().await {
			debug!("[server] {} shutdown after bye: {}", self.peer, e);
		}
		info!("[server] connection with {} has ended", self.peer);
		Ok(SessionFlow::Finished)
	}

	async fn handle_unknown(&mut self, text: &str) -> ProtocolResult<SessionFlow> {
		warn!("[server] {} sent unrecognized command {:?}", self.peer, text);
		self.respond(&messages::unrecognized_command(text)).await
	}
}

/// Enumerate `dir`, classifying each entry after following symlinks.
///
/// Entries that cannot be stat'ed are skipped, as are names containing the
/// message terminator. The result is sorted by name.
pub async fn list_directory(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
	let mut reader = afs::read_dir(dir).await?;
	let mut entries = Vec::new();

	loop {
		let entry = match reader.next_entry().await {
			Ok(Some(entry)) => entry,
			Ok(None) => break,
			Err(e) => {
				warn!("[server] error reading entry in {}: {}", dir.display(), e);
				break;
			}
		};

		let name = entry.file_name().to_string_lossy().into_owned();
		if contains_terminator(name.as_bytes()) {
			warn!("[server] skipping {:?} in {}: name contains the message terminator", name, dir.display());
			continue;
		}

		let path = entry.path();
		let meta = match afs::metadata(&path).await {
			Ok(meta) => meta,
			Err(e) => {
				debug!("[server] skipping {}: stat failed: {}", path.display(), e);
				continue;
			}
		};

		entries.push(DirectoryEntry { name, is_regular_file: meta.is_file() });
	}

	entries.sort_by(|a, b| a.name.cmp(&b.name));
	Ok(entries)
}


// vim: ts=4
