//! Client-side command dispatcher
//!
//! Mirrors the server state machine: every command is one request followed by
//! the exact response sequence the server produces for it. User interaction
//! (extra arguments, overwrite confirmation) goes through the `Console` trait
//! so the dispatcher can be driven by a terminal or by a script.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};

use super::command::Command;
use super::error::ProtocolError;
use super::framing::{contains_terminator, Framer};
use super::messages;
use super::types::SessionFlow;
use super::ProtocolResult;
use crate::error::FetchError;
use crate::logging::*;
use crate::transfer;
use crate::validation;

/// Menu shown at start and after every command except `bye`
pub const MENU: &str = "\
Menu Options:
  PWD                  - Print working directory on server
  DIR                  - List files in current directory on server
  CD <directory>       - Change directory on server
  DOWNLOAD <file name> - Download file from server
  BYE                  - Disconnect from server";

/// Where the interactive client reads answers and writes output
#[async_trait]
pub trait Console: Send {
	/// Show `prompt` and read one line; `None` at end of input
	async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

	/// Regular output
	fn show(&mut self, text: &str);

	/// Local errors (invalid input, refused downloads)
	fn show_error(&mut self, text: &str);
}

/// How a download request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
	/// File stored locally
	Saved { path: PathBuf, bytes: u64 },
	/// Local file kept; server acknowledged the cancellation
	Cancelled(String),
	/// Server did not offer the file; its explanation
	Refused(String),
}

pub struct ClientSession<S> {
	framer: Framer<S>,
	download_dir: PathBuf,
}

impl<S> ClientSession<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send,
{
	pub fn new(framer: Framer<S>, download_dir: PathBuf) -> Self {
		Self { framer, download_dir }
	}

	/// Receive the server's unsolicited greeting
	pub async fn greet(&mut self) -> ProtocolResult<String> {
		let greeting = self.framer.receive_text().await?;
		debug!("[client] greeting: {:?}", greeting);
		Ok(greeting)
	}

	async fn exchange(&mut self, message: &str) -> ProtocolResult<String> {
		debug!("[client] sending {:?}", message);
		self.framer.send_text(message).await?;
		let reply = self.framer.receive_text().await?;
		debug!("[client] received {} byte reply", reply.len());
		Ok(reply)
	}

	pub async fn query_dir(&mut self) -> ProtocolResult<String> {
		self.exchange(&Command::QueryDir.to_string()).await
	}

	pub async fn list_dir(&mut self) -> ProtocolResult<String> {
		self.exchange(&Command::ListDir.to_string()).await
	}

	/// Send `verb` and check the server answers with `prompt`
	async fn request_prompt(&mut self, verb: &str, prompt: &str) -> ProtocolResult<()> {
		let reply = self.exchange(verb).await?;
		if reply != prompt {
			return Err(ProtocolError::UnexpectedResponse(reply));
		}
		Ok(())
	}

	/// Returns the server's success or failure text
	pub async fn change_dir(&mut self, dir: &str) -> Result<String, FetchError> {
		self.check_argument(dir)?;
		self.request_prompt(&Command::ChangeDir.to_string(), messages::CHANGE_DIR_PROMPT).await?;
		Ok(self.exchange(dir).await?)
	}

	/// Refuse an argument the server could not receive as one message
	fn check_argument(&self, text: &str) -> Result<(), FetchError> {
		if contains_terminator(text.as_bytes()) {
			return Err(FetchError::UserInput {
				message: format!("{:?} contains the message terminator", text),
			});
		}
		let max_payload = self.framer.limits().max_payload();
		if text.len() > max_payload {
			return Err(FetchError::UserInput {
				message: format!("Argument is {} bytes, the limit is {} bytes", text.len(), max_payload),
			});
		}
		Ok(())
	}

	/// Request `name` from the server and store it in the download directory
	/// under its final path component.
	pub async fn download<C>(&mut self, name: &str, console: &mut C) -> Result<DownloadOutcome, FetchError>
	where
		C: Console + ?Sized,
	{
		self.check_argument(name)?;
		let local_name = validation::local_file_name(name)
			.map_err(|e| FetchError::UserInput { message: e.to_string() })?;

		self.request_prompt(&Command::Download.to_string(), messages::DOWNLOAD_PROMPT).await?;
		let response = self.exchange(name).await?;
		if response != messages::READY {
			return Ok(DownloadOutcome::Refused(response));
		}

		let target = self.download_dir.join(&local_name);
		if transfer::exists_locally(&target).await && !confirm_overwrite(console, &local_name).await? {
			let ack = self.exchange(messages::STOP).await?;
			return Ok(DownloadOutcome::Cancelled(ack));
		}

		self.framer.send_text(messages::READY).await?;
		let content = self.framer.receive().await?;
		match transfer::store_received(&target, &content).await {
			Ok(bytes) => {
				self.framer.send_text(messages::RECEIVED_ACK).await?;
				info!("[client] saved {} ({} bytes)", target.display(), bytes);
				Ok(DownloadOutcome::Saved { path: target, bytes })
			}
			Err(e) => {
				// The server still waits for an acknowledgment
				self.framer.send_text(&format!("File could not be saved: {}", e)).await?;
				Err(e.into())
			}
		}
	}

	/// Send `bye` and return the farewell
	pub async fn disconnect(&mut self) -> ProtocolResult<String> {
		let farewell = self.exchange(&Command::Disconnect.to_string()).await?;
		if let Err(e) = self.framer.shutdown().await {
			debug!("[client] shutdown after bye: {}", e);
		}
		Ok(farewell)
	}

	/// Run one user command, showing results on `console`.
	///
	/// Local problems (unknown verb, bad file name, unwritable download) are
	/// shown and the session continues; connection failures are returned.
	pub async fn execute<C>(
		&mut self,
		command: Command,
		argument: Option<String>,
		console: &mut C,
	) -> Result<SessionFlow, FetchError>
	where
		C: Console + ?Sized,
	{
		match command {
			Command::QueryDir => {
				let dir = self.query_dir().await?;
				console.show(&dir);
			}
			Command::ListDir => {
				let listing = self.list_dir().await?;
				console.show(&listing);
			}
			Command::ChangeDir => {
				if let Some(dir) = argument_or_prompt(argument, "Directory name: ", console).await? {
					match self.change_dir(&dir).await {
						Ok(response) => console.show(&response),
						Err(e @ FetchError::UserInput { .. }) => console.show_error(&e.to_string()),
						Err(e) => return Err(e),
					}
				}
			}
			Command::Download => {
				if let Some(name) = argument_or_prompt(argument, "File name: ", console).await? {
					match self.download(&name, console).await {
						Ok(DownloadOutcome::Saved { path, bytes }) => {
							console.show(&format!("File: \"{}\" Downloaded! ({} bytes)", path.display(), bytes));
						}
						Ok(DownloadOutcome::Cancelled(ack)) => console.show(&ack),
						Ok(DownloadOutcome::Refused(reason)) => console.show_error(&reason),
						Err(e @ FetchError::UserInput { .. }) | Err(e @ FetchError::Filesystem { .. }) => {
							console.show_error(&e.to_string());
						}
						Err(e) => return Err(e),
					}
				}
			}
			Command::Disconnect => {
				let farewell = self.disconnect().await?;
				console.show(&farewell);
				return Ok(SessionFlow::Finished);
			}
			Command::Unknown(text) => {
				console.show_error(&format!(
					"Invalid option {:?} entered, please enter a valid menu option",
					text
				));
			}
		}
		Ok(SessionFlow::Continue)
	}

	/// Greet, then read commands from `console` until `bye` or end of input
	pub async fn run_interactive<C>(mut self, console: &mut C) -> Result<(), FetchError>
	where
		C: Console + ?Sized,
	{
		let greeting = self.greet().await?;
		console.show(&format!("Message from server: \"{}\"", greeting));
		console.show(MENU);

		loop {
			let line = console.read_line("Command: ").await.map_err(input_error)?;
			let (command, argument) = match line {
				Some(line) => match split_command_line(&line) {
					Some(parsed) => parsed,
					None => continue,
				},
				None => (Command::Disconnect, None),
			};

			if self.execute(command, argument, console).await? == SessionFlow::Finished {
				return Ok(());
			}
			console.show(MENU);
		}
	}
}

/// Split `"download My File.txt"` into the command and the rest of the line.
///
/// Trailing text after a command that takes no argument is ignored.
pub fn split_command_line(line: &str) -> Option<(Command, Option<String>)> {
	let line = line.trim();
	let verb = line.split_whitespace().next()?;
	let rest = line[verb.len()..].trim();
	let command = Command::from_user_input(verb);
	let argument = if command.takes_argument() && !rest.is_empty() { Some(rest.to_string()) } else { None };
	Some((command, argument))
}

async fn argument_or_prompt<C>(
	argument: Option<String>,
	prompt: &str,
	console: &mut C,
) -> Result<Option<String>, FetchError>
where
	C: Console + ?Sized,
{
	if let Some(argument) = argument {
		return Ok(Some(argument));
	}
	let answer = console.read_line(prompt).await.map_err(input_error)?;
	Ok(answer.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()))
}

/// Ask until the answer is yes or no; end of input counts as no
async fn confirm_overwrite<C>(console: &mut C, name: &str) -> Result<bool, FetchError>
where
	C: Console + ?Sized,
{
	let prompt = format!("File \"{}\" exists locally, overwrite? (y/n) ", name);
	loop {
		let answer = match console.read_line(&prompt).await.map_err(input_error)? {
			Some(answer) => answer,
			None => return Ok(false),
		};
		match answer.trim().to_lowercase().as_str() {
			"y" | "yes" => return Ok(true),
			"n" | "no" => return Ok(false),
			_ => console.show_error("Please enter (y/n)"),
		}
	}
}

fn input_error(e: io::Error) -> FetchError {
	FetchError::UserInput { message: e.to_string() }
}


// vim: ts=4
