//! Command vocabulary shared by both peers

use std::fmt;

/// One of the commands a session understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// `pwd` - report the session working directory
	QueryDir,
	/// `dir` - list the session working directory
	ListDir,
	/// `cd` - change the session working directory
	ChangeDir,
	/// `download` - fetch one regular file
	Download,
	/// `bye` - end the session
	Disconnect,
	/// Anything outside the vocabulary, kept verbatim
	Unknown(String),
}

impl Command {
	/// Every known command, in menu order
	pub const ALL: [Command; 5] =
		[Command::QueryDir, Command::ListDir, Command::ChangeDir, Command::Download, Command::Disconnect];

	/// Match wire text exactly; the wire vocabulary is lowercase
	pub fn from_wire(text: &str) -> Self {
		match text {
			"pwd" => Command::QueryDir,
			"dir" => Command::ListDir,
			"cd" => Command::ChangeDir,
			"download" => Command::Download,
			"bye" => Command::Disconnect,
			other => Command::Unknown(other.to_string()),
		}
	}

	/// Match user input case-insensitively, ignoring surrounding whitespace
	pub fn from_user_input(text: &str) -> Self {
		let normalized = text.trim().to_lowercase();
		match Command::from_wire(&normalized) {
			Command::Unknown(_) => Command::Unknown(text.trim().to_string()),
			cmd => cmd,
		}
	}

	/// Wire verb, or `None` for commands that are never transmitted
	pub fn wire_verb(&self) -> Option<&'static str> {
		match self {
			Command::QueryDir => Some("pwd"),
			Command::ListDir => Some("dir"),
			Command::ChangeDir => Some("cd"),
			Command::Download => Some("download"),
			Command::Disconnect => Some("bye"),
			Command::Unknown(_) => None,
		}
	}

	/// Whether the command needs one extra user-supplied value
	pub fn takes_argument(&self) -> bool {
		matches!(self, Command::ChangeDir | Command::Download)
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Command::Unknown(text) => write!(f, "{}", text),
			cmd => write!(f, "{}", cmd.wire_verb().unwrap_or_default()),
		}
	}
}


// vim: ts=4
