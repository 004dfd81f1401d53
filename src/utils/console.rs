//! Line-based terminal console for the interactive client

use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::protocol::Console;

/// Reads answers from stdin, writes output to stdout and errors to stderr
pub struct TerminalConsole {
	input: BufReader<Stdin>,
}

impl TerminalConsole {
	pub fn new() -> Self {
		TerminalConsole { input: BufReader::new(tokio::io::stdin()) }
	}
}

impl Default for TerminalConsole {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Console for TerminalConsole {
	async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
		{
			let mut stdout = io::stdout();
			write!(stdout, "{}", prompt)?;
			stdout.flush()?;
		}

		let mut line = String::new();
		if self.input.read_line(&mut line).await? == 0 {
			// Move past the prompt on EOF
			println!();
			return Ok(None);
		}
		Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
	}

	fn show(&mut self, text: &str) {
		println!("{}", text);
	}

	fn show_error(&mut self, text: &str) {
		eprintln!("{}", text);
	}
}

// vim: ts=4
