//! Terminator-delimited message framing
//!
//! Every message on the wire is `payload || ":)"`. There is no length prefix
//! and no escaping, so a payload must never contain the terminator itself.
//! The receiving side accumulates reads until the terminator shows up or the
//! buffer hits the configured ceiling.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::error::ProtocolError;
use super::ProtocolResult;

/// End-of-message marker
pub const TERMINATOR: &[u8; 2] = b":)";

/// Default ceiling for one message, terminator included
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 5000;

const READ_CHUNK: usize = 4096;

/// Size and time bounds applied to every message on a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
	/// Largest wire message accepted or produced, terminator included
	pub max_message_size: usize,
	/// Upper bound on a single read; `None` blocks until the peer sends or closes
	pub read_timeout: Option<Duration>,
}

impl Default for FrameLimits {
	fn default() -> Self {
		FrameLimits { max_message_size: DEFAULT_MAX_MESSAGE_SIZE, read_timeout: None }
	}
}

impl FrameLimits {
	pub fn new(max_message_size: usize, read_timeout: Option<Duration>) -> Self {
		FrameLimits { max_message_size, read_timeout }
	}

	/// Largest payload that still fits in one message
	pub fn max_payload(&self) -> usize {
		self.max_message_size.saturating_sub(TERMINATOR.len())
	}
}

/// Append the terminator to `payload`.
///
/// Fails instead of truncating when the encoded form would not fit in
/// `max_message_size` bytes, and refuses payloads that already contain the
/// terminator since the receiver would split them.
pub fn encode(payload: &[u8], max_message_size: usize) -> ProtocolResult<Vec<u8>> {
	let size = payload.len() + TERMINATOR.len();
	if size > max_message_size {
		return Err(ProtocolError::MessageTooLarge { size, max: max_message_size });
	}
	if let Some(offset) = find_terminator(payload) {
		return Err(ProtocolError::TerminatorInPayload { offset });
	}
	let mut wire = Vec::with_capacity(size);
	wire.extend_from_slice(payload);
	wire.extend_from_slice(TERMINATOR);
	Ok(wire)
}

/// Offset of the first terminator in `buf`, scanning from the start
pub fn find_terminator(buf: &[u8]) -> Option<usize> {
	buf.windows(TERMINATOR.len()).position(|w| w == TERMINATOR)
}

pub fn contains_terminator(buf: &[u8]) -> bool {
	find_terminator(buf).is_some()
}

/// A byte stream plus its read-accumulation buffer
pub struct Framer<S> {
	stream: S,
	buf: Vec<u8>,
	limits: FrameLimits,
}

impl<S> Framer<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	pub fn new(stream: S, limits: FrameLimits) -> Self {
		Framer { stream, buf: Vec::with_capacity(READ_CHUNK), limits }
	}

	pub fn limits(&self) -> &FrameLimits {
		&self.limits
	}

	/// Bytes received past the last decoded message
	pub fn buffered(&self) -> usize {
		self.buf.len()
	}

	/// Encode and write one message, flushing afterwards
	pub async fn send(&mut self, payload: &[u8]) -> ProtocolResult<()> {
		let wire = encode(payload, self.limits.max_message_size)?;
		self.stream.write_all(&wire).await?;
		self.stream.flush().await?;
		trace!("[framing] sent {} byte payload", payload.len());
		Ok(())
	}

	pub async fn send_text(&mut self, text: &str) -> ProtocolResult<()> {
		self.send(text.as_bytes()).await
	}

	/// Decode the next message.
	///
	/// The whole accumulated buffer is rescanned from offset 0 after every
	/// read. Bytes following the terminator stay buffered for the next call.
	pub async fn receive(&mut self) -> ProtocolResult<Vec<u8>> {
		let max = self.limits.max_message_size;
		let mut chunk = [0u8; READ_CHUNK];

		loop {
			if let Some(pos) = find_terminator(&self.buf) {
				let mut payload: Vec<u8> = self.buf.drain(..pos + TERMINATOR.len()).collect();
				payload.truncate(pos);
				trace!("[framing] received {} byte payload", payload.len());
				return Ok(payload);
			}

			if self.buf.len() >= max {
				return Err(ProtocolError::TerminatorNotFound { limit: max });
			}

			let want = (max - self.buf.len()).min(READ_CHUNK);
			let n = match self.limits.read_timeout {
				Some(timeout) => {
					tokio::time::timeout(timeout, self.stream.read(&mut chunk[..want])).await??
				}
				None => self.stream.read(&mut chunk[..want]).await?,
			};
			if n == 0 {
				return Err(ProtocolError::Disconnected);
			}
			self.buf.extend_from_slice(&chunk[..n]);
		}
	}

	/// Decode the next message as text (invalid UTF-8 is replaced)
	pub async fn receive_text(&mut self) -> ProtocolResult<String> {
		let payload = self.receive().await?;
		Ok(String::from_utf8_lossy(&payload).into_owned())
	}

	/// Close the write half of the stream
	pub async fn shutdown(&mut self) -> ProtocolResult<()> {
		self.stream.shutdown().await?;
		Ok(())
	}

	pub fn into_inner(self) -> S {
		self.stream
	}
}


// vim: ts=4
