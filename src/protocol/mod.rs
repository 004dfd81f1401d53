//! Wire protocol layer
//!
//! Every message travels as a payload followed by the two-byte terminator
//! `":)"`. The framer handles delimiting; the server and client dispatchers
//! drive the command state machine on top of it.
//!
//! # Example Usage
//!
//! ```ignore
//! use dirfetch::protocol::{ClientSession, FrameLimits, Framer};
//!
//! let framer = Framer::new(stream, FrameLimits::default());
//! let mut session = ClientSession::new(framer, download_dir);
//! session.greet().await?;
//! println!("{}", session.query_dir().await?);
//! ```

pub mod client;
pub mod command;
pub mod error;
pub mod framing;
pub mod messages;
pub mod server;
pub mod types;

pub use client::{ClientSession, Console, DownloadOutcome};
pub use command::Command;
pub use error::ProtocolError;
pub use framing::{FrameLimits, Framer, TERMINATOR};
pub use server::ServerSession;
pub use types::{DirectoryEntry, SessionFlow, SessionState, SessionSummary};

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

// vim: ts=4
