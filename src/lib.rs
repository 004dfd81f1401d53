//! # dirfetch - Remote Directory Browser and File Fetcher
//!
//! A small client/server pair speaking a terminator-framed text protocol over
//! TCP. A client can print and change the server-side working directory of
//! its session, list that directory and download single files from it.
//!
//! ## Serving
//!
//! ```rust,ignore
//! use dirfetch::protocol::FrameLimits;
//! use dirfetch::supervisor::Supervisor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let supervisor = Supervisor::bind(
//!         "0.0.0.0:49878".parse()?,
//!         128,
//!         FrameLimits::default(),
//!         std::env::current_dir()?,
//!     )?;
//!     supervisor.run_until(dirfetch::utils::shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Fetching
//!
//! ```rust,ignore
//! use dirfetch::protocol::{ClientSession, FrameLimits};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let framer = dirfetch::connection::connect("fileserver", 49878, FrameLimits::default()).await?;
//!     let mut session = ClientSession::new(framer, ".".into());
//!     session.greet().await?;
//!     println!("{}", session.list_dir().await?);
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod supervisor;
pub mod transfer;
pub mod utils;
pub mod validation;

// Re-export commonly used types and functions
pub use config::Config;
pub use error::FetchError;
pub use protocol::{ClientSession, Command, FrameLimits, Framer, ProtocolError, ServerSession};
pub use supervisor::{Supervisor, SupervisorStats};

// vim: ts=4
