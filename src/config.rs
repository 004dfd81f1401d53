//! Unified configuration for dirfetch
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (--config FILE, or ~/.config/dirfetch/config.toml if present)
//! 3. Environment variables (DIRFETCH_* prefix)
//! 4. CLI flags (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::error::FetchError;
use crate::protocol::framing::{FrameLimits, DEFAULT_MAX_MESSAGE_SIZE};
use crate::validation;

/// Port used when none is given
pub const DEFAULT_PORT: u16 = 49878;

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Configuration shared by the `serve` and `connect` subcommands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	/// Listening side
	pub server: ServerConfig,

	/// Interactive client side
	pub client: ClientConfig,

	/// Wire protocol limits (must agree between peers)
	pub protocol: ProtocolConfig,

	/// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			server: ServerConfig::default(),
			client: ClientConfig::default(),
			protocol: ProtocolConfig::default(),
			log_level: "info".to_string(),
		}
	}
}

// ============================================================================
// NESTED CONFIGURATION STRUCTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
	/// Address to listen on
	pub bind_address: String,

	pub port: u16,

	/// Initial working directory of every session (defaults to the process cwd)
	pub root: Option<PathBuf>,

	/// Listen backlog (defaults to the platform maximum)
	pub backlog: Option<u32>,

	/// Give up on a silent client after this many seconds
	pub read_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig {
			bind_address: "0.0.0.0".to_string(),
			port: DEFAULT_PORT,
			root: None,
			backlog: None,
			read_timeout_secs: Some(300),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	pub port: u16,

	/// Where downloaded files are written
	pub download_dir: PathBuf,

	/// Give up on a silent server after this many seconds (unset waits forever)
	pub read_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		ClientConfig { port: DEFAULT_PORT, download_dir: PathBuf::from("."), read_timeout_secs: None }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtocolConfig {
	/// Largest wire message, terminator included
	pub max_message_size: usize,
}

impl Default for ProtocolConfig {
	fn default() -> Self {
		ProtocolConfig { max_message_size: DEFAULT_MAX_MESSAGE_SIZE }
	}
}

// ============================================================================
// LOADING
// ============================================================================

impl Config {
	/// Load from an explicit file, or from the default location if it exists
	pub fn load(path: Option<&Path>) -> Result<Config, FetchError> {
		match path {
			Some(path) => Config::from_file(path),
			None => match default_config_path() {
				Some(path) if path.is_file() => Config::from_file(&path),
				_ => Ok(Config::default()),
			},
		}
	}

	pub fn from_file(path: &Path) -> Result<Config, FetchError> {
		let text = fs::read_to_string(path).map_err(|e| FetchError::Config {
			message: format!("Cannot read {}: {}", path.display(), e),
		})?;
		Config::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> Result<Config, FetchError> {
		Ok(toml::from_str(text)?)
	}

	/// Apply DIRFETCH_* overrides from the process environment
	pub fn apply_env(&mut self) -> Result<(), FetchError> {
		self.apply_env_from(|key| env::var(key).ok())
	}

	pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), FetchError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(port) = lookup("DIRFETCH_PORT") {
			let port = validation::parse_port(&port)?;
			self.server.port = port;
			self.client.port = port;
		}
		if let Some(level) = lookup("DIRFETCH_LOG") {
			self.log_level = level;
		}
		if let Some(size) = lookup("DIRFETCH_MAX_MESSAGE_SIZE") {
			self.protocol.max_message_size = size.trim().parse().map_err(|_| FetchError::Config {
				message: format!("DIRFETCH_MAX_MESSAGE_SIZE is not a number: {:?}", size),
			})?;
		}
		Ok(())
	}

	pub fn validate(&self) -> Result<(), FetchError> {
		validation::validate_port(self.server.port)?;
		validation::validate_port(self.client.port)?;
		validation::validate_message_size(self.protocol.max_message_size)?;
		if let Some(secs) = self.server.read_timeout_secs {
			validation::validate_timeout_secs(secs)?;
		}
		if let Some(secs) = self.client.read_timeout_secs {
			validation::validate_timeout_secs(secs)?;
		}
		if let Some(backlog) = self.server.backlog {
			validation::validate_backlog(backlog)?;
		}
		Ok(())
	}

	pub fn server_limits(&self) -> FrameLimits {
		FrameLimits::new(
			self.protocol.max_message_size,
			self.server.read_timeout_secs.map(Duration::from_secs),
		)
	}

	pub fn client_limits(&self) -> FrameLimits {
		FrameLimits::new(
			self.protocol.max_message_size,
			self.client.read_timeout_secs.map(Duration::from_secs),
		)
	}

	pub fn server_backlog(&self) -> u32 {
		self.server.backlog.unwrap_or_else(platform_max_backlog)
	}
}

/// ~/.config/dirfetch/config.toml
pub fn default_config_path() -> Option<PathBuf> {
	env::var("HOME")
		.ok()
		.map(|home| PathBuf::from(home).join(".config").join("dirfetch").join("config.toml"))
}

/// Largest listen backlog the platform accepts
#[cfg(unix)]
pub fn platform_max_backlog() -> u32 {
	libc::SOMAXCONN as u32
}

#[cfg(not(unix))]
pub fn platform_max_backlog() -> u32 {
	1024
}


// vim: ts=4
