use clap::{Arg, ArgMatches, Command};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirfetch::config::Config;
use dirfetch::connection;
use dirfetch::error::FetchError;
use dirfetch::logging::{self, *};
use dirfetch::protocol::ClientSession;
use dirfetch::supervisor::Supervisor;
use dirfetch::utils::{shutdown_signal, TerminalConsole};
use dirfetch::validation;

///////////////////////
// Utility functions //
///////////////////////

fn build_cli() -> Command {
	Command::new("dirfetch")
		.version("0.1.0")
		.author("Szilard Hajba <szilu@symbion.hu>")
		.about("Browse a remote directory and download files over TCP")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.global(true)
				.help("Configuration file (default: ~/.config/dirfetch/config.toml)"),
		)
		.subcommand(
			Command::new("serve")
				.about("Serve the current (or --root) directory")
				.arg(
					Arg::new("port")
						.value_parser(validation::parse_port)
						.help("Port to listen on (1025-65534)"),
				)
				.arg(
					Arg::new("bind")
						.short('b')
						.long("bind")
						.value_name("ADDR")
						.help("Address to listen on"),
				)
				.arg(
					Arg::new("root")
						.short('r')
						.long("root")
						.value_name("DIR")
						.help("Initial working directory of every session"),
				),
		)
		.subcommand(
			Command::new("connect")
				.about("Connect to a dirfetch server interactively")
				.arg(Arg::new("hostname").required(true).help("Server host name or address"))
				.arg(
					Arg::new("port")
						.value_parser(validation::parse_port)
						.help("Server port (1025-65534)"),
				)
				.arg(
					Arg::new("download-dir")
						.short('d')
						.long("download-dir")
						.value_name("DIR")
						.help("Where downloaded files are written"),
				),
		)
}

/// Defaults, then config file, then DIRFETCH_* environment, then CLI flags
fn load_config(matches: &ArgMatches) -> Result<Config, FetchError> {
	let file = matches.get_one::<String>("config").map(PathBuf::from);
	let mut config = Config::load(file.as_deref())?;
	config.apply_env()?;
	apply_cli_overrides(&mut config, matches);
	config.validate()?;
	Ok(config)
}

fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) {
	if let Some(sub) = matches.subcommand_matches("serve") {
		if let Some(port) = sub.get_one::<u16>("port") {
			config.server.port = *port;
		}
		if let Some(bind) = sub.get_one::<String>("bind") {
			config.server.bind_address = bind.clone();
		}
		if let Some(root) = sub.get_one::<String>("root") {
			config.server.root = Some(PathBuf::from(root));
		}
	} else if let Some(sub) = matches.subcommand_matches("connect") {
		if let Some(port) = sub.get_one::<u16>("port") {
			config.client.port = *port;
		}
		if let Some(dir) = sub.get_one::<String>("download-dir") {
			config.client.download_dir = PathBuf::from(dir);
		}
	}
}

/// Canonical form of `dir`, which must exist and be a directory
fn existing_dir(dir: &Path, what: &str) -> Result<PathBuf, FetchError> {
	let canonical = fs::canonicalize(dir).map_err(|e| FetchError::InvalidArgument {
		message: format!("{} {}: {}", what, dir.display(), e),
	})?;
	if !canonical.is_dir() {
		return Err(FetchError::InvalidArgument {
			message: format!("{} {} is not a directory", what, dir.display()),
		});
	}
	Ok(canonical)
}

//////////////
// Commands //
//////////////

async fn serve(config: &Config) -> Result<(), FetchError> {
	let root = match &config.server.root {
		Some(root) => existing_dir(root, "Root directory")?,
		None => existing_dir(&env::current_dir()?, "Current directory")?,
	};
	let ip: IpAddr = config.server.bind_address.parse().map_err(|_| FetchError::InvalidArgument {
		message: format!("Not an IP address: {:?}", config.server.bind_address),
	})?;
	let addr = SocketAddr::new(ip, config.server.port);

	let supervisor = Supervisor::bind(addr, config.server_backlog(), config.server_limits(), root)?;
	let stats = supervisor.run_until(shutdown_signal()).await?;
	debug!("[server] final stats: {:?}", stats);
	Ok(())
}

async fn connect(host: &str, config: &Config) -> Result<(), FetchError> {
	let download_dir = existing_dir(&config.client.download_dir, "Download directory")?;
	let framer = connection::connect(host, config.client.port, config.client_limits()).await?;
	let session = ClientSession::new(framer, download_dir);
	let mut console = TerminalConsole::new();
	session.run_interactive(&mut console).await
}

async fn run(matches: &ArgMatches) -> Result<(), FetchError> {
	let config = load_config(matches)?;
	logging::init_tracing(&config.log_level);

	if matches.subcommand_matches("serve").is_some() {
		serve(&config).await
	} else if let Some(sub) = matches.subcommand_matches("connect") {
		let host = sub.get_one::<String>("hostname").ok_or_else(|| FetchError::InvalidArgument {
			message: "connect: hostname argument required".to_string(),
		})?;
		connect(host, &config).await
	} else {
		Err(FetchError::InvalidArgument { message: "no subcommand given".to_string() })
	}
}

#[tokio::main]
async fn main() {
	let mut cli = build_cli();
	let matches = cli.get_matches_mut();

	if let Err(e) = run(&matches).await {
		eprintln!("dirfetch: {}", e);
		if e.exit_code() == 2 {
			eprintln!();
			eprintln!("{}", cli.render_usage());
		}
		std::process::exit(e.exit_code());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cli_is_consistent() {
		build_cli().debug_assert();
	}

	#[test]
	fn test_port_argument_validation() {
		for bad in &["abc", "1024", "65535", "80x"] {
			let result = build_cli().try_get_matches_from(vec!["dirfetch", "serve", bad]);
			assert!(result.is_err(), "port {} should be rejected", bad);
		}
		for good in &["1025", "65534"] {
			let matches = build_cli().try_get_matches_from(vec!["dirfetch", "connect", "localhost", good]).unwrap();
			let sub = matches.subcommand_matches("connect").unwrap();
			assert_eq!(sub.get_one::<u16>("port").map(|p| p.to_string()), Some(good.to_string()));
		}
	}

	#[test]
	fn test_wrong_argument_count() {
		assert!(build_cli().try_get_matches_from(vec!["dirfetch", "connect"]).is_err());
		assert!(build_cli().try_get_matches_from(vec!["dirfetch", "serve", "5000", "extra"]).is_err());
	}

	#[test]
	fn test_cli_overrides_config() {
		let matches = build_cli()
			.try_get_matches_from(vec!["dirfetch", "serve", "50123", "--bind", "127.0.0.1"])
			.unwrap();
		let mut config = Config::default();
		config
			.apply_env_from(|key| match key {
				"DIRFETCH_PORT" => Some("40000".to_string()),
				_ => None,
			})
			.unwrap();
		assert_eq!(config.server.port, 40000);

		apply_cli_overrides(&mut config, &matches);
		config.validate().unwrap();
		assert_eq!(config.server.port, 50123);
		assert_eq!(config.server.bind_address, "127.0.0.1");
	}

	#[test]
	fn test_connect_overrides_leave_server_alone() {
		let matches = build_cli()
			.try_get_matches_from(vec!["dirfetch", "connect", "example.org", "50124", "--download-dir", "/tmp/in"])
			.unwrap();
		let mut config = Config::default();
		apply_cli_overrides(&mut config, &matches);
		assert_eq!(config.client.port, 50124);
		assert_eq!(config.client.download_dir, PathBuf::from("/tmp/in"));
		assert_eq!(config.server.port, Config::default().server.port);
		assert!(config.server.root.is_none());
	}
}

// vim: ts=4
