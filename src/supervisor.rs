//! Connection supervisor
//!
//! Accepts TCP connections and hands each one to its own worker task running a
//! `ServerSession`. Finished workers are reaped from a `JoinSet` in the same
//! `select!` loop that accepts new connections, so reaping never waits for the
//! next client to arrive.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

use crate::error::FetchError;
use crate::logging::*;
use crate::protocol::framing::contains_terminator;
use crate::protocol::{FrameLimits, Framer, ProtocolResult, ServerSession, SessionSummary};

/// How one worker ended, as seen by the supervisor
#[derive(Debug)]
pub struct WorkerReport {
	pub id: u64,
	pub peer: SocketAddr,
	pub outcome: ProtocolResult<SessionSummary>,
}

/// Counters published while serving and returned when the supervisor stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
	pub accepted: u64,
	/// Workers whose session ended without error
	pub completed: u64,
	/// Workers that hit a protocol error or panicked
	pub failed: u64,
}

pub struct Supervisor {
	listener: TcpListener,
	limits: FrameLimits,
	root: PathBuf,
	workers: JoinSet<WorkerReport>,
	next_id: u64,
	stats: SupervisorStats,
	progress: watch::Sender<SupervisorStats>,
}

impl Supervisor {
	/// Bind and listen on `addr`; every session starts in `root`
	pub fn bind(addr: SocketAddr, backlog: u32, limits: FrameLimits, root: PathBuf) -> Result<Self, FetchError> {
		if contains_terminator(root.to_string_lossy().as_bytes()) {
			return Err(FetchError::InvalidArgument {
				message: format!("Root directory {} contains the message terminator", root.display()),
			});
		}
		let socket = (if addr.is_ipv4() { TcpSocket::new_v4() } else { TcpSocket::new_v6() })
			.map_err(|e| FetchError::transport("Cannot create socket", e))?;
		socket
			.set_reuseaddr(true)
			.map_err(|e| FetchError::transport("Cannot set SO_REUSEADDR", e))?;
		socket
			.bind(addr)
			.map_err(|e| FetchError::transport(format!("Cannot bind {}", addr), e))?;
		let listener = socket
			.listen(backlog)
			.map_err(|e| FetchError::transport(format!("Cannot listen on {}", addr), e))?;

		info!("[server] listening on {} (backlog {}), root {}", addr, backlog, root.display());
		Ok(Supervisor {
			listener,
			limits,
			root,
			workers: JoinSet::new(),
			next_id: 0,
			stats: SupervisorStats::default(),
			progress: watch::channel(SupervisorStats::default()).0,
		})
	}

	/// Actual bound address (useful after binding port 0)
	pub fn local_addr(&self) -> Result<SocketAddr, FetchError> {
		self.listener.local_addr().map_err(|e| FetchError::transport("Cannot read local address", e))
	}

	/// Number of workers still running
	pub fn outstanding(&self) -> usize {
		self.workers.len()
	}

	/// Live counters, updated after every accept and every reaped worker
	pub fn subscribe(&self) -> watch::Receiver<SupervisorStats> {
		self.progress.subscribe()
	}

	/// Serve until `shutdown` resolves, then drain the remaining workers
	pub async fn run_until<F>(mut self, shutdown: F) -> Result<SupervisorStats, FetchError>
	where
		F: Future<Output = ()>,
	{
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				_ = &mut shutdown => {
					info!("[server] shutdown requested, waiting for {} worker(s)", self.workers.len());
					break;
				}
				accepted = self.listener.accept() => match accepted {
					Ok((stream, peer)) => {
						self.spawn_worker(stream, peer);
						self.progress.send_replace(self.stats);
					}
					Err(e) => warn!("[server] accept failed: {}", e),
				},
				Some(joined) = self.workers.join_next(), if !self.workers.is_empty() => {
					Self::reap(&mut self.stats, self.workers.len(), joined);
					self.progress.send_replace(self.stats);
				}
			}
		}

		let Supervisor { listener, mut workers, mut stats, progress, .. } = self;
		drop(listener);
		while let Some(joined) = workers.join_next().await {
			Self::reap(&mut stats, workers.len(), joined);
			progress.send_replace(stats);
		}
		info!(
			"[server] stopped: {} accepted, {} completed, {} failed",
			stats.accepted, stats.completed, stats.failed
		);
		Ok(stats)
	}

	fn spawn_worker(&mut self, stream: TcpStream, peer: SocketAddr) {
		self.next_id += 1;
		self.stats.accepted += 1;
		let id = self.next_id;

		if let Err(e) = stream.set_nodelay(true) {
			debug!("[server] worker {}: cannot set TCP_NODELAY: {}", id, e);
		}

		let framer = Framer::new(stream, self.limits);
		let session = ServerSession::new(framer, self.root.clone(), peer.to_string());
		self.workers.spawn(async move {
			let outcome = session.run().await;
			WorkerReport { id, peer, outcome }
		});
		info!("[server] worker {} accepted {} ({} outstanding)", id, peer, self.workers.len());
	}

	fn reap(stats: &mut SupervisorStats, outstanding: usize, joined: Result<WorkerReport, JoinError>) {
		match joined {
			Ok(WorkerReport { id, peer, outcome: Ok(summary) }) => {
				stats.completed += 1;
				info!(
					"[server] worker {} ({}) finished: {} command(s), {} byte(s) sent, {} ({} outstanding)",
					id,
					peer,
					summary.commands_handled,
					summary.bytes_sent,
					if summary.clean_disconnect { "said bye" } else { "peer went away" },
					outstanding
				);
			}
			Ok(WorkerReport { id, peer, outcome: Err(e) }) => {
				stats.failed += 1;
				let kind = if e.is_transport() { "connection lost" } else { "protocol violation" };
				warn!(
					"[server] worker {} ({}) failed, {}: {} ({} outstanding)",
					id,
					peer,
					kind,
					e,
					outstanding
				);
			}
			Err(e) => {
				stats.failed += 1;
				error!("[server] worker task died: {} ({} outstanding)", e, outstanding);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_bind_ephemeral_port() {
		let dir = TempDir::new().unwrap();
		let supervisor = Supervisor::bind(
			"127.0.0.1:0".parse().unwrap(),
			16,
			FrameLimits::default(),
			dir.path().to_path_buf(),
		)
		.unwrap();
		assert_ne!(supervisor.local_addr().unwrap().port(), 0);
		assert_eq!(supervisor.outstanding(), 0);
	}

	#[tokio::test]
	async fn test_bind_conflict_is_transport_error() {
		let dir = TempDir::new().unwrap();
		let first = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = first.local_addr().unwrap();

		let err = Supervisor::bind(addr, 16, FrameLimits::default(), dir.path().to_path_buf())
			.err()
			.unwrap();
		assert!(matches!(err, FetchError::Transport { .. }));
		assert!(err.to_string().starts_with("Cannot"));
	}

	#[tokio::test]
	async fn test_root_with_terminator_is_refused() {
		let dir = TempDir::new().unwrap();
		let root = dir.path().join("odd:)root");
		std::fs::create_dir(&root).unwrap();

		let err = Supervisor::bind("127.0.0.1:0".parse().unwrap(), 16, FrameLimits::default(), root)
			.err()
			.unwrap();
		assert!(matches!(err, FetchError::InvalidArgument { .. }));
	}

	#[tokio::test]
	async fn test_immediate_shutdown() {
		let dir = TempDir::new().unwrap();
		let supervisor = Supervisor::bind(
			"127.0.0.1:0".parse().unwrap(),
			16,
			FrameLimits::default(),
			dir.path().to_path_buf(),
		)
		.unwrap();
		let stats = supervisor.run_until(async {}).await.unwrap();
		assert_eq!(stats, SupervisorStats::default());
	}

	#[tokio::test]
	async fn test_stats_are_published_while_serving() {
		use tokio::io::{AsyncReadExt, AsyncWriteExt};

		let dir = TempDir::new().unwrap();
		let supervisor = Supervisor::bind(
			"127.0.0.1:0".parse().unwrap(),
			16,
			FrameLimits::default(),
			dir.path().to_path_buf(),
		)
		.unwrap();
		let addr = supervisor.local_addr().unwrap();
		let mut progress = supervisor.subscribe();
		let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
		let server = tokio::spawn(supervisor.run_until(async {
			let _ = stopped.await;
		}));

		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream.write_all(b"bye:)").await.unwrap();
		let mut rest = Vec::new();
		stream.read_to_end(&mut rest).await.unwrap();
		assert!(rest.ends_with(b"Good Bye Client.:)"));

		let timeout = std::time::Duration::from_secs(5);
		let live = tokio::time::timeout(timeout, progress.wait_for(|s| s.completed == 1))
			.await
			.expect("worker was not reaped while serving")
			.map(|s| *s)
			.unwrap();
		assert_eq!(live, SupervisorStats { accepted: 1, completed: 1, failed: 0 });
		assert!(!server.is_finished());

		stop.send(()).unwrap();
		assert_eq!(server.await.unwrap().unwrap(), live);
	}
}

// vim: ts=4
