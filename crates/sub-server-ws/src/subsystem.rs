// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Device WebSocket subsystem.
//!
//! This module provides `DeviceWsSubsystem` which manages the lifecycle of the
//! WebSocket server, including startup, connection tracking, and graceful shutdown.

use std::{
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use highweb_device::Capabilities;
use parking_lot::RwLock;
use tokio::{
	net::TcpListener,
	runtime::Handle,
	sync::{Semaphore, mpsc, oneshot, watch},
	time::{Instant, sleep},
};

use crate::{
	config::WsConfig,
	error::{Error, Result},
	handler::{ControlMsg, ControlSender, DeviceHandler},
	transport::{Connections, configure_socket, handle_connection},
};

/// Health of the subsystem as reported to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Warning {
		description: String,
	},
	Failed {
		description: String,
	},
}

/// Device WebSocket server subsystem.
///
/// Manages a tokio-tungstenite WebSocket server with support for:
/// - Connection limiting via semaphore
/// - Graceful startup and shutdown
/// - Active connection tracking
/// - Late binding of capability backends
///
/// # Example
///
/// ```ignore
/// let device = Arc::new(InMemoryDevice::new());
/// let mut ws = DeviceWsSubsystem::new(
///     WsConfig::default(),
///     Capabilities::from_device(device),
///     Handle::current(),
/// );
///
/// ws.start().await?;
/// // Server is now accepting connections
///
/// ws.shutdown().await?;
/// // Handler torn down, connections drained
/// ```
pub struct DeviceWsSubsystem {
	config: WsConfig,
	/// Actual bound address (available after start).
	actual_addr: RwLock<Option<SocketAddr>>,
	/// Bundle handed to the control loop on start.
	capabilities: Capabilities,
	handle: Handle,
	running: Arc<AtomicBool>,
	active_connections: Arc<AtomicUsize>,
	shutdown_tx: Option<watch::Sender<bool>>,
	connection_semaphore: Arc<Semaphore>,
	connections: Arc<Connections>,
	control: Option<ControlSender>,
}

impl DeviceWsSubsystem {
	pub fn new(config: WsConfig, capabilities: Capabilities, handle: Handle) -> Self {
		let max_connections = config.max_connections;
		Self {
			config,
			actual_addr: RwLock::new(None),
			capabilities,
			handle,
			running: Arc::new(AtomicBool::new(false)),
			active_connections: Arc::new(AtomicUsize::new(0)),
			shutdown_tx: None,
			connection_semaphore: Arc::new(Semaphore::new(max_connections)),
			connections: Arc::new(Connections::new()),
			control: None,
		}
	}

	pub fn config(&self) -> &WsConfig {
		&self.config
	}

	/// Get the actual bound address (available after start).
	pub fn local_addr(&self) -> Option<SocketAddr> {
		*self.actual_addr.read()
	}

	/// Get the actual bound port (available after start).
	pub fn port(&self) -> Option<u16> {
		self.local_addr().map(|a| a.port())
	}

	pub fn active_connections(&self) -> usize {
		self.active_connections.load(Ordering::SeqCst)
	}

	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	/// Replaces the capability bundle. Takes effect for requests handled
	/// after this call; in-flight calls keep the backend they started with.
	pub fn set_capabilities(&mut self, capabilities: Capabilities) {
		self.capabilities = capabilities.clone();
		if let Some(control) = &self.control {
			let _ = control.send(ControlMsg::SetCapabilities(capabilities));
		}
	}

	pub async fn start(&mut self) -> Result<()> {
		// Idempotent: if already running, return success
		if self.running.load(Ordering::SeqCst) {
			return Ok(());
		}

		let addr = self.config.bind_addr.clone();
		let listener = TcpListener::bind(&addr).await.map_err(|source| Error::Bind {
			addr: addr.clone(),
			source,
		})?;

		let actual_addr = listener.local_addr().map_err(Error::LocalAddr)?;
		*self.actual_addr.write() = Some(actual_addr);
		tracing::info!("Device WebSocket server bound to {}", actual_addr);

		let (control, control_rx) = mpsc::unbounded_channel();
		let handler =
			DeviceHandler::new(self.capabilities.clone(), self.connections.clone(), control.clone(), self.config.workers());
		self.handle.spawn(handler.run(control_rx));
		self.connections.enable();

		let (tx, mut rx) = watch::channel(false);
		let running = self.running.clone();
		let active_connections = self.active_connections.clone();
		let semaphore = self.connection_semaphore.clone();
		let connections = self.connections.clone();
		let accept_control = control.clone();
		let send_buffer_size = self.config.send_buffer_size;
		let handle = self.handle.clone();

		running.store(true, Ordering::SeqCst);
		self.handle.spawn(async move {
			loop {
				tokio::select! {
					biased;

					// Check shutdown first
					result = rx.changed() => {
						if result.is_err() || *rx.borrow() {
							tracing::info!("Device WebSocket server shutting down");
							break;
						}
					}

					accept = listener.accept() => {
						match accept {
							Ok((stream, peer)) => {
								let permit = match semaphore.clone().try_acquire_owned() {
									Ok(p) => p,
									Err(_) => {
										tracing::warn!("Connection limit reached, rejecting {}", peer);
										continue;
									}
								};

								configure_socket(&stream, send_buffer_size);

								let connections = connections.clone();
								let control = accept_control.clone();
								let shutdown_rx = rx.clone();
								let active = active_connections.clone();

								active.fetch_add(1, Ordering::SeqCst);
								tracing::debug!("Accepted connection from {}", peer);

								handle.spawn(async move {
									handle_connection(stream, peer, &connections, control, shutdown_rx).await;
									active.fetch_sub(1, Ordering::SeqCst);
									drop(permit);
								});
							}
							Err(e) => {
								tracing::warn!("Accept error: {}", e);
							}
						}
					}
				}
			}

			running.store(false, Ordering::SeqCst);
			tracing::info!("Device WebSocket server stopped");
		});

		self.shutdown_tx = Some(tx);
		self.control = Some(control);
		Ok(())
	}

	/// Tears the handler down, stops accepting and waits for connections to
	/// drain. A no-op when not started.
	pub async fn shutdown(&mut self) -> Result<()> {
		if let Some(control) = self.control.take() {
			let (ack_tx, ack_rx) = oneshot::channel();
			if control.send(ControlMsg::Shutdown(ack_tx)).is_ok() {
				let _ = ack_rx.await;
			}
		}

		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(true);
		}

		let active = self.active_connections.clone();
		let deadline = Instant::now() + self.config.shutdown_timeout;
		while active.load(Ordering::SeqCst) > 0 {
			if Instant::now() > deadline {
				tracing::warn!(
					"Device WebSocket shutdown timeout with {} connections still active",
					active.load(Ordering::SeqCst)
				);
				break;
			}
			sleep(Duration::from_millis(10)).await;
		}

		self.connections.disable();
		self.running.store(false, Ordering::SeqCst);
		tracing::debug!("Device WebSocket shutdown completed");
		Ok(())
	}

	pub fn health_status(&self) -> HealthStatus {
		if self.running.load(Ordering::SeqCst) {
			let active = self.active_connections.load(Ordering::SeqCst);
			let max = self.config.max_connections;

			// Warn if connections are at 90% capacity
			if active > max * 90 / 100 {
				HealthStatus::Warning {
					description: format!("High connection count: {}/{}", active, max),
				}
			} else {
				HealthStatus::Healthy
			}
		} else {
			HealthStatus::Failed {
				description: "Not running".to_string(),
			}
		}
	}
}

impl Drop for DeviceWsSubsystem {
	fn drop(&mut self) {
		if let Some(control) = self.control.take() {
			// nobody waits for the acknowledgement here
			let (ack, _) = oneshot::channel();
			let _ = control.send(ControlMsg::Shutdown(ack));
		}
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(true);
		}
	}
}
