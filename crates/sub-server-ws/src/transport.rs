// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket connection I/O.
//!
//! Each accepted socket runs one task that owns both halves of the stream.
//! Inbound frames are posted to the control loop; outbound frames arrive
//! through the connection's entry in [`Connections`].

use std::{
	net::SocketAddr,
	sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use socket2::SockRef;
use tokio::{
	net::TcpStream,
	sync::{mpsc, watch},
};
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::{
	ConnectionId,
	handler::{ControlMsg, ControlSender},
};

/// Outbound side of the transport as seen by the control loop.
pub trait FrameSink: Send + Sync {
	/// Best-effort send; silently dropped when the connection is gone.
	fn send(&self, connection: ConnectionId, frame: String);

	/// Sends a close frame and ends the connection.
	fn close(&self, connection: ConnectionId);
}

#[derive(Debug)]
enum Outgoing {
	Frame(String),
	Close,
}

/// Live connections and their outbound queues.
#[derive(Debug)]
pub struct Connections {
	senders: DashMap<ConnectionId, mpsc::UnboundedSender<Outgoing>>,
	enabled: AtomicBool,
	next_id: AtomicU64,
}

impl Connections {
	pub fn new() -> Self {
		Self {
			senders: DashMap::new(),
			enabled: AtomicBool::new(false),
			next_id: AtomicU64::new(1),
		}
	}

	pub fn enable(&self) {
		self.enabled.store(true, Ordering::SeqCst);
	}

	/// Turns every further send into a no-op.
	pub fn disable(&self) {
		self.enabled.store(false, Ordering::SeqCst);
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::SeqCst)
	}

	fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Outgoing>) {
		let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let (tx, rx) = mpsc::unbounded_channel();
		self.senders.insert(id, tx);
		(id, rx)
	}

	fn unregister(&self, connection: ConnectionId) {
		self.senders.remove(&connection);
	}

	pub fn len(&self) -> usize {
		self.senders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.senders.is_empty()
	}
}

impl Default for Connections {
	fn default() -> Self {
		Self::new()
	}
}

impl FrameSink for Connections {
	fn send(&self, connection: ConnectionId, frame: String) {
		if !self.is_enabled() {
			tracing::trace!("transport disabled, dropping frame for {}", connection);
			return;
		}
		match self.senders.get(&connection) {
			Some(sender) => {
				let _ = sender.send(Outgoing::Frame(frame));
			}
			None => tracing::trace!("{} is gone, dropping frame", connection),
		}
	}

	fn close(&self, connection: ConnectionId) {
		if let Some((_, sender)) = self.senders.remove(&connection) {
			let _ = sender.send(Outgoing::Close);
		}
	}
}

/// Applies the configured `SO_SNDBUF`. Failure only costs throughput.
pub(crate) fn configure_socket(stream: &TcpStream, send_buffer_size: usize) {
	if let Err(e) = SockRef::from(stream).set_send_buffer_size(send_buffer_size) {
		tracing::warn!("Failed to set send buffer size to {}: {}", send_buffer_size, e);
	}
}

/// Runs one WebSocket connection until either side closes it or the server
/// shuts down.
pub(crate) async fn handle_connection(
	stream: TcpStream,
	peer: SocketAddr,
	connections: &Connections,
	control: ControlSender,
	mut shutdown: watch::Receiver<bool>,
) {
	let ws = match accept_async(stream).await {
		Ok(ws) => ws,
		Err(e) => {
			tracing::debug!("WebSocket handshake with {} failed: {}", peer, e);
			return;
		}
	};

	let (id, mut outgoing) = connections.register();
	tracing::debug!("{} opened from {}", id, peer);
	if control.send(ControlMsg::Opened(id)).is_err() {
		connections.unregister(id);
		return;
	}

	let (mut sink, mut source) = ws.split();

	loop {
		tokio::select! {
			biased;

			result = shutdown.changed() => {
				if result.is_err() || *shutdown.borrow() {
					let _ = sink.send(Message::Close(None)).await;
					break;
				}
			}

			out = outgoing.recv() => match out {
				Some(Outgoing::Frame(text)) => {
					if let Err(e) = sink.send(Message::Text(text.into())).await {
						tracing::debug!("{} write failed: {}", id, e);
						break;
					}
				}
				Some(Outgoing::Close) | None => {
					let _ = sink.send(Message::Close(None)).await;
					break;
				}
			},

			incoming = source.next() => match incoming {
				Some(Ok(Message::Text(text))) => {
					if control.send(ControlMsg::Text(id, text.as_str().to_owned())).is_err() {
						break;
					}
				}
				Some(Ok(Message::Binary(data))) => {
					tracing::debug!("{} sent {} byte binary frame, ignored", id, data.len());
				}
				Some(Ok(Message::Close(_))) | None => break,
				// pings are answered by the protocol layer on the next flush
				Some(Ok(_)) => {}
				Some(Err(e)) => {
					tracing::debug!("{} read failed: {}", id, e);
					break;
				}
			},
		}
	}

	connections.unregister(id);
	let _ = control.send(ControlMsg::Closed(id));
	tracing::debug!("{} closed", id);
}
