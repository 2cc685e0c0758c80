// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subscription registry for tracking live device subscriptions.
//!
//! The registry maintains mappings between subscription ids, connections and
//! subscription kinds, and owns the stop signal of every worker. It lives on
//! the control loop and is never shared across threads.

use std::{collections::HashMap, sync::Arc, time::Duration};

use highweb_device::{Capabilities, Message, MessageListener, Messaging};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use super::worker;
use crate::{
	ConnectionId, SubscriptionId,
	handler::{ControlMsg, ControlSender},
	operation::SubscriptionKind,
	response::WireError,
	router::SubscribeRequest,
};

/// Subscriptions start `Running`: creation and worker start are one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
	Running,
	Stopped,
	Error,
}

/// Sampling cadences for value-producing workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
	pub cpu_sample_period: Duration,
	pub proximity_poll_period: Duration,
}

/// A live subscription.
#[derive(Debug)]
pub struct Subscription {
	pub id: SubscriptionId,
	pub connection: ConnectionId,
	pub kind: SubscriptionKind,
	pub path: String,
	pub request_id: Option<String>,
	pub filters: Option<Value>,
	pub state: SubscriptionState,
	stop: watch::Sender<bool>,
	inbox: Option<mpsc::UnboundedSender<Message>>,
}

impl Subscription {
	fn stop(&mut self) {
		let _ = self.stop.send(true);
		if self.state == SubscriptionState::Running {
			self.state = SubscriptionState::Stopped;
		}
	}
}

/// Registry tracking subscriptions across all connections.
pub struct SubscriptionRegistry {
	/// subscription id → subscription
	subscriptions: HashMap<SubscriptionId, Subscription>,
	/// connection id → subscription ids (for cleanup on disconnect)
	connections: HashMap<ConnectionId, Vec<SubscriptionId>>,
	/// kind → subscription ids
	by_kind: HashMap<SubscriptionKind, Vec<SubscriptionId>>,
	/// Backend holding the shared message listener, while one is installed.
	listening: Option<Arc<dyn Messaging>>,
	next_id: u64,
	config: WorkerConfig,
}

impl SubscriptionRegistry {
	pub fn new(config: WorkerConfig) -> Self {
		Self {
			subscriptions: HashMap::new(),
			connections: HashMap::new(),
			by_kind: HashMap::new(),
			listening: None,
			next_id: 0,
			config,
		}
	}

	/// Creates a subscription and starts its worker.
	///
	/// Fails with the domain's internal error, creating nothing, when the
	/// backend for `request.kind` is unbound.
	pub fn subscribe(
		&mut self,
		connection: ConnectionId,
		request: SubscribeRequest,
		capabilities: &Capabilities,
		control: &ControlSender,
	) -> Result<SubscriptionId, WireError> {
		let unbound = WireError::Internal(request.kind.domain());
		let (stop_tx, stop_rx) = watch::channel(false);
		let id = SubscriptionId(self.next_id + 1);
		let mut inbox = None;

		match request.kind {
			SubscriptionKind::Cpu => {
				let backend = capabilities.cpu.clone().ok_or(unbound)?;
				worker::spawn_cpu(
					id,
					backend,
					self.config.cpu_sample_period,
					request.filter,
					control.clone(),
					stop_rx,
				);
			}
			SubscriptionKind::Proximity => {
				let backend = capabilities.proximity.clone().ok_or(unbound)?;
				worker::spawn_proximity(
					id,
					backend,
					self.config.proximity_poll_period,
					request.filter,
					control.clone(),
					stop_rx,
				);
			}
			SubscriptionKind::Message => {
				let backend = capabilities.messaging.clone().ok_or(unbound)?;
				self.ensure_listener(backend, control);
				let (tx, rx) = mpsc::unbounded_channel();
				inbox = Some(tx);
				worker::spawn_message(id, rx, request.filter, control.clone(), stop_rx);
			}
		}
		self.next_id += 1;

		self.subscriptions.insert(
			id,
			Subscription {
				id,
				connection,
				kind: request.kind,
				path: request.path,
				request_id: request.request_id,
				filters: request.filters_echo,
				state: SubscriptionState::Running,
				stop: stop_tx,
				inbox,
			},
		);
		self.connections.entry(connection).or_default().push(id);
		self.by_kind.entry(request.kind).or_default().push(id);

		tracing::debug!("Registered {:?} subscription {} for {}", request.kind, id, connection);
		Ok(id)
	}

	fn ensure_listener(&mut self, backend: Arc<dyn Messaging>, control: &ControlSender) {
		if self.listening.is_some() {
			return;
		}
		let control = control.clone();
		let listener: MessageListener = Arc::new(move |message| {
			let _ = control.send(ControlMsg::MessageArrived(message));
		});
		backend.add_listener(listener);
		self.listening = Some(backend);
		tracing::debug!("Message listener installed");
	}

	fn release_listener_if_unused(&mut self) {
		if self.has_message_subscriptions() {
			return;
		}
		if let Some(backend) = self.listening.take() {
			backend.remove_listener();
			tracing::debug!("Message listener released");
		}
	}

	/// Moves the shared message listener onto the messaging backend of
	/// `capabilities`. Live message subscriptions keep their ids and inboxes.
	pub fn rebind_listener(&mut self, capabilities: &Capabilities, control: &ControlSender) {
		if let Some(previous) = self.listening.take() {
			previous.remove_listener();
		}
		if !self.has_message_subscriptions() {
			return;
		}
		match capabilities.messaging.clone() {
			Some(backend) => self.ensure_listener(backend, control),
			None => tracing::warn!("Messaging unbound, message subscriptions receive nothing"),
		}
	}

	fn has_message_subscriptions(&self) -> bool {
		self.by_kind.get(&SubscriptionKind::Message).is_some_and(|ids| !ids.is_empty())
	}

	/// Fans an arrived message out to every message subscription's queue.
	pub fn deliver_message(&self, message: Message) {
		let Some(ids) = self.by_kind.get(&SubscriptionKind::Message) else {
			return;
		};
		for id in ids {
			if let Some(inbox) = self.subscriptions.get(id).and_then(|s| s.inbox.as_ref()) {
				let _ = inbox.send(message.clone());
			}
		}
	}

	pub fn get(&self, id: SubscriptionId) -> Option<&Subscription> {
		self.subscriptions.get(&id)
	}

	/// Marks a subscription whose backend failed. It stays indexed until
	/// unsubscribed or its connection closes.
	pub fn fail(&mut self, id: SubscriptionId) -> Option<&Subscription> {
		let subscription = self.subscriptions.get_mut(&id)?;
		subscription.stop();
		subscription.state = SubscriptionState::Error;
		Some(subscription)
	}

	/// Removes one subscription owned by `connection`.
	pub fn unsubscribe(&mut self, connection: ConnectionId, id: SubscriptionId) -> Result<(), WireError> {
		match self.subscriptions.get(&id) {
			Some(subscription) if subscription.connection == connection => {}
			_ => return Err(WireError::InvalidSubscriptionId),
		}
		self.remove(id);
		if let Some(ids) = self.connections.get_mut(&connection) {
			ids.retain(|other| *other != id);
			if ids.is_empty() {
				self.connections.remove(&connection);
			}
		}
		self.release_listener_if_unused();
		Ok(())
	}

	/// Removes every subscription of `connection`, returning how many.
	pub fn unsubscribe_all(&mut self, connection: ConnectionId) -> usize {
		let Some(ids) = self.connections.remove(&connection) else {
			return 0;
		};
		for id in &ids {
			self.remove(*id);
		}
		self.release_listener_if_unused();
		tracing::debug!("Cleaned up {} subscriptions for {}", ids.len(), connection);
		ids.len()
	}

	/// Stops every worker and drops all subscriptions.
	pub fn stop_all(&mut self) {
		for subscription in self.subscriptions.values_mut() {
			subscription.stop();
		}
		self.subscriptions.clear();
		self.connections.clear();
		self.by_kind.clear();
		self.release_listener_if_unused();
	}

	fn remove(&mut self, id: SubscriptionId) {
		let Some(mut subscription) = self.subscriptions.remove(&id) else {
			return;
		};
		subscription.stop();
		if let Some(ids) = self.by_kind.get_mut(&subscription.kind) {
			ids.retain(|other| *other != id);
		}
		tracing::debug!("Unsubscribed {}", id);
	}

	/// Subscription ids of `connection`, oldest first.
	pub fn subscriptions_of(&self, connection: ConnectionId) -> &[SubscriptionId] {
		self.connections.get(&connection).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn subscription_count(&self) -> usize {
		self.subscriptions.len()
	}

	pub fn connection_count(&self) -> usize {
		self.connections.len()
	}

	pub fn is_listening(&self) -> bool {
		self.listening.is_some()
	}
}
