// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The control loop.
//!
//! One task owns every piece of mutable handler state: sessions, in-flight
//! calls, subscriptions and the capability bundle. Transport tasks, backend
//! calls and subscription workers talk to it only by posting [`ControlMsg`]s,
//! and every outbound frame leaves through [`DeviceHandler::send`].

use std::{collections::HashSet, sync::Arc};

use highweb_device::{Capabilities, Message};
use tokio::sync::{mpsc, oneshot};

use crate::{
	CallId, ConnectionId, SubscriptionId,
	call::PendingCalls,
	response::{Response, WireError},
	router::{Routed, route},
	session::SessionRegistry,
	subscription::{Subscription, SubscriptionEvent, SubscriptionRegistry, SubscriptionState, WorkerConfig},
	transport::FrameSink,
};

pub type ControlSender = mpsc::UnboundedSender<ControlMsg>;

#[derive(Debug)]
pub enum ControlMsg {
	Opened(ConnectionId),
	Text(ConnectionId, String),
	Closed(ConnectionId),
	CallCompleted {
		call: CallId,
		response: Response,
	},
	Notify {
		subscription: SubscriptionId,
		event: SubscriptionEvent,
	},
	MessageArrived(Message),
	SetCapabilities(Capabilities),
	/// Tears everything down, acknowledges, and ends the loop.
	Shutdown(oneshot::Sender<()>),
}

/// What the loop does after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Stop,
}

pub struct DeviceHandler {
	sessions: SessionRegistry,
	calls: PendingCalls,
	subscriptions: SubscriptionRegistry,
	capabilities: Capabilities,
	open: HashSet<ConnectionId>,
	sink: Arc<dyn FrameSink>,
	/// Weak so the loop ends once every outside sender is gone.
	control: mpsc::WeakUnboundedSender<ControlMsg>,
}

impl DeviceHandler {
	/// `control` must feed the receiver later passed to [`run`](Self::run).
	pub fn new(
		capabilities: Capabilities,
		sink: Arc<dyn FrameSink>,
		control: ControlSender,
		workers: WorkerConfig,
	) -> Self {
		Self {
			sessions: SessionRegistry::new(),
			calls: PendingCalls::new(),
			subscriptions: SubscriptionRegistry::new(workers),
			capabilities,
			open: HashSet::new(),
			sink,
			control: control.downgrade(),
		}
	}

	/// Creates the control channel and spawns the loop on the current runtime.
	pub fn spawn(capabilities: Capabilities, sink: Arc<dyn FrameSink>, workers: WorkerConfig) -> ControlSender {
		let (control, rx) = mpsc::unbounded_channel();
		let handler = Self::new(capabilities, sink, control.clone(), workers);
		tokio::spawn(handler.run(rx));
		control
	}

	pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ControlMsg>) {
		tracing::debug!("Device handler started");
		loop {
			let Some(msg) = rx.recv().await else {
				// every sender dropped without a shutdown request
				self.shutdown();
				break;
			};
			if self.handle(msg) == Flow::Stop {
				break;
			}
		}
		tracing::debug!("Device handler stopped");
	}

	pub fn handle(&mut self, msg: ControlMsg) -> Flow {
		match msg {
			ControlMsg::Opened(connection) => {
				self.open.insert(connection);
			}
			ControlMsg::Text(connection, text) => self.on_text(connection, &text),
			ControlMsg::Closed(connection) => self.on_closed(connection),
			ControlMsg::CallCompleted {
				call,
				response,
			} => match self.calls.complete(call) {
				Some(connection) => self.send(connection, response),
				None => tracing::trace!("{} completed after cancellation", call),
			},
			ControlMsg::Notify {
				subscription,
				event,
			} => self.on_notify(subscription, event),
			ControlMsg::MessageArrived(message) => self.subscriptions.deliver_message(message),
			ControlMsg::SetCapabilities(capabilities) => {
				tracing::info!("Capabilities updated: {:?}", capabilities);
				self.capabilities = capabilities;
				if let Some(control) = self.control.upgrade() {
					self.subscriptions.rebind_listener(&self.capabilities, &control);
				}
			}
			ControlMsg::Shutdown(ack) => {
				self.shutdown();
				let _ = ack.send(());
				return Flow::Stop;
			}
		}
		Flow::Continue
	}

	/// The single send path. Stamps the timestamp on the way out.
	fn send(&self, connection: ConnectionId, mut response: Response) {
		response.stamp();
		self.sink.send(connection, response.to_json());
	}

	fn on_text(&mut self, connection: ConnectionId, text: &str) {
		match route(&mut self.sessions, connection, text) {
			Routed::Reply(response) => self.send(connection, response),
			Routed::Call {
				response,
				domain,
				operation,
			} => {
				let Some(control) = self.control.upgrade() else {
					tracing::debug!("Control channel closed, dropping call from {}", connection);
					return;
				};
				self.calls.dispatch(connection, response, domain, operation, &self.capabilities, &control);
			}
			Routed::Subscribe {
				mut response,
				request,
			} => {
				let Some(control) = self.control.upgrade() else {
					tracing::debug!("Control channel closed, dropping subscribe from {}", connection);
					return;
				};
				let filters = request.filters_echo.clone();
				match self.subscriptions.subscribe(connection, request, &self.capabilities, &control) {
					Ok(id) => {
						response.path = None;
						response.subscription_id = Some(id);
					}
					Err(error) => {
						response.filters = filters;
						response.set_error(error);
					}
				}
				self.send(connection, response);
			}
			Routed::Unsubscribe {
				mut response,
				subscription,
			} => {
				response.subscription_id = Some(subscription);
				if let Err(error) = self.subscriptions.unsubscribe(connection, subscription) {
					response.set_error(error);
				}
				self.send(connection, response);
			}
			Routed::UnsubscribeAll {
				response,
			} => {
				self.subscriptions.unsubscribe_all(connection);
				self.send(connection, response);
			}
		}
	}

	fn on_closed(&mut self, connection: ConnectionId) {
		self.open.remove(&connection);
		self.sessions.revoke(connection);
		self.calls.cancel_connection(connection);
		self.subscriptions.unsubscribe_all(connection);
	}

	fn on_notify(&mut self, id: SubscriptionId, event: SubscriptionEvent) {
		let (connection, response) = match event {
			SubscriptionEvent::Value(value) => {
				let Some(subscription) = self.subscriptions.get(id) else {
					tracing::trace!("Notification for removed {}", id);
					return;
				};
				if subscription.state != SubscriptionState::Running {
					return;
				}
				(subscription.connection, push(subscription).with_value(value))
			}
			SubscriptionEvent::Failed(code) => {
				let Some(subscription) = self.subscriptions.fail(id) else {
					return;
				};
				tracing::warn!("{} backend failed with {}", id, code);
				let mut response = push(subscription).with_error(WireError::Internal(subscription.kind.domain()));
				response.filters = subscription.filters.clone();
				(subscription.connection, response)
			}
		};
		self.send(connection, response);
	}

	/// Connections first, then calls, then subscriptions, then backends.
	fn shutdown(&mut self) {
		tracing::info!("Device handler shutting down with {} open connections", self.open.len());
		for connection in self.open.drain() {
			self.sink.close(connection);
		}
		self.sessions.clear();
		self.calls.cancel_all();
		self.subscriptions.stop_all();
		self.capabilities = Capabilities::new();
	}
}

fn push(subscription: &Subscription) -> Response {
	Response {
		action: Some("subscribe".to_string()),
		path: Some(subscription.path.clone()),
		request_id: subscription.request_id.clone(),
		subscription_id: Some(subscription.id),
		..Default::default()
	}
}
