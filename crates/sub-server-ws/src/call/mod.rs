// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! One-shot backend calls.
//!
//! Each dispatched operation runs as its own task and posts exactly one
//! [`ControlMsg::CallCompleted`] back to the control loop. The loop only sends
//! the response if the call is still registered; cancelling a call removes the
//! registration and leaves the task to finish into the void.

mod shape;

use std::collections::HashMap;

use highweb_device::Capabilities;
pub use shape::prepare;

use crate::{
	CallId, ConnectionId,
	handler::{ControlMsg, ControlSender},
	operation::{Domain, Operation},
	response::{Response, WireError},
};

/// Registry of in-flight backend calls.
#[derive(Debug, Default)]
pub struct PendingCalls {
	live: HashMap<CallId, ConnectionId>,
	next_id: u64,
}

impl PendingCalls {
	pub fn new() -> Self {
		Self::default()
	}

	/// Issues `operation` against its backend.
	///
	/// The completed `response` carries the shaped value, or the domain's
	/// internal error when the backend is unbound.
	pub fn dispatch(
		&mut self,
		connection: ConnectionId,
		mut response: Response,
		domain: Domain,
		operation: Operation,
		capabilities: &Capabilities,
		control: &ControlSender,
	) -> CallId {
		self.next_id += 1;
		let call = CallId(self.next_id);
		self.live.insert(call, connection);

		match prepare(operation, capabilities) {
			Some(future) => {
				let control = control.clone();
				tokio::spawn(async move {
					let value = future.await;
					response.value = Some(value);
					let _ = control.send(ControlMsg::CallCompleted {
						call,
						response,
					});
				});
				tracing::trace!("{} dispatched for {}", call, connection);
			}
			None => {
				tracing::warn!("{:?} backend unbound, failing {}", domain, call);
				response.set_error(WireError::Internal(domain));
				let _ = control.send(ControlMsg::CallCompleted {
					call,
					response,
				});
			}
		}
		call
	}

	/// Unregisters `call`, returning its connection if it was still live.
	pub fn complete(&mut self, call: CallId) -> Option<ConnectionId> {
		self.live.remove(&call)
	}

	pub fn cancel_connection(&mut self, connection: ConnectionId) {
		self.live.retain(|_, owner| *owner != connection);
	}

	pub fn cancel_all(&mut self) {
		self.live.clear();
	}

	pub fn len(&self) -> usize {
		self.live.len()
	}

	pub fn is_empty(&self) -> bool {
		self.live.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use highweb_device::InMemoryDevice;
	use tokio::sync::mpsc;

	use super::*;

	const C1: ConnectionId = ConnectionId(1);
	const C2: ConnectionId = ConnectionId(2);

	async fn completed(rx: &mut mpsc::UnboundedReceiver<ControlMsg>) -> (CallId, Response) {
		match rx.recv().await {
			Some(ControlMsg::CallCompleted {
				call,
				response,
			}) => (call, response),
			other => panic!("expected a completion, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_completion_is_posted() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let capabilities = Capabilities::from_device(Arc::new(InMemoryDevice::new()));
		let mut calls = PendingCalls::new();

		let call =
			calls.dispatch(C1, Response::default(), Domain::AppLauncher, Operation::GetAppList, &capabilities, &tx);
		assert_eq!(calls.len(), 1);

		let (done, response) = completed(&mut rx).await;
		assert_eq!(done, call);
		assert_eq!(response.value.unwrap()["resultCode"], 0);
		assert_eq!(calls.complete(call), Some(C1));
		assert!(calls.is_empty());
	}

	#[tokio::test]
	async fn test_unbound_backend_fails_immediately() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut calls = PendingCalls::new();

		calls.dispatch(
			C1,
			Response::default(),
			Domain::AppLauncher,
			Operation::GetAppList,
			&Capabilities::new(),
			&tx,
		);

		let (_, response) = completed(&mut rx).await;
		assert_eq!(response.error.unwrap().reason, "appluancher_internal_error");
	}

	#[tokio::test]
	async fn test_cancelled_call_is_not_live() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let capabilities = Capabilities::from_device(Arc::new(InMemoryDevice::new()));
		let mut calls = PendingCalls::new();

		let first =
			calls.dispatch(C1, Response::default(), Domain::AppLauncher, Operation::GetAppList, &capabilities, &tx);
		let second =
			calls.dispatch(C2, Response::default(), Domain::AppLauncher, Operation::GetAppList, &capabilities, &tx);
		calls.cancel_connection(C1);

		completed(&mut rx).await;
		completed(&mut rx).await;
		assert_eq!(calls.complete(first), None);
		assert_eq!(calls.complete(second), Some(C2));
	}
}
