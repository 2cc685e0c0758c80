// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Request-token sessions.
//!
//! A successful `authorize` binds a `requestId` to the connection it arrived
//! on. Every other request must present a `requestId` bound to its own
//! connection, checked in both directions.

use std::collections::HashMap;

use crate::{ConnectionId, response::WireError};

/// Bidirectional `requestId` to connection binding.
///
/// Owned by the control loop; not shared across threads.
#[derive(Debug, Default)]
pub struct SessionRegistry {
	by_request: HashMap<String, ConnectionId>,
	by_connection: HashMap<ConnectionId, String>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `request_id` to `connection`.
	///
	/// Rejects an empty token or one that is already bound, to any
	/// connection. A connection re-authorizing with a fresh token takes the
	/// new binding; its old token keeps pointing at it but no longer passes
	/// the reverse check.
	pub fn authorize(&mut self, connection: ConnectionId, request_id: &str) -> Result<(), WireError> {
		if request_id.is_empty() || self.by_request.contains_key(request_id) {
			return Err(WireError::InvalidRegisterClient);
		}

		self.by_request.insert(request_id.to_string(), connection);
		self.by_connection.insert(connection, request_id.to_string());
		tracing::debug!("{} authorized", connection);
		Ok(())
	}

	pub fn is_authorized(&self, connection: ConnectionId, request_id: &str) -> bool {
		self.by_request.get(request_id) == Some(&connection)
			&& self.by_connection.get(&connection).map(String::as_str) == Some(request_id)
	}

	/// Drops every binding that points at `connection`.
	pub fn revoke(&mut self, connection: ConnectionId) {
		self.by_connection.remove(&connection);
		self.by_request.retain(|_, bound| *bound != connection);
	}

	pub fn clear(&mut self) {
		self.by_request.clear();
		self.by_connection.clear();
	}

	/// Number of authorized connections.
	pub fn len(&self) -> usize {
		self.by_connection.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_connection.is_empty()
	}
}
