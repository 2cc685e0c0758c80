// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
	#[default]
	Sms,
	Mms,
}

/// A stored or received message. `date` is milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
	pub id: String,
	#[serde(rename = "type")]
	pub r#type: MessageType,
	pub from: String,
	pub to: Vec<String>,
	pub body: String,
	pub date: u64,
}

/// A message submitted for sending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingMessage {
	#[serde(rename = "type")]
	pub r#type: MessageType,
	pub to: Vec<String>,
	pub body: String,
}

/// Lookup by field. `target` is one of `from`, `to`, `body`; empty matches all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageQuery {
	pub target: String,
	pub value: String,
}

impl MessageQuery {
	pub fn matches(&self, message: &Message) -> bool {
		let value = self.value.as_str();
		match self.target.as_str() {
			"" => true,
			"from" => message.from.contains(value),
			"to" => message.to.iter().any(|t| t.contains(value)),
			"body" => message.body.contains(value),
			_ => false,
		}
	}
}

/// Callback invoked by the backend for every arriving message.
pub type MessageListener = Arc<dyn Fn(Message) + Send + Sync>;

#[async_trait]
pub trait Messaging: Send + Sync {
	async fn find_messages(&self, query: &MessageQuery) -> CapabilityResult<Vec<Message>>;

	/// Queues a message for delivery and returns its id.
	async fn send_message(&self, message: OutgoingMessage) -> CapabilityResult<String>;

	/// Installs the arrival listener, replacing any previous one.
	fn add_listener(&self, listener: MessageListener);

	fn remove_listener(&self);
}
