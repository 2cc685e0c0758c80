// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wire response types.
//!
//! Every frame the handler sends is a [`Response`]. Failures travel as data in
//! its `error` block; nothing is thrown across the async boundary.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::{SubscriptionId, operation::Domain, protocol::Request};

/// The error block of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
	pub number: String,
	pub reason: String,
	pub message: String,
}

/// Fixed error taxonomy of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
	#[error("The requested path is not supported")]
	InvalidPath,
	#[error("The requested action is not supported")]
	InvalidAction,
	#[error("The request could not be parsed")]
	BadRequest,
	#[error("The requestId is not registered for this client")]
	Unauthorized,
	#[error("The requestId is empty or already registered")]
	InvalidRegisterClient,
	#[error("The subscriptionId does not refer to a live subscription")]
	InvalidSubscriptionId,
	#[error("Internal error occurred in the device backend")]
	Internal(Domain),
}

impl WireError {
	pub fn number(&self) -> &'static str {
		match self {
			WireError::InvalidPath | WireError::InvalidAction | WireError::InvalidSubscriptionId => "404",
			WireError::BadRequest => "400",
			WireError::Unauthorized | WireError::InvalidRegisterClient => "401",
			WireError::Internal(_) => "500",
		}
	}

	pub fn reason(&self) -> &'static str {
		match self {
			WireError::InvalidPath => "invalid_path",
			WireError::InvalidAction => "invalid_action",
			WireError::BadRequest => "bad_request",
			WireError::Unauthorized => "invalid_requestId_or_client",
			WireError::InvalidRegisterClient => "unregistered_client",
			WireError::InvalidSubscriptionId => "invalid_subscriptionId",
			WireError::Internal(domain) => domain.internal_error_reason(),
		}
	}

	pub fn body(&self) -> ErrorBody {
		ErrorBody {
			number: self.number().to_string(),
			reason: self.reason().to_string(),
			message: self.to_string(),
		}
	}
}

/// A response or push frame.
///
/// `value` distinguishes "absent" (`None`, not serialized) from an explicit
/// JSON `null` (`Some(Value::Null)`), which message pushes use for an empty
/// batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub action: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subscription_id: Option<SubscriptionId>,
	pub timestamp: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filters: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorBody>,
}

impl Response {
	/// A skeleton echoing the request's `action`, `path` and `requestId`.
	pub fn for_request(request: &Request) -> Self {
		Self {
			action: request.action.clone(),
			path: request.path.clone(),
			request_id: request.request_id.clone(),
			..Default::default()
		}
	}

	pub fn with_error(mut self, error: WireError) -> Self {
		self.set_error(error);
		self
	}

	pub fn set_error(&mut self, error: WireError) {
		self.error = Some(error.body());
	}

	pub fn with_value(mut self, value: Value) -> Self {
		self.value = Some(value);
		self
	}

	/// Stamps the current time in milliseconds since the epoch.
	pub fn stamp(&mut self) {
		self.timestamp = now_millis().to_string();
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	pub fn to_json(&self) -> String {
		// Response holds only strings, numbers and serde_json values
		serde_json::to_string(self).unwrap_or_default()
	}
}

pub fn now_millis() -> u128 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}
