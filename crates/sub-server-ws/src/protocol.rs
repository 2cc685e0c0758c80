// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket request types for the protocol layer.
//!
//! Requests are single JSON objects:
//!
//! ```json
//! {
//!   "action": "get",
//!   "path": "highweb.applauncher.getapplist",
//!   "requestId": "r1",
//!   "extra": { ... },
//!   "filters": { ... },
//!   "subscriptionId": 7
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::SubscriptionId;

/// An inbound request, validated for shape at the parse boundary.
///
/// Every field is optional here so that a request missing `action` can still
/// echo its `requestId` and `path` in the `bad_request` reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	pub action: Option<String>,
	pub path: Option<String>,
	pub request_id: Option<String>,
	pub extra: Option<Value>,
	pub filters: Option<Value>,
	pub subscription_id: Option<Value>,
}

impl Request {
	/// Parses one request. Only a JSON object is a request; arrays and
	/// scalars are rejected even when their elements would line up.
	pub fn parse(text: &str) -> serde_json::Result<Self> {
		match serde_json::from_str::<Value>(text)? {
			value @ Value::Object(_) => serde_json::from_value(value),
			_ => Err(serde::de::Error::custom("request must be a JSON object")),
		}
	}

	/// The `subscriptionId` field coerced to an id.
	///
	/// Accepts a decimal string, an integer or a double. Anything missing,
	/// negative or unparseable becomes id `0`, which is never issued.
	pub fn subscription_id(&self) -> SubscriptionId {
		SubscriptionId(coerce_u64(self.subscription_id.as_ref()))
	}
}

fn coerce_u64(value: Option<&Value>) -> u64 {
	fn from_f64(f: f64) -> Option<u64> {
		(f.is_finite() && f >= 0.0).then_some(f as u64)
	}

	match value {
		Some(Value::String(s)) => {
			let s = s.trim();
			s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().and_then(from_f64)).unwrap_or(0)
		}
		Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(from_f64)).unwrap_or(0),
		_ => 0,
	}
}

/// Splits a dotted path into its segments.
///
/// Returns `None` for an empty path or one ending in a dot.
pub fn split_path(path: &str) -> Option<Vec<&str>> {
	if path.is_empty() || path.ends_with('.') {
		return None;
	}
	Some(path.split('.').collect())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_parse_full_request() {
		let request = Request::parse(
			r#"{"action":"get","path":"highweb.applauncher.getapplist","requestId":"r1","extra":{"appId":"x"}}"#,
		)
		.unwrap();
		assert_eq!(request.action.as_deref(), Some("get"));
		assert_eq!(request.path.as_deref(), Some("highweb.applauncher.getapplist"));
		assert_eq!(request.request_id.as_deref(), Some("r1"));
		assert_eq!(request.extra, Some(json!({"appId": "x"})));
	}

	#[test]
	fn test_parse_rejects_malformed() {
		assert!(Request::parse("not json").is_err());
		assert!(Request::parse(r#"{"action": 5}"#).is_err());
		assert!(Request::parse("[1,2]").is_err());
		assert!(Request::parse("\"authorize\"").is_err());
		assert!(Request::parse("null").is_err());
	}

	#[test]
	fn test_parse_rejects_positional_array() {
		// lines up with the field order of Request
		assert!(Request::parse(r#"["authorize",null,"r1",null,null,null]"#).is_err());
	}

	#[test]
	fn test_missing_action_still_parses() {
		let request = Request::parse(r#"{"requestId":"r1"}"#).unwrap();
		assert!(request.action.is_none());
	}

	#[test]
	fn test_subscription_id_coercion() {
		let with = |value: Value| Request {
			subscription_id: Some(value),
			..Default::default()
		};

		assert_eq!(with(json!("42")).subscription_id(), SubscriptionId(42));
		assert_eq!(with(json!(" 42 ")).subscription_id(), SubscriptionId(42));
		assert_eq!(with(json!(42)).subscription_id(), SubscriptionId(42));
		assert_eq!(with(json!(42.9)).subscription_id(), SubscriptionId(42));
		assert_eq!(with(json!("42.0")).subscription_id(), SubscriptionId(42));
		assert_eq!(with(json!(-3)).subscription_id(), SubscriptionId(0));
		assert_eq!(with(json!("abc")).subscription_id(), SubscriptionId(0));
		assert_eq!(with(json!(true)).subscription_id(), SubscriptionId(0));
		assert_eq!(Request::default().subscription_id(), SubscriptionId(0));
	}

	#[test]
	fn test_split_path() {
		assert_eq!(split_path("highweb.applauncher.getapplist"), Some(vec!["highweb", "applauncher", "getapplist"]));
		assert_eq!(split_path("highweb"), Some(vec!["highweb"]));
		assert_eq!(split_path("highweb."), None);
		assert_eq!(split_path(""), None);
	}
}
