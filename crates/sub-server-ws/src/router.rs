// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Per-frame request routing.
//!
//! [`route`] turns one inbound text frame into a [`Routed`] decision. It
//! touches only the session registry; everything that needs a backend or the
//! subscription engine is handed back to the control loop to carry out.

use serde_json::Value;

use crate::{
	ConnectionId, SubscriptionId,
	dispatch::{FunctionCode, resolve_action},
	operation::{Domain, Endpoint, Operation, SubscriptionKind, Target},
	protocol::{Request, split_path},
	response::{Response, WireError},
	session::SessionRegistry,
	subscription::Filter,
};

/// A validated subscribe request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeRequest {
	pub kind: SubscriptionKind,
	pub filter: Filter,
	/// The request's `filters`, echoed on error pushes.
	pub filters_echo: Option<Value>,
	pub path: String,
	pub request_id: Option<String>,
}

/// What the control loop should do with a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
	/// Send this response now.
	Reply(Response),
	/// Run a backend call; its completion sends the response.
	Call {
		response: Response,
		domain: Domain,
		operation: Operation,
	},
	Subscribe {
		response: Response,
		request: SubscribeRequest,
	},
	Unsubscribe {
		response: Response,
		subscription: SubscriptionId,
	},
	UnsubscribeAll {
		response: Response,
	},
}

impl Routed {
	fn error(response: Response, error: WireError) -> Self {
		Routed::Reply(response.with_error(error))
	}
}

pub fn route(sessions: &mut SessionRegistry, connection: ConnectionId, text: &str) -> Routed {
	let Ok(request) = Request::parse(text) else {
		tracing::debug!("{} sent unparseable frame", connection);
		return Routed::error(Response::default(), WireError::BadRequest);
	};

	let response = Response::for_request(&request);
	let Some(action) = request.action.as_deref() else {
		return Routed::error(response, WireError::BadRequest);
	};
	let request_id = request.request_id.as_deref().unwrap_or_default();

	match resolve_action(action) {
		Some(FunctionCode::Authorize) => match sessions.authorize(connection, request_id) {
			Ok(()) => Routed::Reply(response),
			Err(error) => Routed::error(response, error),
		},
		_ if !sessions.is_authorized(connection, request_id) => Routed::error(response, WireError::Unauthorized),
		None => Routed::error(response, WireError::InvalidAction),
		Some(FunctionCode::Unsubscribe) => Routed::Unsubscribe {
			subscription: request.subscription_id(),
			response,
		},
		Some(FunctionCode::UnsubscribeAll) => Routed::UnsubscribeAll {
			response,
		},
		Some(action) => route_path(&request, action, response),
	}
}

fn route_path(request: &Request, action: FunctionCode, response: Response) -> Routed {
	let Some(path) = request.path.as_deref() else {
		return Routed::error(response, WireError::InvalidPath);
	};
	let Some(endpoint) = split_path(path).and_then(|segments| Endpoint::resolve(action, &segments)) else {
		return Routed::error(response, WireError::InvalidPath);
	};

	let target = match endpoint.bind(request.extra.as_ref()) {
		Ok(target) => target,
		Err(error) => return Routed::error(response, error),
	};

	match target {
		Target::Call(operation) => Routed::Call {
			response,
			domain: endpoint.domain(),
			operation,
		},
		Target::Subscribe(kind) => {
			let filter = match Filter::parse(request.filters.as_ref()) {
				Ok(filter) => filter,
				Err(error) => return Routed::error(response, error),
			};
			Routed::Subscribe {
				response,
				request: SubscribeRequest {
					kind,
					filter,
					filters_echo: request.filters.clone(),
					path: path.to_string(),
					request_id: request.request_id.clone(),
				},
			}
		}
	}
}
