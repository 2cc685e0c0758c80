// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Identifier of one live WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

/// Identifier of a live subscription, unique across all connections.
///
/// Issued monotonically by the subscription engine; `0` is never issued and
/// is what unparseable client input coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub u64);

/// Identifier of an in-flight backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl Display for ConnectionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "conn#{}", self.0)
	}
}

impl Display for SubscriptionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "sub#{}", self.0)
	}
}

impl Display for CallId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "call#{}", self.0)
	}
}
