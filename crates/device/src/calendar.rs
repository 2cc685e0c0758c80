// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

/// A calendar entry. `start`/`end` are milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarEvent {
	pub id: String,
	pub summary: String,
	pub description: String,
	pub location: String,
	pub start: u64,
	pub end: u64,
}

/// Restricts `find_events` to a start-time window. Unset bounds are open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
	pub start_after: Option<u64>,
	pub start_before: Option<u64>,
}

impl EventFilter {
	pub fn matches(&self, event: &CalendarEvent) -> bool {
		self.start_after.is_none_or(|after| event.start >= after)
			&& self.start_before.is_none_or(|before| event.start <= before)
	}
}

#[async_trait]
pub trait Calendar: Send + Sync {
	async fn find_events(&self, filter: &EventFilter) -> CapabilityResult<Vec<CalendarEvent>>;

	/// Stores a new event and returns the id assigned to it.
	async fn add_event(&self, event: CalendarEvent) -> CapabilityResult<String>;

	async fn update_event(&self, event: CalendarEvent) -> CapabilityResult<()>;

	async fn delete_event(&self, id: &str) -> CapabilityResult<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_filter_window() {
		let event = CalendarEvent {
			start: 100,
			..Default::default()
		};

		assert!(EventFilter::default().matches(&event));
		assert!(EventFilter {
			start_after: Some(100),
			start_before: None
		}
		.matches(&event));
		assert!(!EventFilter {
			start_after: Some(101),
			start_before: None
		}
		.matches(&event));
		assert!(!EventFilter {
			start_after: None,
			start_before: Some(99)
		}
		.matches(&event));
	}
}
