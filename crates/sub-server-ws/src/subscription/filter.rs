// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Notification filters for value-producing subscriptions.
//!
//! Clients send `{"interval": ms, "range": {"above": n, "below": n}, "minChange": n}`.
//! A bound of exactly `0` is indistinguishable from an absent one and never
//! suppresses anything.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::response::WireError;

/// Shortest interval that arms a periodic timer.
pub const MIN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterSpec {
	#[serde(default)]
	interval: Option<f64>,
	#[serde(default)]
	range: Option<RangeSpec>,
	#[serde(default)]
	min_change: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RangeSpec {
	#[serde(default)]
	above: Option<f64>,
	#[serde(default)]
	below: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Filter {
	/// Periodic re-notification; `None` below [`MIN_INTERVAL`].
	pub interval: Option<Duration>,
	pub min_value: f64,
	pub max_value: f64,
	pub min_change: f64,
}

impl Filter {
	/// Parses a request's `filters` object. Absent or `null` filters yield
	/// the empty filter; a filters value of the wrong shape is a bad request.
	pub fn parse(filters: Option<&Value>) -> Result<Self, WireError> {
		let spec: FilterSpec = match filters {
			None | Some(Value::Null) => FilterSpec::default(),
			Some(value) => serde_json::from_value(value.clone()).map_err(|_| WireError::BadRequest)?,
		};
		let range = spec.range.unwrap_or_default();

		let interval = spec
			.interval
			.filter(|ms| ms.is_finite() && *ms >= MIN_INTERVAL.as_millis() as f64)
			.map(|ms| Duration::from_millis(ms as u64));

		Ok(Self {
			interval,
			min_value: range.above.unwrap_or(0.0),
			max_value: range.below.unwrap_or(0.0),
			min_change: spec.min_change.unwrap_or(0.0),
		})
	}

	pub fn in_range(&self, value: f64) -> bool {
		if self.min_value != 0.0 && value < self.min_value {
			return false;
		}
		if self.max_value != 0.0 && value > self.max_value {
			return false;
		}
		true
	}

	/// Whether `value` should be pushed given the last pushed value.
	///
	/// `minChange` only applies once something has been pushed.
	pub fn admits(&self, value: f64, last_notified: Option<f64>) -> bool {
		if !self.in_range(value) {
			return false;
		}
		match last_notified {
			Some(last) if self.min_change != 0.0 => (last - value).abs() >= self.min_change,
			_ => true,
		}
	}
}

/// Per-subscription filter state.
#[derive(Debug, Clone)]
pub struct FilterGate {
	filter: Filter,
	last_value: Option<f64>,
	last_notified: Option<f64>,
}

impl FilterGate {
	pub fn new(filter: Filter) -> Self {
		Self {
			filter,
			last_value: None,
			last_notified: None,
		}
	}

	/// Records a fresh sample and returns whether it passes the filter.
	pub fn offer(&mut self, value: f64) -> bool {
		self.last_value = Some(value);
		if self.filter.admits(value, self.last_notified) {
			self.last_notified = Some(value);
			true
		} else {
			false
		}
	}

	/// The value to re-emit on an interval tick: the latest sample, if it
	/// lies in range. `minChange` does not apply to ticks.
	pub fn periodic(&mut self) -> Option<f64> {
		let value = self.last_value.filter(|v| self.filter.in_range(*v))?;
		self.last_notified = Some(value);
		Some(value)
	}

	pub fn last_notified(&self) -> Option<f64> {
		self.last_notified
	}
}
