// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use serde::Deserialize;

use crate::subscription::WorkerConfig;

/// Configuration for the device WebSocket subsystem.
///
/// Durations deserialize from milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WsConfig {
	/// Address to bind to. Port 0 picks a free port.
	pub bind_addr: String,
	/// Connections beyond this are dropped at accept.
	pub max_connections: usize,
	/// `SO_SNDBUF` for accepted sockets, in bytes.
	pub send_buffer_size: usize,
	#[serde(with = "millis")]
	pub cpu_sample_period: Duration,
	#[serde(with = "millis")]
	pub proximity_poll_period: Duration,
	/// Longest wait for connections to drain on shutdown.
	#[serde(with = "millis")]
	pub shutdown_timeout: Duration,
}

impl Default for WsConfig {
	fn default() -> Self {
		Self {
			bind_addr: "0.0.0.0:8099".to_string(),
			max_connections: 1024,
			send_buffer_size: 256 * 1024 * 1024,
			cpu_sample_period: Duration::from_millis(1000),
			proximity_poll_period: Duration::from_millis(16),
			shutdown_timeout: Duration::from_secs(5),
		}
	}
}

impl WsConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
		self.bind_addr = addr.into();
		self
	}

	pub fn max_connections(mut self, max: usize) -> Self {
		self.max_connections = max;
		self
	}

	pub fn send_buffer_size(mut self, bytes: usize) -> Self {
		self.send_buffer_size = bytes;
		self
	}

	pub fn cpu_sample_period(mut self, period: Duration) -> Self {
		self.cpu_sample_period = period;
		self
	}

	pub fn proximity_poll_period(mut self, period: Duration) -> Self {
		self.proximity_poll_period = period;
		self
	}

	pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout = timeout;
		self
	}

	pub(crate) fn workers(&self) -> WorkerConfig {
		WorkerConfig {
			cpu_sample_period: self.cpu_sample_period,
			proximity_poll_period: self.proximity_poll_period,
		}
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
