// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::error::Error;

use tracing::Level;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
	#[error("failed to install tracing subscriber: {0}")]
	Init(#[source] Box<dyn Error + Send + Sync>),
}

/// Builder for the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: Level,
	json: bool,
	ansi: bool,
	with_target: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self {
			level: Level::INFO,
			json: false,
			ansi: true,
			with_target: true,
		}
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Level used when `RUST_LOG` is not set.
	pub fn level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	/// Emit one JSON object per event instead of human-readable lines.
	pub fn json(mut self, json: bool) -> Self {
		self.json = json;
		self
	}

	pub fn ansi(mut self, ansi: bool) -> Self {
		self.ansi = ansi;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	fn filter(&self) -> EnvFilter {
		EnvFilter::builder().with_default_directive(LevelFilter::from_level(self.level).into()).from_env_lossy()
	}

	/// Installs the subscriber. Fails if a global subscriber already exists.
	pub fn init(self) -> Result<(), TracingError> {
		let filter = self.filter();
		let result = if self.json {
			tracing_subscriber::fmt().json().with_env_filter(filter).with_target(self.with_target).try_init()
		} else {
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(self.ansi)
				.with_target(self.with_target)
				.try_init()
		};
		result.map_err(TracingError::Init)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let builder = TracingBuilder::new();
		assert_eq!(builder.level, Level::INFO);
		assert!(!builder.json);
		assert!(builder.ansi);
	}

	#[test]
	fn test_builder_chain() {
		let builder = TracingBuilder::new().level(Level::DEBUG).json(true).ansi(false).with_target(false);
		assert_eq!(builder.level, Level::DEBUG);
		assert!(builder.json);
		assert!(!builder.ansi);
		assert!(!builder.with_target);
	}

	#[test]
	fn test_second_init_fails() {
		let _ = TracingBuilder::new().ansi(false).init();
		assert!(matches!(TracingBuilder::new().init(), Err(TracingError::Init(_))));
	}
}
