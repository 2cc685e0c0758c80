// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wait utilities for testing
//!
//! Poll a condition instead of sleeping a fixed time, so async tests finish
//! as soon as the state they wait for is reached.

use std::time::{Duration, Instant};

use tokio::time::sleep;

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval (1 millisecond)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Wait for a condition to become true, polling at regular intervals
///
/// # Panics
/// Panics with `timeout_message` if the condition is still false after
/// `timeout`.
pub async fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		sleep(poll_interval).await;
	}
}

/// Wait for a condition with default timeout and poll interval
pub async fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message).await;
}

/// Poll `probe` until it yields a value, with the default timeout.
pub async fn wait_for_some<T, F>(probe: F, message: &str) -> T
where
	F: Fn() -> Option<T>,
{
	let start = Instant::now();
	loop {
		if let Some(value) = probe() {
			return value;
		}
		if start.elapsed() > DEFAULT_TIMEOUT {
			panic!("Timeout after {:?}: {}", DEFAULT_TIMEOUT, message);
		}
		sleep(DEFAULT_POLL_INTERVAL).await;
	}
}
