// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;

use crate::CapabilityResult;

/// CPU load source.
#[async_trait]
pub trait DeviceCpu: Send + Sync {
	/// Current system load as a fraction in `0.0..=1.0`.
	async fn load(&self) -> CapabilityResult<f64>;
}
