// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
	Internal,
	External,
}

/// A mounted storage unit. Capacities are byte counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUnit {
	#[serde(rename = "type")]
	pub r#type: StorageType,
	pub capacity: u64,
	pub available_capacity: u64,
	pub removable: bool,
}

#[async_trait]
pub trait DeviceStorage: Send + Sync {
	async fn device_storage(&self) -> CapabilityResult<Vec<StorageUnit>>;
}
