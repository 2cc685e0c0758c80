// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

/// Where audio output is currently routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputDeviceType {
	Speaker,
	Receiver,
	WiredHeadset,
	Bluetooth,
	Unknown,
}

/// Per-stream volume levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
	pub alarm: u32,
	pub bell: u32,
	pub media: u32,
	pub notification: u32,
	pub system: u32,
	pub voice_call: u32,
}

#[async_trait]
pub trait DeviceSound: Send + Sync {
	async fn output_device_type(&self) -> CapabilityResult<OutputDeviceType>;

	async fn device_volume(&self) -> CapabilityResult<VolumeInfo>;
}
