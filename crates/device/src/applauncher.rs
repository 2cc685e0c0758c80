// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

/// An installed (or installable) application as reported by the launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
	pub id: String,
	pub name: String,
	pub version: String,
	pub icon_url: String,
	pub installed: bool,
}

/// Application launcher backend.
#[async_trait]
pub trait AppLauncher: Send + Sync {
	async fn app_list(&self) -> CapabilityResult<Vec<AppInfo>>;

	async fn application_info(&self, app_id: &str) -> CapabilityResult<AppInfo>;

	async fn launch_app(&self, app_id: &str) -> CapabilityResult<()>;

	async fn remove_app(&self, app_id: &str) -> CapabilityResult<()>;
}
