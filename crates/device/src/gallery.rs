// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
	Image,
	Video,
	Audio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
	pub id: String,
	#[serde(rename = "type")]
	pub r#type: MediaType,
	pub title: String,
	pub file_name: String,
	pub file_size: u64,
	pub created_date: u64,
	pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaFilter {
	#[serde(rename = "type")]
	pub r#type: Option<MediaType>,
}

impl MediaFilter {
	pub fn matches(&self, media: &Media) -> bool {
		self.r#type.is_none_or(|ty| media.r#type == ty)
	}
}

#[async_trait]
pub trait Gallery: Send + Sync {
	async fn find_media(&self, filter: &MediaFilter) -> CapabilityResult<Vec<Media>>;

	async fn get_media(&self, id: &str) -> CapabilityResult<Media>;

	async fn delete_media(&self, id: &str) -> CapabilityResult<()>;
}
