// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CapabilityResult;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
	pub id: String,
	pub display_name: String,
	pub phone_numbers: Vec<String>,
	pub emails: Vec<String>,
	pub address: String,
}

/// Lookup by field. `target` is one of `displayName`, `phoneNumber`, `email`;
/// an empty target matches every contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactQuery {
	pub target: String,
	pub value: String,
}

impl ContactQuery {
	pub fn matches(&self, contact: &Contact) -> bool {
		let value = self.value.as_str();
		match self.target.as_str() {
			"" => true,
			"displayName" => contact.display_name.contains(value),
			"phoneNumber" => contact.phone_numbers.iter().any(|n| n.contains(value)),
			"email" => contact.emails.iter().any(|e| e.contains(value)),
			_ => false,
		}
	}
}

#[async_trait]
pub trait Contacts: Send + Sync {
	async fn find_contacts(&self, query: &ContactQuery) -> CapabilityResult<Vec<Contact>>;

	async fn add_contact(&self, contact: Contact) -> CapabilityResult<String>;

	async fn update_contact(&self, contact: Contact) -> CapabilityResult<()>;

	async fn delete_contact(&self, id: &str) -> CapabilityResult<()>;
}
