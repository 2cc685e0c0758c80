// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

/// A single proximity sample, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityReading {
	pub value: f64,
	pub min: f64,
	pub max: f64,
}

/// Proximity sensor backed by a shared-memory reader.
///
/// Reads are synchronous and cheap; the subscription engine polls this at a
/// high fixed rate and applies its own filtering.
pub trait ProximitySensor: Send + Sync {
	/// Latest reading, or `None` when the sensor has not produced one yet.
	fn read(&self) -> Option<ProximityReading>;
}
