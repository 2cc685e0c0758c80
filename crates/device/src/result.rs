// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Serialize, Serializer};

/// Outcome code reported by a capability backend.
///
/// Serialized on the wire as its bare number (`"resultCode": 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
	Success,
	Failure,
	NotFound,
	InvalidArgument,
	NotSupported,
	PermissionDenied,
}

impl ResultCode {
	pub fn code(self) -> i32 {
		match self {
			ResultCode::Success => 0,
			ResultCode::Failure => 1,
			ResultCode::NotFound => 2,
			ResultCode::InvalidArgument => 3,
			ResultCode::NotSupported => 4,
			ResultCode::PermissionDenied => 5,
		}
	}

	pub fn is_success(self) -> bool {
		self == ResultCode::Success
	}
}

impl Display for ResultCode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ResultCode::Success => f.write_str("SUCCESS"),
			ResultCode::Failure => f.write_str("FAILURE"),
			ResultCode::NotFound => f.write_str("NOT_FOUND"),
			ResultCode::InvalidArgument => f.write_str("INVALID_ARGUMENT"),
			ResultCode::NotSupported => f.write_str("NOT_SUPPORTED"),
			ResultCode::PermissionDenied => f.write_str("PERMISSION_DENIED"),
		}
	}
}

impl Serialize for ResultCode {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_i32(self.code())
	}
}

/// Result of a capability call. The error side is the backend's failure code.
pub type CapabilityResult<T> = Result<T, ResultCode>;
