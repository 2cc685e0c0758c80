// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io;

/// Process-level failures of the subsystem. Request-level failures never
/// surface here; they are rendered into responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: io::Error,
	},
	#[error("bound address unavailable: {0}")]
	LocalAddr(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
