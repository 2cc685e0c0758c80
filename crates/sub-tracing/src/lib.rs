// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Logging bootstrap.
//!
//! Installs a `tracing_subscriber` formatter as the global subscriber. The
//! `RUST_LOG` environment variable, when set, overrides the configured level.

mod builder;

pub use builder::{TracingBuilder, TracingError};
