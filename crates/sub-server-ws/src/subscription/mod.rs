// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Push subscriptions: filters, workers and the registry indexing them.

mod filter;
mod registry;
mod worker;

pub use filter::{Filter, FilterGate, MIN_INTERVAL};
pub use registry::{Subscription, SubscriptionRegistry, SubscriptionState, WorkerConfig};
pub use worker::SubscriptionEvent;
