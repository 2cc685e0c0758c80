// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Device WebSocket handler for HighWeb.
//!
//! This crate provides a tokio-tungstenite-based WebSocket server exposing
//! device capabilities (app launcher, sound, storage, CPU, calendar, contacts,
//! messaging, gallery, proximity sensor) to authorized clients.
//!
//! # Features
//!
//! - Request-token authorization bound to the connection
//! - One-shot backend calls with results shaped into wire JSON
//! - Filtered push subscriptions for CPU load, incoming messages and proximity
//! - Ordered teardown of connections, calls, subscriptions and backends
//!
//! # Message Protocol
//!
//! Every frame is one JSON object:
//!
//! ```json
//! {
//!   "action": "get",
//!   "path": "highweb.applauncher.getapplist",
//!   "requestId": "r1"
//! }
//! ```
//!
//! Clients first send `{"action": "authorize", "requestId": "r1"}` and then
//! present the same `requestId` on every request from that connection.
//!
//! # Example
//!
//! ```ignore
//! use highweb_device::{Capabilities, InMemoryDevice};
//! use highweb_sub_server_ws::{DeviceWsSubsystem, WsConfig};
//!
//! let device = Arc::new(InMemoryDevice::new());
//! let mut ws = DeviceWsSubsystem::new(
//!     WsConfig::default(),
//!     Capabilities::from_device(device),
//!     tokio::runtime::Handle::current(),
//! );
//! ws.start().await?;
//! ```

pub mod call;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
mod id;
pub mod operation;
pub mod protocol;
pub mod response;
pub mod router;
pub mod session;
pub mod subscription;
pub mod subsystem;
pub mod transport;

pub use config::WsConfig;
pub use error::{Error, Result};
pub use handler::{ControlMsg, ControlSender, DeviceHandler, Flow};
pub use id::{CallId, ConnectionId, SubscriptionId};
pub use protocol::Request;
pub use response::{ErrorBody, Response, WireError};
pub use subscription::WorkerConfig;
pub use subsystem::{DeviceWsSubsystem, HealthStatus};
pub use transport::{Connections, FrameSink};
