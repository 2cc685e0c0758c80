// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, sync::Arc};

use highweb_device::{Capabilities, InMemoryDevice};
use highweb_sub_server_ws::{DeviceWsSubsystem, WsConfig};
use highweb_sub_tracing::TracingBuilder;
use tokio::runtime::Handle;
use tracing::{Level, error, info};

#[tokio::main]
async fn main() {
	if let Err(e) = TracingBuilder::new().level(Level::INFO).init() {
		eprintln!("{e}");
	}

	let mut config = WsConfig::default();
	if let Ok(addr) = env::var("HIGHWEB_BIND_ADDR") {
		config = config.bind_addr(addr);
	}

	let device = Arc::new(InMemoryDevice::new());
	let mut ws = DeviceWsSubsystem::new(config, Capabilities::from_device(device), Handle::current());

	if let Err(e) = ws.start().await {
		error!("{e}");
		std::process::exit(1);
	}
	if let Some(addr) = ws.local_addr() {
		println!("HighWeb device server listening on ws://{addr}");
	}

	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Failed to listen for ctrl-c: {e}");
	}

	info!("Shutting down");
	if let Err(e) = ws.shutdown().await {
		error!("{e}");
	}
}
