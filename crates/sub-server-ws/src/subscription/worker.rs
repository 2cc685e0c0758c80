// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subscription worker tasks.
//!
//! A worker samples or drains its source, filters locally and posts each
//! decision to the control loop as [`ControlMsg::Notify`]. It never touches
//! the transport. Workers end when their stop signal fires, when the control
//! loop is gone, or after reporting a backend failure.

use std::{future::pending, sync::Arc, time::Duration};

use highweb_device::{DeviceCpu, Message, ProximitySensor, ResultCode};
use serde_json::{Value, json};
use tokio::{
	sync::{mpsc, watch},
	time::{Instant, Interval, MissedTickBehavior, interval, interval_at},
};

use super::{Filter, FilterGate};
use crate::{
	SubscriptionId,
	handler::{ControlMsg, ControlSender},
};

/// What a worker reports for its subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
	Value(Value),
	Failed(ResultCode),
}

struct Outbox {
	subscription: SubscriptionId,
	control: ControlSender,
}

impl Outbox {
	/// Returns false once the control loop has gone away.
	fn post(&self, event: SubscriptionEvent) -> bool {
		self.control
			.send(ControlMsg::Notify {
				subscription: self.subscription,
				event,
			})
			.is_ok()
	}
}

fn ticker(filter: &Filter) -> Option<Interval> {
	filter.interval.map(|period| interval_at(Instant::now() + period, period))
}

async fn next_tick(ticker: &mut Option<Interval>) {
	match ticker {
		Some(ticker) => {
			ticker.tick().await;
		}
		None => pending::<()>().await,
	}
}

fn sampler(period: Duration) -> Interval {
	let mut sampler = interval(period);
	sampler.set_missed_tick_behavior(MissedTickBehavior::Skip);
	sampler
}

pub(crate) fn spawn_cpu(
	subscription: SubscriptionId,
	backend: Arc<dyn DeviceCpu>,
	period: Duration,
	filter: Filter,
	control: ControlSender,
	mut stop: watch::Receiver<bool>,
) {
	tokio::spawn(async move {
		let outbox = Outbox {
			subscription,
			control,
		};
		let mut gate = FilterGate::new(filter);
		let mut ticker = ticker(&filter);
		let mut sampler = sampler(period);

		loop {
			tokio::select! {
				biased;

				_ = stop.changed() => break,

				_ = sampler.tick() => match backend.load().await {
					Ok(load) => {
						if gate.offer(load) && !outbox.post(SubscriptionEvent::Value(json!({ "load": load }))) {
							break;
						}
					}
					Err(code) => {
						outbox.post(SubscriptionEvent::Failed(code));
						break;
					}
				},

				_ = next_tick(&mut ticker) => {
					if let Some(load) = gate.periodic() {
						if !outbox.post(SubscriptionEvent::Value(json!({ "load": load }))) {
							break;
						}
					}
				}
			}
		}
		tracing::trace!("{} cpu worker stopped", subscription);
	});
}

pub(crate) fn spawn_proximity(
	subscription: SubscriptionId,
	backend: Arc<dyn ProximitySensor>,
	period: Duration,
	filter: Filter,
	control: ControlSender,
	mut stop: watch::Receiver<bool>,
) {
	tokio::spawn(async move {
		let outbox = Outbox {
			subscription,
			control,
		};
		let mut gate = FilterGate::new(filter);
		let mut ticker = ticker(&filter);
		let mut sampler = sampler(period);
		let mut latest = None;

		loop {
			let reading = tokio::select! {
				biased;

				_ = stop.changed() => break,

				_ = sampler.tick() => {
					// no reading until the sensor has produced one
					let Some(reading) = backend.read() else { continue };
					latest = Some(reading);
					if !gate.offer(reading.value) {
						continue;
					}
					reading
				}

				_ = next_tick(&mut ticker) => {
					match (gate.periodic(), latest) {
						(Some(_), Some(reading)) => reading,
						_ => continue,
					}
				}
			};

			let value = json!({ "value": reading.value, "min": reading.min, "max": reading.max });
			if !outbox.post(SubscriptionEvent::Value(value)) {
				break;
			}
		}
		tracing::trace!("{} proximity worker stopped", subscription);
	});
}

pub(crate) fn spawn_message(
	subscription: SubscriptionId,
	mut inbox: mpsc::UnboundedReceiver<Message>,
	filter: Filter,
	control: ControlSender,
	mut stop: watch::Receiver<bool>,
) {
	tokio::spawn(async move {
		let outbox = Outbox {
			subscription,
			control,
		};
		let mut ticker = ticker(&filter);

		loop {
			let mut batch = tokio::select! {
				biased;

				_ = stop.changed() => break,

				received = inbox.recv() => match received {
					Some(message) => vec![message],
					None => break,
				},

				_ = next_tick(&mut ticker) => Vec::new(),
			};

			while let Ok(message) = inbox.try_recv() {
				batch.push(message);
			}

			let value = if batch.is_empty() {
				Value::Null
			} else {
				serde_json::to_value(batch).unwrap_or(Value::Null)
			};
			if !outbox.post(SubscriptionEvent::Value(value)) {
				break;
			}
		}
		tracing::trace!("{} message worker stopped", subscription);
	});
}
