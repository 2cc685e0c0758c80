// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Drives the control loop directly through a recording sink.

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use async_trait::async_trait;
use highweb_device::{
	AppInfo, AppLauncher, Capabilities, CapabilityResult, InMemoryDevice, OutputDeviceType, ProximityReading, ResultCode,
};
use highweb_sub_server_ws::{ConnectionId, ControlMsg, ControlSender, DeviceHandler, FrameSink, WorkerConfig};
use highweb_testing::{wait_for, wait_for_some};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::{
	sync::{Notify, oneshot},
	time::sleep,
};

const C1: ConnectionId = ConnectionId(1);
const C2: ConnectionId = ConnectionId(2);

#[derive(Default)]
struct RecordingSink {
	frames: Mutex<Vec<(ConnectionId, Value)>>,
	closed: Mutex<Vec<ConnectionId>>,
}

impl FrameSink for RecordingSink {
	fn send(&self, connection: ConnectionId, frame: String) {
		let value = serde_json::from_str(&frame).expect("frames are JSON");
		self.frames.lock().push((connection, value));
	}

	fn close(&self, connection: ConnectionId) {
		self.closed.lock().push(connection);
	}
}

fn workers() -> WorkerConfig {
	WorkerConfig {
		cpu_sample_period: Duration::from_millis(5),
		proximity_poll_period: Duration::from_millis(5),
	}
}

/// App launcher whose `app_list` blocks until the gate opens.
#[derive(Default)]
struct GatedLauncher {
	gate: Notify,
	returned: AtomicBool,
}

#[async_trait]
impl AppLauncher for GatedLauncher {
	async fn app_list(&self) -> CapabilityResult<Vec<AppInfo>> {
		self.gate.notified().await;
		self.returned.store(true, Ordering::SeqCst);
		Ok(Vec::new())
	}

	async fn application_info(&self, _app_id: &str) -> CapabilityResult<AppInfo> {
		Err(ResultCode::NotSupported)
	}

	async fn launch_app(&self, _app_id: &str) -> CapabilityResult<()> {
		Err(ResultCode::NotSupported)
	}

	async fn remove_app(&self, _app_id: &str) -> CapabilityResult<()> {
		Err(ResultCode::NotSupported)
	}
}

struct Harness {
	device: Arc<InMemoryDevice>,
	sink: Arc<RecordingSink>,
	control: ControlSender,
	cursor: Mutex<usize>,
}

impl Harness {
	fn new() -> Self {
		let device = Arc::new(InMemoryDevice::new());
		Self::with_capabilities(device.clone(), Capabilities::from_device(device))
	}

	fn unbound() -> Self {
		Self::with_capabilities(Arc::new(InMemoryDevice::new()), Capabilities::new())
	}

	fn with_capabilities(device: Arc<InMemoryDevice>, capabilities: Capabilities) -> Self {
		let sink = Arc::new(RecordingSink::default());
		let control = DeviceHandler::spawn(capabilities, sink.clone(), workers());
		Self {
			device,
			sink,
			control,
			cursor: Mutex::new(0),
		}
	}

	fn post(&self, msg: ControlMsg) {
		self.control.send(msg).expect("control loop alive");
	}

	fn open(&self, connection: ConnectionId) {
		self.post(ControlMsg::Opened(connection));
	}

	fn text(&self, connection: ConnectionId, frame: Value) {
		self.post(ControlMsg::Text(connection, frame.to_string()));
	}

	/// The next frame sent on any connection.
	async fn next(&self) -> (ConnectionId, Value) {
		let index = *self.cursor.lock();
		let frame = wait_for_some(|| self.sink.frames.lock().get(index).cloned(), "expected a frame").await;
		*self.cursor.lock() += 1;
		frame
	}

	async fn next_on(&self, connection: ConnectionId) -> Value {
		let (to, frame) = self.next().await;
		assert_eq!(to, connection, "frame went to the wrong connection: {frame}");
		frame
	}

	async fn authorize(&self, connection: ConnectionId, request_id: &str) {
		self.open(connection);
		self.text(connection, json!({"action": "authorize", "requestId": request_id}));
		let reply = self.next_on(connection).await;
		assert!(reply.get("error").is_none(), "authorize failed: {reply}");
	}

	fn sent(&self) -> usize {
		self.sink.frames.lock().len()
	}
}

fn error_of(frame: &Value) -> (&str, &str) {
	let error = &frame["error"];
	(error["number"].as_str().unwrap(), error["reason"].as_str().unwrap())
}

#[tokio::test]
async fn test_authorize_reply_echoes_request_id() {
	let h = Harness::new();
	h.open(C1);
	h.text(C1, json!({"action": "authorize", "requestId": "r1"}));

	let reply = h.next_on(C1).await;
	assert_eq!(reply["action"], "authorize");
	assert_eq!(reply["requestId"], "r1");
	assert!(reply["timestamp"].as_str().unwrap().parse::<u128>().is_ok());
	assert!(reply.get("error").is_none());
	assert!(reply.get("value").is_none());
}

#[tokio::test]
async fn test_get_app_list() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "get", "path": "highweb.applauncher.getapplist", "requestId": "r1"}));

	let reply = h.next_on(C1).await;
	assert_eq!(reply["path"], "highweb.applauncher.getapplist");
	assert_eq!(reply["value"]["resultCode"], 0);
	assert_eq!(reply["value"]["appList"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unauthorized_request_never_reaches_backend() {
	let h = Harness::new();
	h.open(C1);
	h.text(
		C1,
		json!({"action": "set", "path": "highweb.applauncher.launchapp", "requestId": "r1", "extra": {"appId": "com.highweb.browser"}}),
	);

	let reply = h.next_on(C1).await;
	assert_eq!(error_of(&reply), ("401", "invalid_requestId_or_client"));
	assert!(h.device.launched().is_empty());
}

#[tokio::test]
async fn test_token_bound_to_its_connection() {
	let h = Harness::new();
	h.authorize(C1, "abc").await;
	h.open(C2);

	h.text(C2, json!({"action": "get", "path": "highweb.applauncher.getapplist", "requestId": "abc"}));
	assert_eq!(error_of(&h.next_on(C2).await), ("401", "invalid_requestId_or_client"));

	h.text(C2, json!({"action": "authorize", "requestId": "abc"}));
	assert_eq!(error_of(&h.next_on(C2).await), ("401", "unregistered_client"));
}

#[tokio::test]
async fn test_errors_do_not_close_the_connection() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;

	h.text(C1, json!({"action": "get", "path": "highweb.", "requestId": "r1"}));
	assert_eq!(error_of(&h.next_on(C1).await), ("404", "invalid_path"));

	h.post(ControlMsg::Text(C1, "not json".to_string()));
	assert_eq!(error_of(&h.next_on(C1).await), ("400", "bad_request"));

	h.text(C1, json!({"action": "jump", "requestId": "r1"}));
	assert_eq!(error_of(&h.next_on(C1).await), ("404", "invalid_action"));

	h.text(C1, json!({"action": "get", "path": "highweb.applauncher.getapplist", "requestId": "r1"}));
	assert_eq!(h.next_on(C1).await["value"]["resultCode"], 0);
	assert!(h.sink.closed.lock().is_empty());
}

#[tokio::test]
async fn test_unbound_backend_yields_internal_error() {
	let h = Harness::unbound();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "get", "path": "highweb.applauncher.getapplist", "requestId": "r1"}));

	let reply = h.next_on(C1).await;
	assert_eq!(error_of(&reply), ("500", "appluancher_internal_error"));
	assert_eq!(reply["requestId"], "r1");
}

#[tokio::test]
async fn test_late_bound_capabilities() {
	let h = Harness::unbound();
	h.authorize(C1, "r1").await;
	h.device.set_output_device(OutputDeviceType::WiredHeadset);
	h.post(ControlMsg::SetCapabilities(Capabilities::from_device(h.device.clone())));

	h.text(C1, json!({"action": "get", "path": "highweb.systeminfo.devicesound.outputdevicetype", "requestId": "r1"}));
	let reply = h.next_on(C1).await;
	assert_eq!(reply["value"], json!({"resultCode": 0, "outputDeviceType": "wiredHeadset"}));
}

#[tokio::test]
async fn test_call_completing_after_close_is_dropped() {
	let launcher = Arc::new(GatedLauncher::default());
	let h = Harness::with_capabilities(
		Arc::new(InMemoryDevice::new()),
		Capabilities::new().with_app_launcher(launcher.clone()),
	);
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "get", "path": "highweb.applauncher.getapplist", "requestId": "r1"}));
	h.post(ControlMsg::Closed(C1));

	// frames are handled in order, so C1 is gone once this reply arrives
	h.authorize(C2, "r2").await;

	launcher.gate.notify_one();
	wait_for(|| launcher.returned.load(Ordering::SeqCst), "backend should return").await;
	sleep(Duration::from_millis(30)).await;
	assert_eq!(h.sent(), 2, "a completed call must not reach a closed connection");
}

#[tokio::test]
async fn test_cpu_subscription_filters_and_pushes() {
	let h = Harness::new();
	h.device.set_cpu_load(0.2);
	h.authorize(C1, "r1").await;

	h.text(
		C1,
		json!({"action": "subscribe", "path": "highweb.systeminfo.devicecpu.load", "requestId": "r1", "filters": {"range": {"above": 0.5}}}),
	);
	let ack = h.next_on(C1).await;
	assert_eq!(ack["action"], "subscribe");
	assert!(ack.get("path").is_none());
	let id = ack["subscriptionId"].as_u64().unwrap();
	assert!(id > 0);

	sleep(Duration::from_millis(30)).await;
	assert_eq!(h.sent(), 2, "below-range samples must not be pushed");

	h.device.set_cpu_load(0.7);
	let push = h.next_on(C1).await;
	assert_eq!(push["path"], "highweb.systeminfo.devicecpu.load");
	assert_eq!(push["subscriptionId"], id);
	assert_eq!(push["requestId"], "r1");
	assert_eq!(push["value"], json!({"load": 0.7}));
}

#[tokio::test]
async fn test_cpu_failure_pushes_error_once() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.device.set_cpu_failure(Some(ResultCode::Failure));

	let filters = json!({"minChange": 0.1});
	h.text(
		C1,
		json!({"action": "subscribe", "path": "highweb.systeminfo.devicecpu.load", "requestId": "r1", "filters": filters}),
	);
	let id = h.next_on(C1).await["subscriptionId"].as_u64().unwrap();

	let push = h.next_on(C1).await;
	assert_eq!(error_of(&push), ("500", "devicecpu_internal_error"));
	assert_eq!(push["filters"], filters);
	assert_eq!(push["subscriptionId"], id);

	sleep(Duration::from_millis(30)).await;
	assert_eq!(h.sent(), 3);

	// still indexed until unsubscribed
	h.text(C1, json!({"action": "unsubscribe", "requestId": "r1", "subscriptionId": id.to_string()}));
	let reply = h.next_on(C1).await;
	assert!(reply.get("error").is_none());
	assert_eq!(reply["subscriptionId"], id);
}

#[tokio::test]
async fn test_subscribe_unbound_backend() {
	let h = Harness::unbound();
	h.authorize(C1, "r1").await;

	h.text(
		C1,
		json!({"action": "subscribe", "path": "highweb.sensor.ondeviceproximity", "requestId": "r1", "filters": {"interval": 1000}}),
	);
	let reply = h.next_on(C1).await;
	assert_eq!(error_of(&reply), ("500", "sensor_internal_error"));
	assert_eq!(reply["filters"], json!({"interval": 1000}));
	assert!(reply.get("subscriptionId").is_none());
}

#[tokio::test]
async fn test_proximity_subscription() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "subscribe", "path": "highweb.sensor.ondeviceproximity", "requestId": "r1", "filters": {"minChange": 1}}));
	h.next_on(C1).await;

	h.device.set_proximity(Some(ProximityReading {
		value: 3.0,
		min: 0.0,
		max: 5.0,
	}));
	let push = h.next_on(C1).await;
	assert_eq!(push["value"], json!({"value": 3.0, "min": 0.0, "max": 5.0}));

	// unchanged readings are held back by minChange
	sleep(Duration::from_millis(30)).await;
	assert_eq!(h.sent(), 3);
}

#[tokio::test]
async fn test_message_subscription() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"}));
	h.next_on(C1).await;
	wait_for(|| h.device.has_listener(), "listener should be installed").await;

	h.device.receive_message("+100", "hello");
	let push = h.next_on(C1).await;
	let batch = push["value"].as_array().unwrap();
	assert_eq!(batch.len(), 1);
	assert_eq!(batch[0]["from"], "+100");
	assert_eq!(batch[0]["type"], "sms");
}

#[tokio::test]
async fn test_message_subscription_follows_swapped_backend() {
	let h = Harness::new();
	let replacement = Arc::new(InMemoryDevice::new());
	h.authorize(C1, "r1").await;

	let subscribe = json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"});
	h.text(C1, subscribe.clone());
	let first = h.next_on(C1).await["subscriptionId"].as_u64().unwrap();

	h.post(ControlMsg::SetCapabilities(Capabilities::from_device(replacement.clone())));
	h.text(C1, subscribe);
	let second = h.next_on(C1).await["subscriptionId"].as_u64().unwrap();
	assert!(!h.device.has_listener());
	assert!(replacement.has_listener());

	replacement.receive_message("bob", "hi");
	let mut notified = Vec::new();
	for _ in 0..2 {
		let push = h.next_on(C1).await;
		assert_eq!(push["value"][0]["from"], "bob");
		notified.push(push["subscriptionId"].as_u64().unwrap());
	}
	notified.sort();
	assert_eq!(notified, vec![first, second]);
}

#[tokio::test]
async fn test_message_interval_pushes_empty_batch() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(
		C1,
		json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1", "filters": {"interval": 500}}),
	);
	let id = h.next_on(C1).await["subscriptionId"].as_u64().unwrap();

	let push = h.next_on(C1).await;
	assert_eq!(push["subscriptionId"], id);
	assert_eq!(push["path"], "highweb.messaging.onmessagereceived");
	assert!(push["value"].is_null());
	assert!(push.as_object().unwrap().contains_key("value"));
}

#[tokio::test]
async fn test_cpu_interval_reemits_despite_min_change() {
	let h = Harness::new();
	h.device.set_cpu_load(0.3);
	h.authorize(C1, "r1").await;
	h.text(
		C1,
		json!({"action": "subscribe", "path": "highweb.systeminfo.devicecpu.load", "requestId": "r1", "filters": {"interval": 500, "minChange": 0.5}}),
	);
	h.next_on(C1).await;
	assert_eq!(h.next_on(C1).await["value"], json!({"load": 0.3}));

	// unchanged samples are held back by minChange
	sleep(Duration::from_millis(100)).await;
	assert_eq!(h.sent(), 3);

	// the interval tick re-emits the same load anyway
	assert_eq!(h.next_on(C1).await["value"], json!({"load": 0.3}));
}

#[tokio::test]
async fn test_unsubscribe_unknown_id() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "unsubscribe", "requestId": "r1", "subscriptionId": 4242}));

	let reply = h.next_on(C1).await;
	assert_eq!(error_of(&reply), ("404", "invalid_subscriptionId"));
	assert_eq!(reply["subscriptionId"], 4242);
}

#[tokio::test]
async fn test_unsubscribe_someone_elses_subscription() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.authorize(C2, "r2").await;

	h.text(C1, json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"}));
	let id = h.next_on(C1).await["subscriptionId"].as_u64().unwrap();

	h.text(C2, json!({"action": "unsubscribe", "requestId": "r2", "subscriptionId": id}));
	assert_eq!(error_of(&h.next_on(C2).await), ("404", "invalid_subscriptionId"));
}

#[tokio::test]
async fn test_unsubscribe_all_releases_listener() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	for _ in 0..2 {
		h.text(C1, json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"}));
		h.next_on(C1).await;
	}
	assert!(h.device.has_listener());

	h.text(C1, json!({"action": "unsubscribeall", "requestId": "r1"}));
	let reply = h.next_on(C1).await;
	assert!(reply.get("error").is_none());
	assert!(!h.device.has_listener());

	h.device.receive_message("+100", "nobody listens");
	sleep(Duration::from_millis(20)).await;
	assert_eq!(h.sent(), 4);
}

#[tokio::test]
async fn test_close_revokes_and_cleans_up() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.text(C1, json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"}));
	h.next_on(C1).await;

	h.post(ControlMsg::Closed(C1));
	wait_for(|| !h.device.has_listener(), "listener should be released").await;

	// the token is free again
	h.authorize(C2, "r1").await;
}

#[tokio::test]
async fn test_shutdown_closes_connections_and_acknowledges() {
	let h = Harness::new();
	h.authorize(C1, "r1").await;
	h.authorize(C2, "r2").await;
	h.text(C1, json!({"action": "subscribe", "path": "highweb.messaging.onmessagereceived", "requestId": "r1"}));
	h.next_on(C1).await;

	let (ack, done) = oneshot::channel();
	h.post(ControlMsg::Shutdown(ack));
	done.await.unwrap();

	let mut closed = h.sink.closed.lock().clone();
	closed.sort();
	assert_eq!(closed, vec![C1, C2]);
	assert!(!h.device.has_listener());
	wait_for(|| h.control.is_closed(), "control loop should end").await;
}

#[tokio::test]
async fn test_loop_tears_down_when_every_sender_is_gone() {
	let sink = Arc::new(RecordingSink::default());
	let control = DeviceHandler::spawn(Capabilities::new(), sink.clone(), workers());
	control.send(ControlMsg::Opened(C1)).unwrap();
	drop(control);

	wait_for(|| sink.closed.lock().contains(&C1), "teardown should close open connections").await;
}
