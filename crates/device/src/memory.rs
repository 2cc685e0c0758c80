// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-memory device implementing every capability trait.
//!
//! Used by the server binary when no platform backends are available, and by
//! tests that need a device whose state can be steered from the outside.

use std::{
	collections::BTreeMap,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
	AppInfo, AppLauncher, Calendar, CalendarEvent, CapabilityResult, Contact, ContactQuery, Contacts, DeviceCpu,
	DeviceSound, DeviceStorage, EventFilter, Gallery, Media, MediaFilter, MediaType, Message, MessageListener,
	MessageQuery, Messaging, OutgoingMessage, OutputDeviceType, ProximityReading, ProximitySensor, ResultCode,
	StorageType, StorageUnit, VolumeInfo,
};

struct State {
	apps: BTreeMap<String, AppInfo>,
	events: BTreeMap<String, CalendarEvent>,
	contacts: BTreeMap<String, Contact>,
	messages: BTreeMap<String, Message>,
	media: BTreeMap<String, Media>,
	storage: Vec<StorageUnit>,
	output: OutputDeviceType,
	volume: VolumeInfo,
	cpu_load: f64,
	cpu_failure: Option<ResultCode>,
	proximity: Option<ProximityReading>,
	launched: Vec<String>,
}

pub struct InMemoryDevice {
	state: Mutex<State>,
	listener: Mutex<Option<MessageListener>>,
	next_id: AtomicU64,
}

impl InMemoryDevice {
	/// A device with no apps, events, contacts, messages or media.
	pub fn empty() -> Self {
		Self {
			state: Mutex::new(State {
				apps: BTreeMap::new(),
				events: BTreeMap::new(),
				contacts: BTreeMap::new(),
				messages: BTreeMap::new(),
				media: BTreeMap::new(),
				storage: vec![StorageUnit {
					r#type: StorageType::Internal,
					capacity: 32 * 1024 * 1024 * 1024,
					available_capacity: 12 * 1024 * 1024 * 1024,
					removable: false,
				}],
				output: OutputDeviceType::Speaker,
				volume: VolumeInfo {
					alarm: 7,
					bell: 5,
					media: 9,
					notification: 5,
					system: 3,
					voice_call: 4,
				},
				cpu_load: 0.0,
				cpu_failure: None,
				proximity: None,
				launched: Vec::new(),
			}),
			listener: Mutex::new(None),
			next_id: AtomicU64::new(1),
		}
	}

	/// A device pre-populated with a few apps and media items.
	pub fn new() -> Self {
		let device = Self::empty();
		{
			let mut state = device.state.lock();
			for (id, name) in [("com.highweb.browser", "Browser"), ("com.highweb.gallery", "Gallery")] {
				state.apps.insert(
					id.to_string(),
					AppInfo {
						id: id.to_string(),
						name: name.to_string(),
						version: "1.0.0".to_string(),
						icon_url: format!("file:///system/icons/{}.png", id),
						installed: true,
					},
				);
			}
			state.media.insert(
				"1".to_string(),
				Media {
					id: "1".to_string(),
					r#type: MediaType::Image,
					title: "Sunset".to_string(),
					file_name: "sunset.jpg".to_string(),
					file_size: 204_800,
					created_date: 1_500_000_000_000,
					uri: "file:///sdcard/DCIM/sunset.jpg".to_string(),
				},
			);
		}
		device.next_id.store(100, Ordering::Relaxed);
		device
	}

	pub fn set_cpu_load(&self, load: f64) {
		self.state.lock().cpu_load = load;
	}

	/// Makes every subsequent `load()` fail with `code` until cleared.
	pub fn set_cpu_failure(&self, code: Option<ResultCode>) {
		self.state.lock().cpu_failure = code;
	}

	pub fn set_proximity(&self, reading: Option<ProximityReading>) {
		self.state.lock().proximity = reading;
	}

	pub fn set_output_device(&self, output: OutputDeviceType) {
		self.state.lock().output = output;
	}

	/// Ids of apps launched so far, oldest first.
	pub fn launched(&self) -> Vec<String> {
		self.state.lock().launched.clone()
	}

	pub fn has_listener(&self) -> bool {
		self.listener.lock().is_some()
	}

	/// Simulates an incoming message: stores it and notifies the listener.
	pub fn receive_message(&self, from: &str, body: &str) -> Message {
		let message = Message {
			id: self.allocate_id(),
			r#type: crate::MessageType::Sms,
			from: from.to_string(),
			to: vec!["me".to_string()],
			body: body.to_string(),
			date: now_millis(),
		};
		self.state.lock().messages.insert(message.id.clone(), message.clone());

		let listener = self.listener.lock().clone();
		if let Some(listener) = listener {
			listener(message.clone());
		}
		message
	}

	fn allocate_id(&self) -> String {
		self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
	}
}

impl Default for InMemoryDevice {
	fn default() -> Self {
		Self::new()
	}
}

fn now_millis() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[async_trait]
impl AppLauncher for InMemoryDevice {
	async fn app_list(&self) -> CapabilityResult<Vec<AppInfo>> {
		Ok(self.state.lock().apps.values().cloned().collect())
	}

	async fn application_info(&self, app_id: &str) -> CapabilityResult<AppInfo> {
		self.state.lock().apps.get(app_id).cloned().ok_or(ResultCode::NotFound)
	}

	async fn launch_app(&self, app_id: &str) -> CapabilityResult<()> {
		let mut state = self.state.lock();
		if !state.apps.contains_key(app_id) {
			return Err(ResultCode::NotFound);
		}
		state.launched.push(app_id.to_string());
		debug!("launched {}", app_id);
		Ok(())
	}

	async fn remove_app(&self, app_id: &str) -> CapabilityResult<()> {
		self.state.lock().apps.remove(app_id).map(|_| ()).ok_or(ResultCode::NotFound)
	}
}

#[async_trait]
impl DeviceSound for InMemoryDevice {
	async fn output_device_type(&self) -> CapabilityResult<OutputDeviceType> {
		Ok(self.state.lock().output)
	}

	async fn device_volume(&self) -> CapabilityResult<VolumeInfo> {
		Ok(self.state.lock().volume)
	}
}

#[async_trait]
impl DeviceStorage for InMemoryDevice {
	async fn device_storage(&self) -> CapabilityResult<Vec<StorageUnit>> {
		Ok(self.state.lock().storage.clone())
	}
}

#[async_trait]
impl DeviceCpu for InMemoryDevice {
	async fn load(&self) -> CapabilityResult<f64> {
		let state = self.state.lock();
		match state.cpu_failure {
			Some(code) => Err(code),
			None => Ok(state.cpu_load),
		}
	}
}

#[async_trait]
impl Calendar for InMemoryDevice {
	async fn find_events(&self, filter: &EventFilter) -> CapabilityResult<Vec<CalendarEvent>> {
		Ok(self.state.lock().events.values().filter(|e| filter.matches(e)).cloned().collect())
	}

	async fn add_event(&self, mut event: CalendarEvent) -> CapabilityResult<String> {
		if event.end < event.start {
			return Err(ResultCode::InvalidArgument);
		}
		event.id = self.allocate_id();
		let id = event.id.clone();
		self.state.lock().events.insert(id.clone(), event);
		Ok(id)
	}

	async fn update_event(&self, event: CalendarEvent) -> CapabilityResult<()> {
		let mut state = self.state.lock();
		match state.events.get_mut(&event.id) {
			Some(existing) => {
				*existing = event;
				Ok(())
			}
			None => Err(ResultCode::NotFound),
		}
	}

	async fn delete_event(&self, id: &str) -> CapabilityResult<()> {
		self.state.lock().events.remove(id).map(|_| ()).ok_or(ResultCode::NotFound)
	}
}

#[async_trait]
impl Contacts for InMemoryDevice {
	async fn find_contacts(&self, query: &ContactQuery) -> CapabilityResult<Vec<Contact>> {
		Ok(self.state.lock().contacts.values().filter(|c| query.matches(c)).cloned().collect())
	}

	async fn add_contact(&self, mut contact: Contact) -> CapabilityResult<String> {
		if contact.display_name.is_empty() {
			return Err(ResultCode::InvalidArgument);
		}
		contact.id = self.allocate_id();
		let id = contact.id.clone();
		self.state.lock().contacts.insert(id.clone(), contact);
		Ok(id)
	}

	async fn update_contact(&self, contact: Contact) -> CapabilityResult<()> {
		let mut state = self.state.lock();
		match state.contacts.get_mut(&contact.id) {
			Some(existing) => {
				*existing = contact;
				Ok(())
			}
			None => Err(ResultCode::NotFound),
		}
	}

	async fn delete_contact(&self, id: &str) -> CapabilityResult<()> {
		self.state.lock().contacts.remove(id).map(|_| ()).ok_or(ResultCode::NotFound)
	}
}

#[async_trait]
impl Messaging for InMemoryDevice {
	async fn find_messages(&self, query: &MessageQuery) -> CapabilityResult<Vec<Message>> {
		Ok(self.state.lock().messages.values().filter(|m| query.matches(m)).cloned().collect())
	}

	async fn send_message(&self, message: OutgoingMessage) -> CapabilityResult<String> {
		if message.to.is_empty() {
			return Err(ResultCode::InvalidArgument);
		}
		let stored = Message {
			id: self.allocate_id(),
			r#type: message.r#type,
			from: "me".to_string(),
			to: message.to,
			body: message.body,
			date: now_millis(),
		};
		let id = stored.id.clone();
		self.state.lock().messages.insert(id.clone(), stored);
		Ok(id)
	}

	fn add_listener(&self, listener: MessageListener) {
		*self.listener.lock() = Some(listener);
	}

	fn remove_listener(&self) {
		*self.listener.lock() = None;
	}
}

#[async_trait]
impl Gallery for InMemoryDevice {
	async fn find_media(&self, filter: &MediaFilter) -> CapabilityResult<Vec<Media>> {
		Ok(self.state.lock().media.values().filter(|m| filter.matches(m)).cloned().collect())
	}

	async fn get_media(&self, id: &str) -> CapabilityResult<Media> {
		self.state.lock().media.get(id).cloned().ok_or(ResultCode::NotFound)
	}

	async fn delete_media(&self, id: &str) -> CapabilityResult<()> {
		self.state.lock().media.remove(id).map(|_| ()).ok_or(ResultCode::NotFound)
	}
}

impl ProximitySensor for InMemoryDevice {
	fn read(&self) -> Option<ProximityReading> {
		self.state.lock().proximity
	}
}
