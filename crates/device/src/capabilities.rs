// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use crate::{AppLauncher, Calendar, Contacts, DeviceCpu, DeviceSound, DeviceStorage, Gallery, Messaging, ProximitySensor};

/// Bundle of capability backend handles injected into the handler.
///
/// The handler holds these as non-owning references in spirit: any handle may
/// be unbound (`None`), in which case requests for that domain complete with
/// a synthetic internal error instead of reaching a backend.
#[derive(Clone, Default)]
pub struct Capabilities {
	pub app_launcher: Option<Arc<dyn AppLauncher>>,
	pub sound: Option<Arc<dyn DeviceSound>>,
	pub storage: Option<Arc<dyn DeviceStorage>>,
	pub cpu: Option<Arc<dyn DeviceCpu>>,
	pub calendar: Option<Arc<dyn Calendar>>,
	pub contacts: Option<Arc<dyn Contacts>>,
	pub messaging: Option<Arc<dyn Messaging>>,
	pub gallery: Option<Arc<dyn Gallery>>,
	pub proximity: Option<Arc<dyn ProximitySensor>>,
}

impl Capabilities {
	/// An empty bundle with every domain unbound.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds every domain to the same device implementation.
	pub fn from_device<D>(device: Arc<D>) -> Self
	where
		D: AppLauncher
			+ DeviceSound
			+ DeviceStorage
			+ DeviceCpu
			+ Calendar
			+ Contacts
			+ Messaging
			+ Gallery
			+ ProximitySensor
			+ 'static,
	{
		Self {
			app_launcher: Some(device.clone()),
			sound: Some(device.clone()),
			storage: Some(device.clone()),
			cpu: Some(device.clone()),
			calendar: Some(device.clone()),
			contacts: Some(device.clone()),
			messaging: Some(device.clone()),
			gallery: Some(device.clone()),
			proximity: Some(device),
		}
	}

	pub fn with_app_launcher(mut self, backend: Arc<dyn AppLauncher>) -> Self {
		self.app_launcher = Some(backend);
		self
	}

	pub fn with_sound(mut self, backend: Arc<dyn DeviceSound>) -> Self {
		self.sound = Some(backend);
		self
	}

	pub fn with_storage(mut self, backend: Arc<dyn DeviceStorage>) -> Self {
		self.storage = Some(backend);
		self
	}

	pub fn with_cpu(mut self, backend: Arc<dyn DeviceCpu>) -> Self {
		self.cpu = Some(backend);
		self
	}

	pub fn with_calendar(mut self, backend: Arc<dyn Calendar>) -> Self {
		self.calendar = Some(backend);
		self
	}

	pub fn with_contacts(mut self, backend: Arc<dyn Contacts>) -> Self {
		self.contacts = Some(backend);
		self
	}

	pub fn with_messaging(mut self, backend: Arc<dyn Messaging>) -> Self {
		self.messaging = Some(backend);
		self
	}

	pub fn with_gallery(mut self, backend: Arc<dyn Gallery>) -> Self {
		self.gallery = Some(backend);
		self
	}

	pub fn with_proximity(mut self, backend: Arc<dyn ProximitySensor>) -> Self {
		self.proximity = Some(backend);
		self
	}
}

impl Debug for Capabilities {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Capabilities")
			.field("app_launcher", &self.app_launcher.is_some())
			.field("sound", &self.sound.is_some())
			.field("storage", &self.storage.is_some())
			.field("cpu", &self.cpu.is_some())
			.field("calendar", &self.calendar.is_some())
			.field("contacts", &self.contacts.is_some())
			.field("messaging", &self.messaging.is_some())
			.field("gallery", &self.gallery.is_some())
			.field("proximity", &self.proximity.is_some())
			.finish()
	}
}
