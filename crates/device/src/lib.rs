// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Capability backends for the HighWeb device handler.
//!
//! Each device domain (app launcher, sound, storage, CPU, calendar, contacts,
//! messaging, gallery, proximity sensor) is exposed as its own trait. The
//! handler never reaches into global state: it receives a [`Capabilities`]
//! bundle of `Arc<dyn Trait>` handles, any of which may be unbound.

pub mod applauncher;
pub mod calendar;
pub mod capabilities;
pub mod contact;
pub mod cpu;
pub mod gallery;
pub mod memory;
pub mod messaging;
pub mod result;
pub mod sensor;
pub mod sound;
pub mod storage;

pub use applauncher::{AppInfo, AppLauncher};
pub use calendar::{Calendar, CalendarEvent, EventFilter};
pub use capabilities::Capabilities;
pub use contact::{Contact, ContactQuery, Contacts};
pub use cpu::DeviceCpu;
pub use gallery::{Gallery, Media, MediaFilter, MediaType};
pub use memory::InMemoryDevice;
pub use messaging::{Message, MessageListener, MessageQuery, MessageType, Messaging, OutgoingMessage};
pub use result::{CapabilityResult, ResultCode};
pub use sensor::{ProximityReading, ProximitySensor};
pub use sound::{DeviceSound, OutputDeviceType, VolumeInfo};
pub use storage::{DeviceStorage, StorageType, StorageUnit};
