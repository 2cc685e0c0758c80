// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The closed set of operations reachable through a request path.
//!
//! A request's action and path segments resolve to exactly one [`Endpoint`];
//! binding the endpoint to the request's `extra` object yields either a
//! backend [`Operation`] or a [`SubscriptionKind`].

use highweb_device::{CalendarEvent, Contact, ContactQuery, EventFilter, MediaFilter, MessageQuery, OutgoingMessage};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
	dispatch::{FunctionCode, PathCode, resolve_path_segment},
	response::WireError,
};

/// Capability domain, used to attribute backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
	AppLauncher,
	DeviceSound,
	DeviceStorage,
	DeviceCpu,
	Calendar,
	Contact,
	Messaging,
	DeviceGallery,
	Sensor,
}

impl Domain {
	/// Reason string of the synthetic `500` error for this domain.
	///
	/// The app launcher reason keeps its historical spelling, which deployed
	/// clients match on.
	pub fn internal_error_reason(self) -> &'static str {
		match self {
			Domain::AppLauncher => "appluancher_internal_error",
			Domain::DeviceSound => "devicesound_internal_error",
			Domain::DeviceStorage => "devicestorage_internal_error",
			Domain::DeviceCpu => "devicecpu_internal_error",
			Domain::Calendar => "calendar_internal_error",
			Domain::Contact => "contact_internal_error",
			Domain::Messaging => "messaging_internal_error",
			Domain::DeviceGallery => "devicegallery_internal_error",
			Domain::Sensor => "sensor_internal_error",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
	Cpu,
	Message,
	Proximity,
}

impl SubscriptionKind {
	pub fn domain(self) -> Domain {
		match self {
			SubscriptionKind::Cpu => Domain::DeviceCpu,
			SubscriptionKind::Message => Domain::Messaging,
			SubscriptionKind::Proximity => Domain::Sensor,
		}
	}
}

/// A resolved (action, path) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	GetAppList,
	GetApplicationInfo,
	LaunchApp,
	RemoveApp,
	OutputDeviceType,
	DeviceVolume,
	GetDeviceStorage,
	CpuLoad,
	FindEvent,
	AddEvent,
	UpdateEvent,
	DeleteEvent,
	FindContact,
	AddContact,
	UpdateContact,
	DeleteContact,
	FindMessage,
	SendMessage,
	OnMessageReceived,
	FindMedia,
	GetMedia,
	DeleteMedia,
	OnDeviceProximity,
}

/// A backend call with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
	GetAppList,
	GetApplicationInfo {
		app_id: String,
	},
	LaunchApp {
		app_id: String,
	},
	RemoveApp {
		app_id: String,
	},
	OutputDeviceType,
	DeviceVolume,
	GetDeviceStorage,
	FindEvent(EventFilter),
	AddEvent(CalendarEvent),
	UpdateEvent(CalendarEvent),
	DeleteEvent {
		id: String,
	},
	FindContact(ContactQuery),
	AddContact(Contact),
	UpdateContact(Contact),
	DeleteContact {
		id: String,
	},
	FindMessage(MessageQuery),
	SendMessage(OutgoingMessage),
	FindMedia(MediaFilter),
	GetMedia {
		id: String,
	},
	DeleteMedia {
		id: String,
	},
}

/// What a bound endpoint asks the handler to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
	Call(Operation),
	Subscribe(SubscriptionKind),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppIdParams {
	app_id: String,
}

#[derive(Deserialize)]
struct IdParams {
	id: String,
}

fn params<T: DeserializeOwned>(extra: Option<&Value>) -> Result<T, WireError> {
	let value = match extra {
		None | Some(Value::Null) => Value::Object(Map::new()),
		Some(value) => value.clone(),
	};
	serde_json::from_value(value).map_err(|_| WireError::BadRequest)
}

impl Endpoint {
	/// Resolves an action and path segments. Unknown segments or a verb that
	/// does not match the path yield `None`.
	pub fn resolve(action: FunctionCode, segments: &[&str]) -> Option<Self> {
		use FunctionCode::{Get, Set, Subscribe};
		use PathCode as P;

		let codes = segments.iter().map(|s| resolve_path_segment(s)).collect::<Option<Vec<_>>>()?;

		let endpoint = match (action, codes.as_slice()) {
			(Get, [P::Highweb, P::AppLauncher, P::GetAppList]) => Endpoint::GetAppList,
			(Get, [P::Highweb, P::AppLauncher, P::GetApplicationInfo]) => Endpoint::GetApplicationInfo,
			(Set, [P::Highweb, P::AppLauncher, P::LaunchApp]) => Endpoint::LaunchApp,
			(Set, [P::Highweb, P::AppLauncher, P::RemoveApp]) => Endpoint::RemoveApp,

			(Get, [P::Highweb, P::SystemInfo, P::DeviceSound, P::OutputDeviceType]) => Endpoint::OutputDeviceType,
			(Get, [P::Highweb, P::SystemInfo, P::DeviceSound, P::DeviceVolume]) => Endpoint::DeviceVolume,
			(Get, [P::Highweb, P::SystemInfo, P::DeviceStorage, P::GetDeviceStorage]) => Endpoint::GetDeviceStorage,
			(Subscribe, [P::Highweb, P::SystemInfo, P::DeviceCpu, P::Load]) => Endpoint::CpuLoad,

			(Get, [P::Highweb, P::Calendar, P::FindEvent]) => Endpoint::FindEvent,
			(Set, [P::Highweb, P::Calendar, P::AddEvent]) => Endpoint::AddEvent,
			(Set, [P::Highweb, P::Calendar, P::UpdateEvent]) => Endpoint::UpdateEvent,
			(Set, [P::Highweb, P::Calendar, P::DeleteEvent]) => Endpoint::DeleteEvent,

			(Get, [P::Highweb, P::Contact, P::FindContact]) => Endpoint::FindContact,
			(Set, [P::Highweb, P::Contact, P::AddContact]) => Endpoint::AddContact,
			(Set, [P::Highweb, P::Contact, P::UpdateContact]) => Endpoint::UpdateContact,
			(Set, [P::Highweb, P::Contact, P::DeleteContact]) => Endpoint::DeleteContact,

			(Get, [P::Highweb, P::Messaging, P::FindMessage]) => Endpoint::FindMessage,
			(Set, [P::Highweb, P::Messaging, P::SendMessage]) => Endpoint::SendMessage,
			(Subscribe, [P::Highweb, P::Messaging, P::OnMessageReceived]) => Endpoint::OnMessageReceived,

			(Get, [P::Highweb, P::DeviceGallery, P::FindMedia]) => Endpoint::FindMedia,
			(Get, [P::Highweb, P::DeviceGallery, P::GetMedia]) => Endpoint::GetMedia,
			(Set, [P::Highweb, P::DeviceGallery, P::DeleteMedia]) => Endpoint::DeleteMedia,

			(Subscribe, [P::Highweb, P::Sensor, P::OnDeviceProximity]) => Endpoint::OnDeviceProximity,

			_ => return None,
		};
		Some(endpoint)
	}

	pub fn domain(self) -> Domain {
		match self {
			Endpoint::GetAppList | Endpoint::GetApplicationInfo | Endpoint::LaunchApp | Endpoint::RemoveApp => {
				Domain::AppLauncher
			}
			Endpoint::OutputDeviceType | Endpoint::DeviceVolume => Domain::DeviceSound,
			Endpoint::GetDeviceStorage => Domain::DeviceStorage,
			Endpoint::CpuLoad => Domain::DeviceCpu,
			Endpoint::FindEvent | Endpoint::AddEvent | Endpoint::UpdateEvent | Endpoint::DeleteEvent => {
				Domain::Calendar
			}
			Endpoint::FindContact | Endpoint::AddContact | Endpoint::UpdateContact | Endpoint::DeleteContact => {
				Domain::Contact
			}
			Endpoint::FindMessage | Endpoint::SendMessage | Endpoint::OnMessageReceived => Domain::Messaging,
			Endpoint::FindMedia | Endpoint::GetMedia | Endpoint::DeleteMedia => Domain::DeviceGallery,
			Endpoint::OnDeviceProximity => Domain::Sensor,
		}
	}

	/// Binds the endpoint to the request's `extra` parameters.
	pub fn bind(self, extra: Option<&Value>) -> Result<Target, WireError> {
		let operation = match self {
			Endpoint::CpuLoad => return Ok(Target::Subscribe(SubscriptionKind::Cpu)),
			Endpoint::OnMessageReceived => return Ok(Target::Subscribe(SubscriptionKind::Message)),
			Endpoint::OnDeviceProximity => return Ok(Target::Subscribe(SubscriptionKind::Proximity)),

			Endpoint::GetAppList => Operation::GetAppList,
			Endpoint::GetApplicationInfo => Operation::GetApplicationInfo {
				app_id: params::<AppIdParams>(extra)?.app_id,
			},
			Endpoint::LaunchApp => Operation::LaunchApp {
				app_id: params::<AppIdParams>(extra)?.app_id,
			},
			Endpoint::RemoveApp => Operation::RemoveApp {
				app_id: params::<AppIdParams>(extra)?.app_id,
			},
			Endpoint::OutputDeviceType => Operation::OutputDeviceType,
			Endpoint::DeviceVolume => Operation::DeviceVolume,
			Endpoint::GetDeviceStorage => Operation::GetDeviceStorage,
			Endpoint::FindEvent => Operation::FindEvent(params(extra)?),
			Endpoint::AddEvent => Operation::AddEvent(params(extra)?),
			Endpoint::UpdateEvent => Operation::UpdateEvent(params(extra)?),
			Endpoint::DeleteEvent => Operation::DeleteEvent {
				id: params::<IdParams>(extra)?.id,
			},
			Endpoint::FindContact => Operation::FindContact(params(extra)?),
			Endpoint::AddContact => Operation::AddContact(params(extra)?),
			Endpoint::UpdateContact => Operation::UpdateContact(params(extra)?),
			Endpoint::DeleteContact => Operation::DeleteContact {
				id: params::<IdParams>(extra)?.id,
			},
			Endpoint::FindMessage => Operation::FindMessage(params(extra)?),
			Endpoint::SendMessage => Operation::SendMessage(params(extra)?),
			Endpoint::FindMedia => Operation::FindMedia(params(extra)?),
			Endpoint::GetMedia => Operation::GetMedia {
				id: params::<IdParams>(extra)?.id,
			},
			Endpoint::DeleteMedia => Operation::DeleteMedia {
				id: params::<IdParams>(extra)?.id,
			},
		};
		Ok(Target::Call(operation))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn resolve(action: FunctionCode, path: &str) -> Option<Endpoint> {
		let segments: Vec<&str> = path.split('.').collect();
		Endpoint::resolve(action, &segments)
	}

	#[test]
	fn test_resolve_canonical_paths() {
		use FunctionCode::*;

		assert_eq!(resolve(Get, "highweb.applauncher.getapplist"), Some(Endpoint::GetAppList));
		assert_eq!(resolve(Set, "highweb.applauncher.launchapp"), Some(Endpoint::LaunchApp));
		assert_eq!(
			resolve(Get, "highweb.systeminfo.devicesound.outputdevicetype"),
			Some(Endpoint::OutputDeviceType)
		);
		assert_eq!(
			resolve(Get, "highweb.systeminfo.devicestorage.getdevicestorage"),
			Some(Endpoint::GetDeviceStorage)
		);
		assert_eq!(resolve(Subscribe, "highweb.systeminfo.devicecpu.load"), Some(Endpoint::CpuLoad));
		assert_eq!(resolve(Set, "highweb.calendar.deleteevent"), Some(Endpoint::DeleteEvent));
		assert_eq!(resolve(Get, "highweb.contact.findcontact"), Some(Endpoint::FindContact));
		assert_eq!(resolve(Subscribe, "highweb.messaging.onmessagereceived"), Some(Endpoint::OnMessageReceived));
		assert_eq!(resolve(Get, "highweb.devicegallery.getmedia"), Some(Endpoint::GetMedia));
		assert_eq!(resolve(Subscribe, "highweb.sensor.ondeviceproximity"), Some(Endpoint::OnDeviceProximity));
	}

	#[test]
	fn test_resolve_rejects_wrong_verb_and_unknown_segments() {
		use FunctionCode::*;

		assert_eq!(resolve(Set, "highweb.applauncher.getapplist"), None);
		assert_eq!(resolve(Get, "highweb.systeminfo.devicecpu.load"), None);
		assert_eq!(resolve(Get, "web.applauncher.getapplist"), None);
		assert_eq!(resolve(Get, "highweb.applauncher"), None);
		assert_eq!(resolve(Get, "highweb.applauncher.getapplist.extra"), None);
		assert_eq!(resolve(Get, "highweb..getapplist"), None);
	}

	#[test]
	fn test_bind_app_id() {
		let target = Endpoint::LaunchApp.bind(Some(&json!({"appId": "com.a"}))).unwrap();
		assert_eq!(
			target,
			Target::Call(Operation::LaunchApp {
				app_id: "com.a".to_string()
			})
		);

		assert_eq!(Endpoint::LaunchApp.bind(None), Err(WireError::BadRequest));
		assert_eq!(Endpoint::LaunchApp.bind(Some(&json!({"appId": 3}))), Err(WireError::BadRequest));
	}

	#[test]
	fn test_bind_optional_extra() {
		assert_eq!(
			Endpoint::FindEvent.bind(None).unwrap(),
			Target::Call(Operation::FindEvent(EventFilter::default()))
		);
		assert_eq!(
			Endpoint::FindMedia.bind(Some(&Value::Null)).unwrap(),
			Target::Call(Operation::FindMedia(MediaFilter::default()))
		);
	}

	#[test]
	fn test_bind_subscription() {
		assert_eq!(Endpoint::CpuLoad.bind(None).unwrap(), Target::Subscribe(SubscriptionKind::Cpu));
		assert_eq!(
			Endpoint::OnDeviceProximity.bind(None).unwrap(),
			Target::Subscribe(SubscriptionKind::Proximity)
		);
	}

	#[test]
	fn test_applauncher_reason_spelling() {
		assert_eq!(Domain::AppLauncher.internal_error_reason(), "appluancher_internal_error");
	}
}
