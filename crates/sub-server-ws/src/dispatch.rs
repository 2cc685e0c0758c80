// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Static string to code lookup for actions and path segments.
//!
//! Lookups are exact and case-sensitive. The one exception is the
//! `unsubscribeAll` action, which is also accepted spelled `unsubscribeall`.

/// Request action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
	Authorize,
	Get,
	Set,
	Subscribe,
	Unsubscribe,
	UnsubscribeAll,
}

/// One dot-separated segment of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathCode {
	Highweb,
	// applauncher
	AppLauncher,
	GetAppList,
	GetApplicationInfo,
	LaunchApp,
	RemoveApp,
	// systeminfo
	SystemInfo,
	DeviceSound,
	OutputDeviceType,
	DeviceVolume,
	DeviceStorage,
	GetDeviceStorage,
	DeviceCpu,
	Load,
	// calendar
	Calendar,
	FindEvent,
	AddEvent,
	UpdateEvent,
	DeleteEvent,
	// contact
	Contact,
	FindContact,
	AddContact,
	UpdateContact,
	DeleteContact,
	// messaging
	Messaging,
	FindMessage,
	SendMessage,
	OnMessageReceived,
	// devicegallery
	DeviceGallery,
	FindMedia,
	GetMedia,
	DeleteMedia,
	// sensor
	Sensor,
	OnDeviceProximity,
}

pub fn resolve_action(name: &str) -> Option<FunctionCode> {
	let code = match name {
		"authorize" => FunctionCode::Authorize,
		"get" => FunctionCode::Get,
		"set" => FunctionCode::Set,
		"subscribe" => FunctionCode::Subscribe,
		"unsubscribe" => FunctionCode::Unsubscribe,
		"unsubscribeAll" | "unsubscribeall" => FunctionCode::UnsubscribeAll,
		_ => return None,
	};
	Some(code)
}

pub fn resolve_path_segment(name: &str) -> Option<PathCode> {
	let code = match name {
		"highweb" => PathCode::Highweb,
		"applauncher" => PathCode::AppLauncher,
		"getapplist" => PathCode::GetAppList,
		"getapplicationinfo" => PathCode::GetApplicationInfo,
		"launchapp" => PathCode::LaunchApp,
		"removeapp" => PathCode::RemoveApp,
		"systeminfo" => PathCode::SystemInfo,
		"devicesound" => PathCode::DeviceSound,
		"outputdevicetype" => PathCode::OutputDeviceType,
		"devicevolume" => PathCode::DeviceVolume,
		"devicestorage" => PathCode::DeviceStorage,
		"getdevicestorage" => PathCode::GetDeviceStorage,
		"devicecpu" => PathCode::DeviceCpu,
		"load" => PathCode::Load,
		"calendar" => PathCode::Calendar,
		"findevent" => PathCode::FindEvent,
		"addevent" => PathCode::AddEvent,
		"updateevent" => PathCode::UpdateEvent,
		"deleteevent" => PathCode::DeleteEvent,
		"contact" => PathCode::Contact,
		"findcontact" => PathCode::FindContact,
		"addcontact" => PathCode::AddContact,
		"updatecontact" => PathCode::UpdateContact,
		"deletecontact" => PathCode::DeleteContact,
		"messaging" => PathCode::Messaging,
		"findmessage" => PathCode::FindMessage,
		"sendmessage" => PathCode::SendMessage,
		"onmessagereceived" => PathCode::OnMessageReceived,
		"devicegallery" => PathCode::DeviceGallery,
		"findmedia" => PathCode::FindMedia,
		"getmedia" => PathCode::GetMedia,
		"deletemedia" => PathCode::DeleteMedia,
		"sensor" => PathCode::Sensor,
		"ondeviceproximity" => PathCode::OnDeviceProximity,
		_ => return None,
	};
	Some(code)
}
