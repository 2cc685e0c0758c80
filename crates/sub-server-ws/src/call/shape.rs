// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Binding operations to backends and shaping their results into wire JSON.

use futures_util::{FutureExt, future::BoxFuture};
use highweb_device::{CapabilityResult, Capabilities, ResultCode};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::operation::Operation;

/// Wraps a successful payload under `resultCode: 0`, or reports the
/// backend's failure code alone.
pub(crate) fn shape<T>(result: CapabilityResult<T>, payload: impl FnOnce(T) -> Value) -> Value {
	match result {
		Ok(value) => with_result_code(ResultCode::Success, payload(value)),
		Err(code) => with_result_code(code, Value::Null),
	}
}

/// `{resultCode, <key>: id}` on either outcome, for operations that act on a
/// single identified record.
pub(crate) fn ack(result: CapabilityResult<()>, key: &str, id: String) -> Value {
	let code = result.err().unwrap_or(ResultCode::Success);
	with_result_code(code, json!({ key: id }))
}

fn with_result_code(code: ResultCode, payload: Value) -> Value {
	let mut object = Map::new();
	object.insert("resultCode".to_string(), json!(code));
	if let Value::Object(fields) = payload {
		object.extend(fields);
	}
	Value::Object(object)
}

fn to_value<T: Serialize>(value: T) -> Value {
	serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Prepares the single backend call for `operation`.
///
/// Returns `None` when the owning backend is unbound; the caller reports the
/// domain's internal error instead.
pub fn prepare(operation: Operation, capabilities: &Capabilities) -> Option<BoxFuture<'static, Value>> {
	let future = match operation {
		Operation::GetAppList => {
			let backend = capabilities.app_launcher.clone()?;
			async move { shape(backend.app_list().await, |apps| json!({ "appList": to_value(apps) })) }.boxed()
		}
		Operation::GetApplicationInfo {
			app_id,
		} => {
			let backend = capabilities.app_launcher.clone()?;
			async move {
				shape(backend.application_info(&app_id).await, |info| json!({ "appInfo": to_value(info) }))
			}
			.boxed()
		}
		Operation::LaunchApp {
			app_id,
		} => {
			let backend = capabilities.app_launcher.clone()?;
			async move { ack(backend.launch_app(&app_id).await, "appId", app_id) }.boxed()
		}
		Operation::RemoveApp {
			app_id,
		} => {
			let backend = capabilities.app_launcher.clone()?;
			async move { ack(backend.remove_app(&app_id).await, "appId", app_id) }.boxed()
		}

		Operation::OutputDeviceType => {
			let backend = capabilities.sound.clone()?;
			async move {
				shape(backend.output_device_type().await, |output| {
					json!({ "outputDeviceType": to_value(output) })
				})
			}
			.boxed()
		}
		Operation::DeviceVolume => {
			let backend = capabilities.sound.clone()?;
			async move { shape(backend.device_volume().await, |volume| json!({ "volume": to_value(volume) })) }
				.boxed()
		}
		Operation::GetDeviceStorage => {
			let backend = capabilities.storage.clone()?;
			async move {
				shape(backend.device_storage().await, |units| json!({ "storageList": to_value(units) }))
			}
			.boxed()
		}

		Operation::FindEvent(filter) => {
			let backend = capabilities.calendar.clone()?;
			async move {
				shape(backend.find_events(&filter).await, |events| json!({ "calendarList": to_value(events) }))
			}
			.boxed()
		}
		Operation::AddEvent(event) => {
			let backend = capabilities.calendar.clone()?;
			async move { shape(backend.add_event(event).await, |id| json!({ "id": id })) }.boxed()
		}
		Operation::UpdateEvent(event) => {
			let backend = capabilities.calendar.clone()?;
			async move {
				let id = event.id.clone();
				ack(backend.update_event(event).await, "id", id)
			}
			.boxed()
		}
		Operation::DeleteEvent {
			id,
		} => {
			let backend = capabilities.calendar.clone()?;
			async move { ack(backend.delete_event(&id).await, "id", id) }.boxed()
		}

		Operation::FindContact(query) => {
			let backend = capabilities.contacts.clone()?;
			async move {
				shape(backend.find_contacts(&query).await, |contacts| {
					json!({ "contactList": to_value(contacts) })
				})
			}
			.boxed()
		}
		Operation::AddContact(contact) => {
			let backend = capabilities.contacts.clone()?;
			async move { shape(backend.add_contact(contact).await, |id| json!({ "id": id })) }.boxed()
		}
		Operation::UpdateContact(contact) => {
			let backend = capabilities.contacts.clone()?;
			async move {
				let id = contact.id.clone();
				ack(backend.update_contact(contact).await, "id", id)
			}
			.boxed()
		}
		Operation::DeleteContact {
			id,
		} => {
			let backend = capabilities.contacts.clone()?;
			async move { ack(backend.delete_contact(&id).await, "id", id) }.boxed()
		}

		Operation::FindMessage(query) => {
			let backend = capabilities.messaging.clone()?;
			async move {
				shape(backend.find_messages(&query).await, |messages| {
					json!({ "messageList": to_value(messages) })
				})
			}
			.boxed()
		}
		Operation::SendMessage(message) => {
			let backend = capabilities.messaging.clone()?;
			async move { shape(backend.send_message(message).await, |id| json!({ "id": id })) }.boxed()
		}

		Operation::FindMedia(filter) => {
			let backend = capabilities.gallery.clone()?;
			async move {
				shape(backend.find_media(&filter).await, |media| json!({ "mediaList": to_value(media) }))
			}
			.boxed()
		}
		Operation::GetMedia {
			id,
		} => {
			let backend = capabilities.gallery.clone()?;
			async move { shape(backend.get_media(&id).await, |media| json!({ "media": to_value(media) })) }.boxed()
		}
		Operation::DeleteMedia {
			id,
		} => {
			let backend = capabilities.gallery.clone()?;
			async move { ack(backend.delete_media(&id).await, "id", id) }.boxed()
		}
	};
	Some(future)
}
