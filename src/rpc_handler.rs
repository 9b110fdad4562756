//! Request dispatcher for Web Portals.
//!
//! The presentation layer and the portal views reach the core through named
//! requests carrying JSON params. `handle_method` routes each one to the
//! owning component of the [`Shell`] and maps every failure to a message
//! string at this boundary.

use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::warn;

use crate::app::Shell;
use crate::managers::download_manager::DownloadManagerTrait;
use crate::managers::portal_store::PortalStoreTrait;
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::services::screen_share::media_stream_constraints;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::portal::ServiceDraft;
use crate::types::shortcut::KeyboardShortcut;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch one inbound request.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(shell: &Shell, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Presentation bridge ───
        "prompt" => {
            let label = str_param(params, "label")?.to_string();
            let default_value = params
                .get("defaultValue")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let dialog = shell.prompt_dialog();
            let answer = tokio::task::spawn_blocking(move || {
                dialog.prompt(&label, default_value.as_deref())
            })
            .await
            .map_err(|e| format!("prompt failed: {}", e))?;
            Ok(json!(answer))
        }
        "notificationClick" => {
            let service_id = str_param(params, "serviceId")?;
            shell.notification_click(service_id);
            Ok(json!({"ok": true}))
        }
        "openDevTools" => {
            let view_id = params
                .get("viewId")
                .and_then(|v| v.as_u64())
                .ok_or("missing viewId")?;
            shell
                .devtools()
                .open_devtools(view_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "webview-keyboard-shortcut" => {
            let shortcut: KeyboardShortcut =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid shortcut: {}", e))?;
            if shortcut.key.is_empty() {
                return Err("missing key".to_string());
            }
            shell.relay_keyboard_shortcut(shortcut);
            Ok(json!({"ok": true}))
        }

        // ─── Screen sharing ───
        "get-screens" => {
            let screens = shell.screen_share().get_screens().map_err(|e| {
                warn!(error = %e, "get-screens failed");
                e.to_string()
            })?;
            to_json(screens)
        }
        "get-mediastream-constraints" => {
            let source_id = str_param(params, "sourceId")?;
            to_json(media_stream_constraints(source_id))
        }
        "request-screen-picker" => {
            let service_id = str_param(params, "serviceId")?;
            let constraints = shell
                .screen_share()
                .request_picker(service_id)
                .await
                .map_err(|e| e.to_string())?;
            to_json(constraints)
        }
        "screen-picker-response" => {
            let request_id = params.get("requestId").and_then(|v| v.as_u64());
            let source_id = params
                .get("sourceId")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let delivered = shell.screen_share().respond(request_id, source_id);
            Ok(json!({"delivered": delivered}))
        }

        // ─── Downloads ───
        "download.list" => {
            let downloads = shell.downloads().list();
            to_json(downloads)
        }
        "download.pause" => {
            let id = str_param(params, "id")?;
            let paused = shell.downloads().pause(id);
            Ok(json!({"ok": paused}))
        }
        "download.resume" => {
            let id = str_param(params, "id")?;
            let resumed = shell.downloads().resume(id);
            Ok(json!({"ok": resumed}))
        }
        "download.cancel" => {
            let id = str_param(params, "id")?;
            shell.downloads().cancel(id);
            Ok(json!({"ok": true}))
        }
        "download.open" => {
            let path = PathBuf::from(str_param(params, "savePath")?);
            shell.downloads().open(&path).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "download.reveal" => {
            let path = PathBuf::from(str_param(params, "savePath")?);
            shell.downloads().reveal(&path).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Partitions ───
        "partition.list" => {
            let partitions = shell.portals().list_partitions().map_err(|e| e.to_string())?;
            to_json(partitions)
        }
        "partition.create" => {
            let name = str_param(params, "name")?;
            let partition = shell.portals().create_partition(name).map_err(|e| e.to_string())?;
            to_json(partition)
        }
        "partition.update" => {
            let id = str_param(params, "id")?;
            let name = str_param(params, "name")?;
            shell.portals().update_partition(id, name).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "partition.delete" => {
            let id = str_param(params, "id")?;
            shell.portals().delete_partition(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Services ───
        "service.list" => {
            let services = shell.portals().list_services().map_err(|e| e.to_string())?;
            to_json(services)
        }
        "service.create" => {
            let draft: ServiceDraft =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid service: {}", e))?;
            let service = shell.portals().create_service(&draft).map_err(|e| e.to_string())?;
            to_json(service)
        }
        "service.update" => {
            let id = str_param(params, "id")?;
            let draft: ServiceDraft =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid service: {}", e))?;
            shell.portals().update_service(id, &draft).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "service.reorder" => {
            let order: Vec<(String, i64)> = params
                .get("order")
                .and_then(|v| v.as_array())
                .ok_or("missing order")?
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let id = entry.get("id").and_then(|v| v.as_str());
                    let sort_order = entry.get("sortOrder").and_then(|v| v.as_i64());
                    match (id, sort_order) {
                        (Some(id), Some(sort_order)) => Ok((id.to_string(), sort_order)),
                        _ => Err(format!("invalid order entry at index {}", index)),
                    }
                })
                .collect::<Result<_, String>>()?;
            shell.portals().update_sort_order(&order).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "service.delete" => {
            let id = str_param(params, "id")?;
            shell.portals().delete_service(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "service.active" => {
            let active = shell.portals().active_service_id().map_err(|e| e.to_string())?;
            Ok(json!(active))
        }
        "service.setActive" => {
            let id = params.get("id").and_then(|v| v.as_str());
            shell
                .portals()
                .save_active_service_id(id)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "sidebar.visible" => {
            let visible = shell.portals().sidebar_visible().map_err(|e| e.to_string())?;
            Ok(json!(visible))
        }
        "sidebar.setVisible" => {
            let visible = params
                .get("visible")
                .and_then(|v| v.as_bool())
                .ok_or("missing visible")?;
            shell
                .portals()
                .save_sidebar_visible(visible)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Settings & shortcuts ───
        "settings.get" => {
            let settings = shell.settings().get_settings().clone();
            to_json(settings)
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            shell.settings().set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "shortcut.list" => to_json(shell.shortcuts().list_shortcuts()),

        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}
