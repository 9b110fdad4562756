//! Unit tests for the request dispatcher, driven through a fully wired shell.

#[path = "../support/mod.rs"]
mod support;

use std::sync::atomic::Ordering;

use serde_json::{json, Value};

use webportals::app::Shell;
use webportals::managers::download_manager::DownloadManagerTrait;
use webportals::rpc_handler::handle_method;
use webportals::types::notification::Notification;

use support::{build_shell, build_shell_with_prompt, plain_platform, visible_focused, FakeTransfer, VIEW_ID};

async fn call(shell: &Shell, method: &str, params: Value) -> Result<Value, String> {
    handle_method(shell, method, &params).await
}

fn command_modifiers() -> Value {
    if cfg!(target_os = "macos") {
        json!({"meta": true})
    } else {
        json!({"ctrl": true})
    }
}

#[tokio::test]
async fn test_ping() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    assert_eq!(call(&shell, "ping", json!({})).await.unwrap(), json!({"pong": true}));
}

#[tokio::test]
async fn test_unknown_method() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let err = call(&shell, "nope", json!({})).await.unwrap_err();
    assert_eq!(err, "unknown method: nope");
}

#[tokio::test]
async fn test_prompt_returns_answer() {
    let (shell, h) = build_shell_with_prompt(visible_focused(), plain_platform(), Some("typed"));
    let result = call(&shell, "prompt", json!({"label": "Name?", "defaultValue": "x"}))
        .await
        .unwrap();

    assert_eq!(result, json!("typed"));
    assert_eq!(
        h.prompt.asked.lock().unwrap().clone(),
        vec![("Name?".to_string(), Some("x".to_string()))]
    );
}

#[tokio::test]
async fn test_prompt_cancelled_is_null() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let result = call(&shell, "prompt", json!({"label": "Name?"})).await.unwrap();
    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn test_prompt_requires_label() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    assert_eq!(call(&shell, "prompt", json!({})).await.unwrap_err(), "missing label");
}

#[tokio::test]
async fn test_notification_click_activates_service_and_reveals() {
    let (shell, h) = build_shell(
        webportals::types::visibility::WindowSnapshot::default(),
        plain_platform(),
    );

    call(&shell, "notificationClick", json!({"serviceId": "svc-9"}))
        .await
        .unwrap();

    assert_eq!(
        h.notifier.sent(),
        vec![Notification::MakeServiceActive {
            service_id: "svc-9".to_string()
        }]
    );
    let window = *h.window.lock().unwrap();
    assert!(window.visible && window.focused);
}

#[tokio::test]
async fn test_keyboard_shortcut_toggle_sidebar_is_relayed() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());
    let mut params = command_modifiers();
    params["key"] = json!("b");

    call(&shell, "webview-keyboard-shortcut", params).await.unwrap();

    assert_eq!(h.notifier.channels(), vec!["process-keyboard-shortcut"]);
    match &h.notifier.sent()[0] {
        Notification::ProcessKeyboardShortcut { shortcut, action } => {
            assert_eq!(shortcut.key, "b");
            assert_eq!(action.as_deref(), Some("toggle_sidebar"));
        }
        other => panic!("unexpected notification {:?}", other),
    }
}

#[tokio::test]
async fn test_keyboard_shortcut_relayed_with_action() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());
    let mut params = command_modifiers();
    params["key"] = json!("f");

    call(&shell, "webview-keyboard-shortcut", params).await.unwrap();

    match &h.notifier.sent()[0] {
        Notification::ProcessKeyboardShortcut { shortcut, action } => {
            assert_eq!(shortcut.key, "f");
            assert_eq!(action.as_deref(), Some("find_in_page"));
        }
        other => panic!("unexpected notification {:?}", other),
    }

    call(&shell, "webview-keyboard-shortcut", json!({"key": "x"}))
        .await
        .unwrap();
    assert_eq!(h.notifier.count("process-keyboard-shortcut"), 2);
}

#[tokio::test]
async fn test_keyboard_shortcut_requires_key() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());
    let err = call(&shell, "webview-keyboard-shortcut", json!({"ctrl": true}))
        .await
        .unwrap_err();
    assert_eq!(err, "missing key");
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_open_devtools() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());

    let result = call(&shell, "openDevTools", json!({"viewId": VIEW_ID})).await.unwrap();
    assert_eq!(result, json!({"ok": true}));
    assert_eq!(h.view.surface.focused.load(Ordering::SeqCst), 1);

    let err = call(&shell, "openDevTools", json!({"viewId": 99})).await.unwrap_err();
    assert_eq!(err, "View not found: 99");
    assert_eq!(
        call(&shell, "openDevTools", json!({})).await.unwrap_err(),
        "missing viewId"
    );
}

#[tokio::test]
async fn test_mediastream_constraints() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let result = call(&shell, "get-mediastream-constraints", json!({"sourceId": "screen:1:0"}))
        .await
        .unwrap();
    assert_eq!(
        result,
        json!({
            "audio": false,
            "video": {"mandatory": {"chromeMediaSource": "desktop", "chromeMediaSourceId": "screen:1:0"}}
        })
    );
}

#[tokio::test]
async fn test_screen_picker_round_trip() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());

    let answer = async {
        while h.notifier.count("request-screen-sharing") == 0 {
            tokio::task::yield_now().await;
        }
        call(&shell, "screen-picker-response", json!({"requestId": 1, "sourceId": "screen:0:0"}))
            .await
            .unwrap()
    };
    let (picked, delivered) = tokio::join!(
        call(&shell, "request-screen-picker", json!({"serviceId": "svc-1"})),
        answer
    );

    assert_eq!(delivered, json!({"delivered": true}));
    assert_eq!(
        picked.unwrap()["video"]["mandatory"]["chromeMediaSourceId"],
        "screen:0:0"
    );
}

#[tokio::test]
async fn test_screen_picker_dismissed_is_null() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());

    let answer = async {
        while h.notifier.count("request-screen-sharing") == 0 {
            tokio::task::yield_now().await;
        }
        call(&shell, "screen-picker-response", json!({})).await.unwrap()
    };
    let (picked, _) = tokio::join!(
        call(&shell, "request-screen-picker", json!({"serviceId": "svc-1"})),
        answer
    );

    assert_eq!(picked.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_stray_picker_response() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let result = call(&shell, "screen-picker-response", json!({"sourceId": "screen:0:0"}))
        .await
        .unwrap();
    assert_eq!(result, json!({"delivered": false}));
}

#[tokio::test]
async fn test_download_controls() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());
    let (transfer, state) = FakeTransfer::new(1, "report.pdf", 1000);
    let id = shell.downloads().on_transfer_requested(transfer).unwrap();

    let listed = call(&shell, "download.list", json!({})).await.unwrap();
    assert_eq!(listed[0]["id"], json!(id));
    assert_eq!(listed[0]["filename"], "report.pdf");
    assert_eq!(listed[0]["state"], "progressing");

    let paused = call(&shell, "download.pause", json!({"id": id})).await.unwrap();
    assert_eq!(paused, json!({"ok": true}));
    assert!(state.lock().unwrap().paused);

    let resumed = call(&shell, "download.resume", json!({"id": id})).await.unwrap();
    assert_eq!(resumed, json!({"ok": true}));

    call(&shell, "download.cancel", json!({"id": id})).await.unwrap();
    assert!(state.lock().unwrap().cancelled);

    assert_eq!(
        call(&shell, "download.pause", json!({"id": "missing"})).await.unwrap(),
        json!({"ok": false})
    );

    let path = h.dir.path().join("report.pdf");
    call(&shell, "download.reveal", json!({"savePath": path.to_string_lossy()}))
        .await
        .unwrap();
    assert_eq!(h.opener.revealed.lock().unwrap().clone(), vec![path]);
}

#[tokio::test]
async fn test_download_open_failure_is_reported() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());
    h.opener.fail(true);
    let result = call(&shell, "download.open", json!({"savePath": "/tmp/x.zip"})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_partition_and_service_flow() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());

    let partition = call(&shell, "partition.create", json!({"name": "Work"})).await.unwrap();
    let partition_id = partition["id"].as_str().unwrap().to_string();

    let service = call(
        &shell,
        "service.create",
        json!({"partitionId": partition_id, "name": "Mail", "url": "https://mail.example.com"}),
    )
    .await
    .unwrap();
    let service_id = service["id"].as_str().unwrap().to_string();
    assert_eq!(service["enabled"], true);
    assert_eq!(service["sortOrder"], Value::Null);

    call(
        &shell,
        "service.update",
        json!({
            "id": service_id,
            "partitionId": partition_id,
            "name": "Webmail",
            "url": "https://mail.example.com",
            "hidden": true
        }),
    )
    .await
    .unwrap();
    call(&shell, "service.reorder", json!({"order": [{"id": service_id, "sortOrder": 3}]}))
        .await
        .unwrap();

    let services = call(&shell, "service.list", json!({})).await.unwrap();
    assert_eq!(services[0]["name"], "Webmail");
    assert_eq!(services[0]["hidden"], true);
    assert_eq!(services[0]["sortOrder"], 3);

    call(&shell, "partition.delete", json!({"id": partition_id})).await.unwrap();
    assert_eq!(call(&shell, "service.list", json!({})).await.unwrap(), json!([]));
    assert_eq!(call(&shell, "partition.list", json!({})).await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_store_errors_are_messages() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let err = call(&shell, "partition.update", json!({"id": "missing", "name": "x"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Record not found: partition missing");

    let err = call(&shell, "service.create", json!({"name": "Mail"})).await.unwrap_err();
    assert!(err.starts_with("invalid service:"));
}

#[tokio::test]
async fn test_reorder_rejects_malformed_entries() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let partition = call(&shell, "partition.create", json!({"name": "Work"})).await.unwrap();
    let service = call(
        &shell,
        "service.create",
        json!({"partitionId": partition["id"], "name": "Mail", "url": "https://mail.example.com"}),
    )
    .await
    .unwrap();

    let err = call(
        &shell,
        "service.reorder",
        json!({"order": [{"id": service["id"], "sortOrder": 1}, {"id": "svc-2", "sortOrder": "2"}]}),
    )
    .await
    .unwrap_err();
    assert_eq!(err, "invalid order entry at index 1");

    let err = call(&shell, "service.reorder", json!({"order": [{"sortOrder": 1}]}))
        .await
        .unwrap_err();
    assert_eq!(err, "invalid order entry at index 0");

    // Nothing was applied from the rejected request.
    let services = call(&shell, "service.list", json!({})).await.unwrap();
    assert_eq!(services[0]["sortOrder"], Value::Null);
}

#[tokio::test]
async fn test_sidebar_and_active_service_preferences() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());

    assert_eq!(call(&shell, "sidebar.visible", json!({})).await.unwrap(), json!(true));
    call(&shell, "sidebar.setVisible", json!({"visible": false})).await.unwrap();
    assert_eq!(call(&shell, "sidebar.visible", json!({})).await.unwrap(), json!(false));

    assert_eq!(call(&shell, "service.active", json!({})).await.unwrap(), Value::Null);
    call(&shell, "service.setActive", json!({"id": "svc-1"})).await.unwrap();
    assert_eq!(call(&shell, "service.active", json!({})).await.unwrap(), json!("svc-1"));
    call(&shell, "service.setActive", json!({})).await.unwrap();
    assert_eq!(call(&shell, "service.active", json!({})).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_settings_get_and_set() {
    let (shell, h) = build_shell(visible_focused(), plain_platform());

    let settings = call(&shell, "settings.get", json!({})).await.unwrap();
    assert_eq!(settings["general"]["product_name"], "Web Portals");

    call(&shell, "settings.set", json!({"key": "devtools.max_attempts", "value": 5}))
        .await
        .unwrap();
    let settings = call(&shell, "settings.get", json!({})).await.unwrap();
    assert_eq!(settings["devtools"]["max_attempts"], 5);
    assert!(h.dir.path().join("settings.json").exists());

    let err = call(&shell, "settings.set", json!({"key": "devtools.max_attempts"}))
        .await
        .unwrap_err();
    assert_eq!(err, "missing value");
}

#[tokio::test]
async fn test_shortcut_list() {
    let (shell, _h) = build_shell(visible_focused(), plain_platform());
    let shortcuts = call(&shell, "shortcut.list", json!({})).await.unwrap();
    assert_eq!(shortcuts["toggle_fullscreen"], "F11");
}
