//! Native shell built on `tao` + `wry` + `tray-icon`.
//!
//! Architecture:
//! - One main window. The presentation view (sidebar, pickers, download list)
//!   fills it and is served from the `wp://` custom protocol.
//! - Each portal is a child webview laid over the presentation view at the
//!   bounds the presentation reports. Portals of one partition share a
//!   `WebContext` rooted at `<data dir>/partitions/<partition id>`.
//! - IPC from either kind of view arrives as `{id, method, params}` and is
//!   answered through `window.__wp_reply`. Core notifications are delivered
//!   to the presentation view through `window.__wp_notify`.
//! - Requests run on a tokio runtime; results come back as `UserEvent`s.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tao::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize};
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopWindowTarget};
use tao::window::{Fullscreen, Window, WindowBuilder};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use wry::{WebContext, WebView, WebViewBuilder};

use super::bridge::{
    display_info, lock, InFlight, LoopHandle, MonitorCapture, ProxyDock, ProxyTray,
    ProxyViews, ProxyWindow, ReplyTarget, RfdSaveDialog, TransferTable, UserEvent,
    ViewRegistry, WebviewNotifier, WebviewPrompt, WindowCommand, WryTransfer,
};
use crate::app::{Shell, ShellDeps};
use crate::database::connection::Database;
use crate::managers::download_manager::DownloadManagerTrait;
use crate::platform::{self, PlatformShell};
use crate::rpc_handler;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::single_instance::{self, InstanceRole};
use crate::services::visibility::PlatformTraits;
use crate::services::window_state::WindowStateKeeper;
use crate::types::download::NativeOutcome;
use crate::types::errors::{ShellError, StoreError};
use crate::types::screen::Rect;
use crate::types::session::SessionId;
use crate::types::settings::WindowSettings;
use crate::types::visibility::{CloseAction, TrayAction, TrayMenu, WindowSignal, WindowSnapshot};

const INDEX_HTML: &str = include_str!("../../resources/ui/index.html");
const PRESENTATION_JS: &str = include_str!("../../resources/ui/presentation.js");
const PORTAL_JS: &str = include_str!("../../resources/ui/portal.js");

/// Requests a portal view may issue. Everything else is reserved for the
/// presentation view.
const PORTAL_METHODS: &[&str] = &[
    "webview-keyboard-shortcut",
    "request-screen-picker",
    "get-screens",
    "get-mediastream-constraints",
    "notificationClick",
];

fn gui_err(e: impl std::fmt::Display) -> ShellError {
    ShellError::Gui(e.to_string())
}

fn serve_ui(path: &str) -> wry::http::Response<Cow<'static, [u8]>> {
    let (body, mime): (&'static str, &str) = match path {
        "/presentation.js" => (PRESENTATION_JS, "text/javascript"),
        _ => (INDEX_HTML, "text/html; charset=utf-8"),
    };
    wry::http::Response::builder()
        .header(wry::http::header::CONTENT_TYPE, mime)
        .body(Cow::Borrowed(body.as_bytes()))
        .unwrap_or_else(|_| wry::http::Response::new(Cow::Borrowed(body.as_bytes())))
}

fn observe(window: &Window) -> WindowSnapshot {
    WindowSnapshot {
        minimized: window.is_minimized(),
        visible: window.is_visible(),
        focused: window.is_focused(),
        fullscreen: window.fullscreen().is_some(),
    }
}

fn initial_size(event_loop: &EventLoop<UserEvent>, settings: &WindowSettings) -> LogicalSize<f64> {
    match event_loop.primary_monitor() {
        Some(monitor) => {
            let area: LogicalSize<f64> = monitor.size().to_logical(monitor.scale_factor());
            LogicalSize::new(
                area.width * settings.width_ratio,
                area.height * settings.height_ratio,
            )
        }
        None => LogicalSize::new(1280.0, 800.0),
    }
}

fn bounds_from(params: &Value) -> Result<wry::Rect, String> {
    let bounds = params.get("bounds").ok_or("missing bounds")?;
    let field = |name: &str| {
        bounds
            .get(name)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| format!("missing bounds.{}", name))
    };
    Ok(wry::Rect {
        position: LogicalPosition::new(field("x")?, field("y")?).into(),
        size: LogicalSize::new(field("width")?, field("height")?).into(),
    })
}

fn full_window_bounds(window: &Window) -> wry::Rect {
    let size: LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    wry::Rect {
        position: LogicalPosition::new(0.0, 0.0).into(),
        size: size.into(),
    }
}

fn tray_icon_image() -> Result<tray_icon::Icon, ShellError> {
    const SIZE: u32 = 32;
    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let border = x < 3 || y < 3 || x >= SIZE - 3 || y >= SIZE - 3;
            let sidebar = x < 11;
            let pixel = match (border, sidebar) {
                (true, _) => [0x24, 0x29, 0x2f, 0xff],
                (false, true) => [0x0a, 0x84, 0xff, 0xff],
                (false, false) => [0xf6, 0xf8, 0xfa, 0xff],
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    tray_icon::Icon::from_rgba(rgba, SIZE, SIZE).map_err(gui_err)
}

struct PortalView {
    webview: WebView,
    service_id: String,
    session: SessionId,
}

struct ShellApp {
    shell: Arc<Shell>,
    runtime: Runtime,
    handle: LoopHandle,
    window: Window,
    presentation: WebView,
    portals: HashMap<u64, PortalView>,
    contexts: HashMap<SessionId, WebContext>,
    next_view_id: u64,
    transfers: Arc<Mutex<TransferTable>>,
    views: Arc<Mutex<ViewRegistry>>,
    mirror: Arc<Mutex<WindowSnapshot>>,
    observed: WindowSnapshot,
    product_name: String,
    data_dir: PathBuf,
    tray: Option<TrayIcon>,
    pending_menu: Option<TrayMenu>,
    tray_actions: HashMap<MenuId, TrayAction>,
    sidebar_item: Option<MenuId>,
    window_state: WindowStateKeeper,
    /// Owned so the installed application menu outlives `init_native_menus`.
    _app_menu: Option<Menu>,
}

/// Starts the shell and runs the event loop until quit.
pub fn run(settings: SettingsEngine, start_minimized: bool) -> Result<(), ShellError> {
    let current = settings.get_settings().clone();
    let data_dir = platform::get_data_dir();
    fs::create_dir_all(&data_dir)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("webportals-worker")
        .build()?;
    let instance = match runtime.block_on(single_instance::acquire(&data_dir))? {
        InstanceRole::Primary(guard) => guard,
        InstanceRole::Secondary => {
            info!("already running, handed off to the running instance");
            return Ok(());
        }
    };

    let db = Database::open(data_dir.join("portals.db")).map_err(StoreError::from)?;

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let handle = LoopHandle::new(event_loop.create_proxy());

    let tray_handle = handle.clone();
    TrayIconEvent::set_event_handler(Some(move |event| {
        tray_handle.send(UserEvent::Tray(event));
    }));
    let menu_handle = handle.clone();
    MenuEvent::set_event_handler(Some(move |event| {
        menu_handle.send(UserEvent::Menu(event));
    }));

    let mut window_state = WindowStateKeeper::new(None);
    let remembered = window_state.load().unwrap_or_else(|e| {
        warn!(error = %e, "window state ignored");
        None
    });
    let maximized = remembered.map_or(current.window.maximized, |g| g.maximized);
    let displays: Vec<Rect> = event_loop
        .available_monitors()
        .map(|monitor| {
            let (position, size) = (monitor.position(), monitor.size());
            Rect::new(position.x, position.y, size.width, size.height)
        })
        .collect();

    let builder = WindowBuilder::new()
        .with_title(&current.general.product_name)
        .with_maximized(maximized && !start_minimized)
        .with_visible(!start_minimized);
    let builder = match window_state.restorable_bounds(&displays) {
        Some(bounds) => builder
            .with_position(PhysicalPosition::new(bounds.x, bounds.y))
            .with_inner_size(PhysicalSize::new(bounds.width, bounds.height)),
        None => builder.with_inner_size(initial_size(&event_loop, &current.window)),
    };
    let window = builder.build(&event_loop).map_err(gui_err)?;

    let observed = observe(&window);
    let mirror = Arc::new(Mutex::new(observed));
    let views = Arc::new(Mutex::new(ViewRegistry::default()));

    let deps = ShellDeps {
        notifier: Arc::new(WebviewNotifier::new(handle.clone())),
        prompt: Arc::new(WebviewPrompt::new(handle.clone())),
        save_dialog: Arc::new(RfdSaveDialog),
        opener: Arc::new(PlatformShell),
        capture: Arc::new(MonitorCapture::new(handle.clone())),
        views: Arc::new(ProxyViews::new(handle.clone(), views.clone())),
        window: Box::new(ProxyWindow::new(handle.clone(), mirror.clone())),
        tray: Box::new(ProxyTray::new(handle.clone())),
        dock: Some(Box::new(ProxyDock::new(handle.clone()))),
        platform: PlatformTraits::current(),
    };
    let shell = Arc::new(Shell::new(settings, db, deps));

    let relaunched = shell.clone();
    runtime.spawn(instance.serve(move || relaunched.second_instance()));

    let ipc_handle = handle.clone();
    let presentation = WebViewBuilder::new()
        .with_custom_protocol("wp".into(), move |_webview_id, request| {
            serve_ui(request.uri().path())
        })
        .with_url(&current.general.ui_url)
        .with_bounds(full_window_bounds(&window))
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            ipc_handle.send(UserEvent::Ipc {
                target: ReplyTarget::Presentation,
                body: request.body().clone(),
            });
        })
        .with_devtools(cfg!(debug_assertions))
        .build_as_child(&window)
        .map_err(gui_err)?;

    let mut app = ShellApp {
        shell,
        runtime,
        handle,
        window,
        presentation,
        portals: HashMap::new(),
        contexts: HashMap::new(),
        next_view_id: 0,
        transfers: Arc::new(Mutex::new(TransferTable::default())),
        views,
        mirror,
        observed,
        product_name: current.general.product_name.clone(),
        data_dir,
        tray: None,
        pending_menu: None,
        tray_actions: HashMap::new(),
        sidebar_item: None,
        window_state,
        _app_menu: None,
    };

    app.track_window_geometry();

    info!(start_minimized, "event loop starting");
    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;
        app.handle_event(event, target, control_flow);
    })
}

impl ShellApp {
    fn handle_event(
        &mut self,
        event: Event<'_, UserEvent>,
        target: &EventLoopWindowTarget<UserEvent>,
        control_flow: &mut ControlFlow,
    ) {
        match event {
            Event::NewEvents(StartCause::Init) => self.init_native_menus(),

            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    self.save_window_geometry();
                    if self.shell.handle_window_signal(WindowSignal::CloseRequested)
                        == Some(CloseAction::Allow)
                    {
                        *control_flow = ControlFlow::Exit;
                    }
                }
                WindowEvent::Resized(_) => {
                    let _ = self.presentation.set_bounds(full_window_bounds(&self.window));
                    self.sync_window_state();
                    self.track_window_geometry();
                }
                WindowEvent::Moved(_) => {
                    self.sync_window_state();
                    self.track_window_geometry();
                }
                WindowEvent::Focused(_) => self.sync_window_state(),
                _ => {}
            },

            Event::LoopDestroyed => self.save_window_geometry(),

            Event::UserEvent(user_event) => self.handle_user_event(user_event, target, control_flow),

            _ => {}
        }
    }

    fn handle_user_event(
        &mut self,
        event: UserEvent,
        target: &EventLoopWindowTarget<UserEvent>,
        control_flow: &mut ControlFlow,
    ) {
        match event {
            UserEvent::Window(command) => self.apply_window_command(command),
            UserEvent::TrayMenu(menu) => self.apply_tray_menu(menu),
            UserEvent::Dock(visible) => set_dock_visible(target, visible),
            UserEvent::Notify(json) => {
                let script = format!("window.__wp_notify && window.__wp_notify({})", json);
                if let Err(e) = self.presentation.evaluate_script(&script) {
                    warn!(error = %e, "notification not delivered");
                }
            }
            UserEvent::Ipc { target, body } => self.handle_ipc(target, &body),
            UserEvent::Reply {
                target,
                call_id,
                result,
            } => self.reply(target, call_id, result),
            UserEvent::Prompt {
                label,
                default_value,
                reply,
            } => {
                let script = format!(
                    "window.prompt({}, {})",
                    json!(label),
                    json!(default_value.unwrap_or_default())
                );
                let fallback = reply.clone();
                let evaluated = self.presentation.evaluate_script_with_callback(&script, move |result| {
                    let answer = serde_json::from_str::<Option<String>>(&result).ok().flatten();
                    let _ = reply.send(answer);
                });
                if let Err(e) = evaluated {
                    warn!(error = %e, "prompt could not be shown");
                    let _ = fallback.send(None);
                }
            }
            UserEvent::OpenDevTools(view_id) => {
                if let Some(portal) = self.portals.get(&view_id) {
                    portal.webview.open_devtools();
                }
                self.check_devtools(view_id);
            }
            UserEvent::CheckDevTools(view_id) => self.check_devtools(view_id),
            UserEvent::ListMonitors(reply) => {
                let primary = target.primary_monitor();
                let displays = target
                    .available_monitors()
                    .enumerate()
                    .map(|(index, monitor)| {
                        let is_primary = primary.as_ref().is_some_and(|p| {
                            p.position() == monitor.position() && p.size() == monitor.size()
                        });
                        display_info(index, &monitor, is_primary)
                    })
                    .collect();
                let _ = reply.send(displays);
            }
            UserEvent::Tray(TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            }) => self.shell.toggle_window(),
            UserEvent::Tray(_) => {}
            UserEvent::Menu(event) => {
                if self.sidebar_item.as_ref() == Some(&event.id) {
                    self.shell.toggle_sidebar();
                } else if let Some(action) = self.tray_actions.get(&event.id).copied() {
                    if self.shell.handle_tray_action(action) {
                        self.portals.clear();
                        *control_flow = ControlFlow::Exit;
                    }
                }
            }
        }
    }

    // ─── Window ───

    fn apply_window_command(&mut self, command: WindowCommand) {
        debug!(?command, "window command");
        match command {
            WindowCommand::Show => self.window.set_visible(true),
            WindowCommand::Hide => self.window.set_visible(false),
            WindowCommand::Focus => self.window.set_focus(),
            WindowCommand::Restore => {
                self.window.set_minimized(false);
                self.window.set_visible(true);
            }
            WindowCommand::SetFullscreen(on) => {
                self.window
                    .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
            }
        }
        self.sync_window_state();
    }

    fn track_window_geometry(&mut self) {
        let Ok(position) = self.window.outer_position() else {
            return;
        };
        let size = self.window.inner_size();
        let bounds = Rect::new(position.x, position.y, size.width, size.height);
        self.window_state
            .track(bounds, &self.observed, self.window.is_maximized());
    }

    fn save_window_geometry(&self) {
        if let Err(e) = self.window_state.save() {
            warn!(error = %e, "window state not saved");
        }
    }

    /// Diffs the real window against the last observed state and reports
    /// each change to the core as a signal.
    fn sync_window_state(&mut self) {
        let actual = observe(&self.window);
        let previous = std::mem::replace(&mut self.observed, actual);
        *lock(&self.mirror) = actual;

        let mut signals = Vec::new();
        if previous.visible != actual.visible {
            signals.push(if actual.visible {
                WindowSignal::Shown
            } else {
                WindowSignal::Hidden
            });
        }
        if previous.minimized != actual.minimized {
            signals.push(if actual.minimized {
                WindowSignal::Minimized
            } else {
                WindowSignal::Restored
            });
        }
        if previous.fullscreen && !actual.fullscreen {
            signals.push(WindowSignal::LeftFullscreen);
        }
        if previous.focused != actual.focused {
            signals.push(if actual.focused {
                WindowSignal::Focused
            } else {
                WindowSignal::Unfocused
            });
        }
        for signal in signals {
            self.shell.handle_window_signal(signal);
        }
    }

    // ─── Tray and application menu ───

    fn init_native_menus(&mut self) {
        match self.build_tray() {
            Ok(tray) => self.tray = Some(tray),
            Err(e) => warn!(error = %e, "tray icon unavailable"),
        }
        if let Some(menu) = self.pending_menu.take() {
            self.apply_tray_menu(menu);
        } else {
            self.shell.visibility().refresh_tray();
        }
        if let Some((menu, sidebar_item)) = init_app_menu() {
            self._app_menu = Some(menu);
            self.sidebar_item = Some(sidebar_item);
        }
    }

    fn build_tray(&self) -> Result<TrayIcon, ShellError> {
        TrayIconBuilder::new()
            .with_tooltip(&self.product_name)
            .with_icon(tray_icon_image()?)
            .with_menu_on_left_click(false)
            .build()
            .map_err(gui_err)
    }

    /// Replaces the whole tray menu; items are never patched in place.
    fn apply_tray_menu(&mut self, menu: TrayMenu) {
        let Some(tray) = self.tray.as_ref() else {
            self.pending_menu = Some(menu);
            return;
        };
        let native = Menu::new();
        let mut actions = HashMap::new();
        for item in &menu.items {
            let entry = MenuItem::new(&item.label, true, None);
            if let Err(e) = native.append(&entry) {
                warn!(label = %item.label, error = %e, "tray menu item rejected");
                continue;
            }
            actions.insert(entry.id().clone(), item.action);
        }
        tray.set_menu(Some(Box::new(native)));
        self.tray_actions = actions;
    }

    // ─── IPC ───

    fn handle_ipc(&mut self, target: ReplyTarget, body: &str) {
        let request: Value = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(?target, error = %e, "malformed ipc message");
                return;
            }
        };
        let call_id = request.get("id").and_then(|v| v.as_u64()).unwrap_or(0);
        let method = request
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let mut params = request.get("params").cloned().unwrap_or_else(|| json!({}));

        if let ReplyTarget::Portal(view_id) = target {
            if !PORTAL_METHODS.contains(&method.as_str()) {
                self.reply(target, call_id, Err(format!("method not allowed: {}", method)));
                return;
            }
            // A portal speaks for its own service only.
            if let (Some(portal), Some(map)) = (self.portals.get(&view_id), params.as_object_mut()) {
                map.insert("serviceId".to_string(), json!(portal.service_id));
            }
        }

        let local = match method.as_str() {
            "view.attach" => Some(self.attach_portal(&params)),
            "view.bounds" => Some(self.set_portal_bounds(&params)),
            "view.detach" => Some(self.detach_portal(&params)),
            "window.toggle" => {
                self.shell.toggle_window();
                Some(Ok(json!({"ok": true})))
            }
            _ => None,
        };
        if let Some(result) = local {
            self.reply(target, call_id, result);
            return;
        }

        let shell = self.shell.clone();
        let handle = self.handle.clone();
        self.runtime.spawn(async move {
            let result = rpc_handler::handle_method(&shell, &method, &params).await;
            if let Err(e) = &result {
                debug!(%method, error = %e, "request failed");
            }
            handle.send(UserEvent::Reply {
                target,
                call_id,
                result,
            });
        });
    }

    fn reply(&self, target: ReplyTarget, call_id: u64, result: Result<Value, String>) {
        let payload = match result {
            Ok(value) => json!({"id": call_id, "result": value}),
            Err(message) => json!({"id": call_id, "error": message}),
        };
        let script = format!("window.__wp_reply && window.__wp_reply({})", payload);
        let webview = match target {
            ReplyTarget::Presentation => Some(&self.presentation),
            ReplyTarget::Portal(view_id) => self.portals.get(&view_id).map(|p| &p.webview),
        };
        match webview {
            Some(webview) => {
                if let Err(e) = webview.evaluate_script(&script) {
                    warn!(?target, error = %e, "reply not delivered");
                }
            }
            None => debug!(?target, call_id, "reply for a closed view dropped"),
        }
    }

    // ─── Portal views ───

    fn attach_portal(&mut self, params: &Value) -> Result<Value, String> {
        let service_id = params
            .get("serviceId")
            .and_then(|v| v.as_str())
            .ok_or("missing serviceId")?
            .to_string();
        let partition_id = params
            .get("partitionId")
            .and_then(|v| v.as_str())
            .ok_or("missing partitionId")?;
        let url = params.get("url").and_then(|v| v.as_str()).ok_or("missing url")?;
        let bounds = bounds_from(params)?;

        let session = SessionId::for_partition(partition_id);
        let partitions_dir = self.data_dir.join("partitions");
        let contexts = &mut self.contexts;
        self.shell.register_session(&session, |session| {
            let dir = partitions_dir.join(session.partition_id().unwrap_or("default"));
            contexts.insert(session.clone(), WebContext::new(Some(dir)));
        });
        let context = self
            .contexts
            .get_mut(&session)
            .ok_or_else(|| format!("no browsing context for {}", session))?;

        self.next_view_id += 1;
        let view_id = self.next_view_id;

        let ipc_handle = self.handle.clone();
        let started_shell = self.shell.clone();
        let started_table = self.transfers.clone();
        let done_shell = self.shell.clone();
        let done_table = self.transfers.clone();

        let webview = WebViewBuilder::new_with_web_context(context)
            .with_url(url)
            .with_bounds(bounds)
            .with_initialization_script(PORTAL_JS)
            .with_ipc_handler(move |request: wry::http::Request<String>| {
                ipc_handle.send(UserEvent::Ipc {
                    target: ReplyTarget::Portal(view_id),
                    body: request.body().clone(),
                });
            })
            .with_new_window_req_handler(|url, _features| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    if let Err(e) = platform::open_url(&url) {
                        warn!(%url, error = %e, "external link not opened");
                    }
                }
                wry::NewWindowResponse::Deny
            })
            .with_download_started_handler(move |url, suggested_path| {
                let key = lock(&started_table).allocate();
                let (transfer, decision) = WryTransfer::new(key, suggested_path);
                started_shell
                    .downloads()
                    .on_transfer_requested(Box::new(transfer));
                match decision.accepted_path() {
                    Some(path) => {
                        *suggested_path = path.clone();
                        lock(&started_table).insert(
                            &url,
                            InFlight {
                                key,
                                save_path: path,
                                size: decision.size,
                            },
                        );
                        true
                    }
                    None => false,
                }
            })
            .with_download_completed_handler(move |url, path, success| {
                let Some(transfer) = lock(&done_table).take(&url) else {
                    return;
                };
                let outcome = if success {
                    let saved = path.unwrap_or(transfer.save_path);
                    transfer.size.record(&saved);
                    NativeOutcome::Completed
                } else {
                    NativeOutcome::Interrupted
                };
                done_shell.downloads().on_done(transfer.key, outcome);
            })
            .with_devtools(true)
            .build_as_child(&self.window)
            .map_err(|e| e.to_string())?;

        info!(view_id, %service_id, %session, "portal view attached");
        lock(&self.views).live.insert(view_id);
        self.portals.insert(
            view_id,
            PortalView {
                webview,
                service_id,
                session,
            },
        );
        Ok(json!({"viewId": view_id}))
    }

    fn set_portal_bounds(&mut self, params: &Value) -> Result<Value, String> {
        let view_id = params.get("viewId").and_then(|v| v.as_u64()).ok_or("missing viewId")?;
        let portal = self
            .portals
            .get(&view_id)
            .ok_or_else(|| format!("view not found: {}", view_id))?;
        let visible = params.get("visible").and_then(|v| v.as_bool()).unwrap_or(true);
        portal.webview.set_bounds(bounds_from(params)?).map_err(|e| e.to_string())?;
        portal.webview.set_visible(visible).map_err(|e| e.to_string())?;
        Ok(json!({"ok": true}))
    }

    /// The session stays registered; its context is reused by the next view.
    fn detach_portal(&mut self, params: &Value) -> Result<Value, String> {
        let view_id = params.get("viewId").and_then(|v| v.as_u64()).ok_or("missing viewId")?;
        let portal = self
            .portals
            .remove(&view_id)
            .ok_or_else(|| format!("view not found: {}", view_id))?;
        let mut views = lock(&self.views);
        views.live.remove(&view_id);
        views.devtools_open.remove(&view_id);
        info!(view_id, service_id = %portal.service_id, session = %portal.session, "portal view detached");
        Ok(json!({"ok": true}))
    }

    fn check_devtools(&self, view_id: u64) {
        let open = self
            .portals
            .get(&view_id)
            .is_some_and(|portal| portal.webview.is_devtools_open());
        let mut views = lock(&self.views);
        if open {
            views.devtools_open.insert(view_id);
        } else {
            views.devtools_open.remove(&view_id);
        }
    }
}

#[cfg(target_os = "macos")]
fn set_dock_visible(target: &EventLoopWindowTarget<UserEvent>, visible: bool) {
    use tao::platform::macos::{ActivationPolicy, EventLoopWindowTargetExtMacOS};
    let policy = if visible {
        ActivationPolicy::Regular
    } else {
        ActivationPolicy::Accessory
    };
    target.set_activation_policy_at_runtime(policy);
}

#[cfg(not(target_os = "macos"))]
fn set_dock_visible(_target: &EventLoopWindowTarget<UserEvent>, _visible: bool) {}

/// macOS application menu with the sidebar toggle. Other platforms reach the
/// toggle through the presentation view's own key handling.
#[cfg(target_os = "macos")]
fn init_app_menu() -> Option<(Menu, MenuId)> {
    use tray_icon::menu::{accelerator::Accelerator, PredefinedMenuItem, Submenu};

    let toggle_sidebar = MenuItem::new("Toggle Sidebar", true, "CmdOrCtrl+B".parse::<Accelerator>().ok());
    let app_menu = Submenu::with_items(
        "Web Portals",
        true,
        &[&PredefinedMenuItem::hide(None), &PredefinedMenuItem::hide_others(None)],
    )
    .ok()?;
    let view_menu = Submenu::with_items("View", true, &[&toggle_sidebar]).ok()?;
    let menu = Menu::with_items(&[&app_menu, &view_menu]).ok()?;
    menu.init_for_nsapp();
    Some((menu, toggle_sidebar.id().clone()))
}

#[cfg(not(target_os = "macos"))]
fn init_app_menu() -> Option<(Menu, MenuId)> {
    None
}
