//! Native adapters implementing the core's collaborator traits over
//! `tao`, `wry`, `tray-icon` and `rfd`.
//!
//! Native objects live on the event-loop thread. Adapters that the core may
//! call from an async worker only hold an [`EventLoopProxy`] and post a
//! [`UserEvent`]; state they must answer synchronously (window snapshot,
//! DevTools presence) is mirrored into shared cells by the loop.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tao::event_loop::EventLoopProxy;
use tracing::{debug, warn};

use crate::managers::download_manager::{NativeTransfer, SaveDialog};
use crate::presentation::{Notifier, PromptDialog};
use crate::services::devtools::{DevToolsSurface, InspectableView, ViewLookup};
use crate::services::screen_share::CaptureEnumerator;
use crate::services::visibility::{DockHost, MainWindow, TrayHost};
use crate::types::download::TransferKey;
use crate::types::errors::NotifyError;
use crate::types::notification::Notification;
use crate::types::screen::{DisplayInfo, RawCaptureSource, Rect, SourceKind};
use crate::types::visibility::{TrayMenu, WindowSnapshot};

const MONITOR_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Commands applied to the main window on the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Show,
    Hide,
    Focus,
    Restore,
    SetFullscreen(bool),
}

/// Where a request came from, so the reply can be routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTarget {
    Presentation,
    Portal(u64),
}

pub enum UserEvent {
    Window(WindowCommand),
    TrayMenu(TrayMenu),
    Dock(bool),
    Notify(String),
    /// Raw IPC message posted by a webview.
    Ipc {
        target: ReplyTarget,
        body: String,
    },
    Reply {
        target: ReplyTarget,
        call_id: u64,
        result: Result<Value, String>,
    },
    Prompt {
        label: String,
        default_value: Option<String>,
        reply: mpsc::Sender<Option<String>>,
    },
    OpenDevTools(u64),
    CheckDevTools(u64),
    ListMonitors(mpsc::Sender<Vec<DisplayInfo>>),
    Tray(tray_icon::TrayIconEvent),
    Menu(tray_icon::menu::MenuEvent),
}

/// Posts to the event loop from any thread.
#[derive(Clone)]
pub struct LoopHandle {
    proxy: Arc<Mutex<EventLoopProxy<UserEvent>>>,
}

impl LoopHandle {
    pub fn new(proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            proxy: Arc::new(Mutex::new(proxy)),
        }
    }

    pub fn send(&self, event: UserEvent) -> bool {
        lock(&self.proxy).send_event(event).is_ok()
    }
}

// ─── Presentation ───

pub struct WebviewNotifier {
    handle: LoopHandle,
}

impl WebviewNotifier {
    pub fn new(handle: LoopHandle) -> Self {
        Self { handle }
    }
}

impl Notifier for WebviewNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let json =
            serde_json::to_string(&notification).map_err(|e| NotifyError::Encoding(e.to_string()))?;
        if self.handle.send(UserEvent::Notify(json)) {
            Ok(())
        } else {
            Err(NotifyError::Unavailable("event loop closed".to_string()))
        }
    }
}

/// Runs `window.prompt` inside the presentation view and waits for the answer.
pub struct WebviewPrompt {
    handle: LoopHandle,
}

impl WebviewPrompt {
    pub fn new(handle: LoopHandle) -> Self {
        Self { handle }
    }
}

impl PromptDialog for WebviewPrompt {
    fn prompt(&self, label: &str, default_value: Option<&str>) -> Option<String> {
        let (reply, answer) = mpsc::channel();
        let sent = self.handle.send(UserEvent::Prompt {
            label: label.to_string(),
            default_value: default_value.map(str::to_string),
            reply,
        });
        if !sent {
            return None;
        }
        answer.recv().ok().flatten()
    }
}

// ─── Main window, tray, dock ───

/// Proxy-backed window. Commands update the mirror eagerly so that the
/// tray projection computed right after a command already reflects it.
pub struct ProxyWindow {
    handle: LoopHandle,
    mirror: Arc<Mutex<WindowSnapshot>>,
}

impl ProxyWindow {
    pub fn new(handle: LoopHandle, mirror: Arc<Mutex<WindowSnapshot>>) -> Self {
        Self { handle, mirror }
    }

    fn command(&self, command: WindowCommand, apply: impl FnOnce(&mut WindowSnapshot)) {
        apply(&mut lock(&self.mirror));
        self.handle.send(UserEvent::Window(command));
    }
}

impl MainWindow for ProxyWindow {
    fn snapshot(&self) -> WindowSnapshot {
        *lock(&self.mirror)
    }

    fn show(&self) {
        self.command(WindowCommand::Show, |s| s.visible = true);
    }

    fn hide(&self) {
        self.command(WindowCommand::Hide, |s| {
            s.visible = false;
            s.focused = false;
        });
    }

    fn focus(&self) {
        self.command(WindowCommand::Focus, |s| s.focused = true);
    }

    fn restore(&self) {
        self.command(WindowCommand::Restore, |s| {
            s.minimized = false;
            s.visible = true;
        });
    }

    /// Leaving fullscreen is reported later by the loop, since the platform
    /// animates it.
    fn set_fullscreen(&self, fullscreen: bool) {
        self.handle.send(UserEvent::Window(WindowCommand::SetFullscreen(fullscreen)));
    }
}

pub struct ProxyTray {
    handle: LoopHandle,
}

impl ProxyTray {
    pub fn new(handle: LoopHandle) -> Self {
        Self { handle }
    }
}

impl TrayHost for ProxyTray {
    fn set_menu(&self, menu: TrayMenu) {
        self.handle.send(UserEvent::TrayMenu(menu));
    }
}

pub struct ProxyDock {
    handle: LoopHandle,
}

impl ProxyDock {
    pub fn new(handle: LoopHandle) -> Self {
        Self { handle }
    }
}

impl DockHost for ProxyDock {
    fn show(&self) {
        self.handle.send(UserEvent::Dock(true));
    }

    fn hide(&self) {
        self.handle.send(UserEvent::Dock(false));
    }
}

// ─── DevTools ───

/// View ids known to the loop, plus the ids whose DevTools are open.
#[derive(Default)]
pub struct ViewRegistry {
    pub live: HashSet<u64>,
    pub devtools_open: HashSet<u64>,
}

pub struct ProxyViews {
    handle: LoopHandle,
    registry: Arc<Mutex<ViewRegistry>>,
}

impl ProxyViews {
    pub fn new(handle: LoopHandle, registry: Arc<Mutex<ViewRegistry>>) -> Self {
        Self { handle, registry }
    }
}

impl ViewLookup for ProxyViews {
    fn find_view(&self, view_id: u64) -> Option<Arc<dyn InspectableView>> {
        if !lock(&self.registry).live.contains(&view_id) {
            return None;
        }
        Some(Arc::new(ProxyView {
            view_id,
            handle: self.handle.clone(),
            registry: self.registry.clone(),
        }))
    }
}

struct ProxyView {
    view_id: u64,
    handle: LoopHandle,
    registry: Arc<Mutex<ViewRegistry>>,
}

impl InspectableView for ProxyView {
    fn open_devtools(&self) {
        self.handle.send(UserEvent::OpenDevTools(self.view_id));
    }

    /// Each poll asks the loop to re-check; the answer lands in the registry
    /// before the next poll.
    fn devtools_surface(&self) -> Option<Arc<dyn DevToolsSurface>> {
        if lock(&self.registry).devtools_open.contains(&self.view_id) {
            return Some(Arc::new(ProxySurface {
                view_id: self.view_id,
                handle: self.handle.clone(),
            }));
        }
        self.handle.send(UserEvent::CheckDevTools(self.view_id));
        None
    }
}

struct ProxySurface {
    view_id: u64,
    handle: LoopHandle,
}

impl DevToolsSurface for ProxySurface {
    // Re-opening an open inspector raises it.
    fn focus(&self) {
        self.handle.send(UserEvent::OpenDevTools(self.view_id));
    }
}

// ─── Capture sources ───

/// Enumerates monitors through the event loop. Window capture is not
/// available through the native stack, so only whole screens are listed.
pub struct MonitorCapture {
    handle: LoopHandle,
}

impl MonitorCapture {
    pub fn new(handle: LoopHandle) -> Self {
        Self { handle }
    }
}

impl CaptureEnumerator for MonitorCapture {
    fn displays(&self) -> Result<Vec<DisplayInfo>, String> {
        let (reply, answer) = mpsc::channel();
        if !self.handle.send(UserEvent::ListMonitors(reply)) {
            return Err("event loop closed".to_string());
        }
        answer
            .recv_timeout(MONITOR_QUERY_TIMEOUT)
            .map_err(|e| format!("monitor query failed: {}", e))
    }

    fn sources(&self) -> Result<Vec<RawCaptureSource>, String> {
        let displays = self.displays()?;
        Ok(displays
            .into_iter()
            .enumerate()
            .map(|(index, display)| RawCaptureSource {
                id: format!("screen:{}:0", index),
                name: display.label.clone(),
                kind: SourceKind::Screen,
                display_id: Some(display.id),
                bounds: None,
                thumbnail_png: Vec::new(),
            })
            .collect())
    }
}

pub fn display_info(index: usize, monitor: &tao::monitor::MonitorHandle, primary: bool) -> DisplayInfo {
    let position = monitor.position();
    let size = monitor.size();
    DisplayInfo {
        id: index.to_string(),
        label: monitor
            .name()
            .unwrap_or_else(|| format!("Screen {}", index + 1)),
        bounds: Rect::new(
            position.x,
            position.y,
            size.width,
            size.height,
        ),
        scale_factor: monitor.scale_factor(),
        primary,
    }
}

// ─── Downloads ───

/// Native save dialog.
pub struct RfdSaveDialog;

impl SaveDialog for RfdSaveDialog {
    fn choose_save_path(&self, default_path: &Path) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = default_path.parent() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = default_path.file_name() {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }
        dialog.save_file()
    }
}

/// Size of a wry transfer, known only once the file is on disk.
#[derive(Debug, Clone, Default)]
pub struct CompletedSize(Arc<AtomicU64>);

impl CompletedSize {
    /// Reads the saved file's length; an unreadable file counts as empty.
    pub fn record(&self, saved: &Path) -> u64 {
        let size = match fs::metadata(saved) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %saved.display(), error = %e, "saved download not readable");
                0
            }
        };
        self.0.store(size, Ordering::SeqCst);
        size
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// A transfer announced by wry's download-started hook.
///
/// wry decides the destination and acceptance when the hook returns, so the
/// save path and the cancel flag are read back by the hook afterwards. wry
/// exposes neither progress nor pause, so the transfer reports itself as
/// not resumable and its byte counters stay at zero until completion.
pub struct WryTransfer {
    key: TransferKey,
    suggested_filename: String,
    save_path: Arc<Mutex<Option<PathBuf>>>,
    cancelled: Arc<AtomicBool>,
    size: CompletedSize,
}

/// What the download hook reads back after the core handled the transfer.
pub struct TransferDecision {
    pub save_path: Arc<Mutex<Option<PathBuf>>>,
    pub cancelled: Arc<AtomicBool>,
    pub size: CompletedSize,
}

impl TransferDecision {
    pub fn accepted_path(&self) -> Option<PathBuf> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        lock(&self.save_path).clone()
    }
}

impl WryTransfer {
    pub fn new(key: TransferKey, suggested: &Path) -> (Self, TransferDecision) {
        let save_path = Arc::new(Mutex::new(None));
        let cancelled = Arc::new(AtomicBool::new(false));
        let size = CompletedSize::default();
        let suggested_filename = suggested
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let transfer = Self {
            key,
            suggested_filename,
            save_path: save_path.clone(),
            cancelled: cancelled.clone(),
            size: size.clone(),
        };
        (
            transfer,
            TransferDecision {
                save_path,
                cancelled,
                size,
            },
        )
    }
}

impl NativeTransfer for WryTransfer {
    fn key(&self) -> TransferKey {
        self.key
    }

    fn suggested_filename(&self) -> String {
        self.suggested_filename.clone()
    }

    fn total_bytes(&self) -> u64 {
        self.size.get()
    }

    fn received_bytes(&self) -> u64 {
        self.size.get()
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn can_resume(&self) -> bool {
        false
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(key = ?self.key, "transfer cancelled");
        if lock(&self.save_path).is_some() {
            warn!(key = ?self.key, "transfer already accepted, cancellation is advisory");
        }
    }

    fn set_save_path(&mut self, path: &Path) {
        *lock(&self.save_path) = Some(path.to_path_buf());
    }
}

/// An accepted wry transfer waiting for its completion hook.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub key: TransferKey,
    pub save_path: PathBuf,
    pub size: CompletedSize,
}

/// Maps download URLs to their in-flight transfers, since wry's completion
/// hook only reports the URL.
#[derive(Default)]
pub struct TransferTable {
    next_key: u64,
    by_url: HashMap<String, Vec<InFlight>>,
}

impl TransferTable {
    pub fn allocate(&mut self) -> TransferKey {
        self.next_key += 1;
        TransferKey(self.next_key)
    }

    pub fn insert(&mut self, url: &str, transfer: InFlight) {
        self.by_url.entry(url.to_string()).or_default().push(transfer);
    }

    /// Oldest in-flight transfer for `url`.
    pub fn take(&mut self, url: &str) -> Option<InFlight> {
        let pending = self.by_url.get_mut(url)?;
        let transfer = (!pending.is_empty()).then(|| pending.remove(0));
        if pending.is_empty() {
            self.by_url.remove(url);
        }
        transfer
    }
}
