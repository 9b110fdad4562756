//! Shell core for Web Portals.
//!
//! Central struct owning every manager and service of the main process, with
//! an explicit lifecycle: [`Shell::new`] runs once the native layer is ready,
//! [`Shell::shutdown`] runs on quit.
//!
//! Components sit behind short-lived `std::sync::Mutex` guards. No guard is
//! ever held across an `.await`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::database::connection::Database;
use crate::managers::download_manager::{DownloadManager, SaveDialog, ShellOpener};
use crate::managers::portal_store::PortalStore;
use crate::managers::session_registry::SessionRegistry;
use crate::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use crate::platform;
use crate::presentation::{notify_or_log, Notifier, PromptDialog};
use crate::services::devtools::{DevToolsWaiter, ViewLookup};
use crate::services::screen_share::{CaptureEnumerator, ScreenShareBroker};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::visibility::{DockHost, MainWindow, PlatformTraits, TrayHost, VisibilitySync};
use crate::types::notification::Notification;
use crate::types::session::SessionId;
use crate::types::shortcut::KeyboardShortcut;
use crate::types::visibility::{CloseAction, TrayAction, WindowSignal};

/// Native collaborators handed to the shell by the GUI binding (or by tests).
pub struct ShellDeps {
    pub notifier: Arc<dyn Notifier>,
    pub prompt: Arc<dyn PromptDialog>,
    pub save_dialog: Arc<dyn SaveDialog>,
    pub opener: Arc<dyn ShellOpener>,
    pub capture: Arc<dyn CaptureEnumerator>,
    pub views: Arc<dyn ViewLookup>,
    pub window: Box<dyn MainWindow>,
    pub tray: Box<dyn TrayHost>,
    pub dock: Option<Box<dyn DockHost>>,
    pub platform: PlatformTraits,
}

/// Locks a component, recovering the data from a poisoned mutex.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Shell {
    settings: Mutex<SettingsEngine>,
    downloads: Mutex<DownloadManager>,
    sessions: Mutex<SessionRegistry>,
    visibility: Mutex<VisibilitySync>,
    portals: Mutex<PortalStore>,
    shortcuts: ShortcutManager,
    screen_share: ScreenShareBroker,
    devtools: DevToolsWaiter,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn PromptDialog>,
}

impl Shell {
    /// Wires the components from already loaded settings and brings the tray
    /// in line with the window.
    pub fn new(settings: SettingsEngine, db: Database, deps: ShellDeps) -> Self {
        let current = settings.get_settings().clone();

        let downloads_dir = current
            .downloads
            .directory
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_downloads_dir);
        let downloads = DownloadManager::new(
            downloads_dir,
            deps.save_dialog,
            deps.opener,
            deps.notifier.clone(),
        );

        let visibility = VisibilitySync::new(
            deps.window,
            deps.tray,
            deps.dock,
            deps.platform,
            current.general.product_name.clone(),
        );
        visibility.refresh_tray();

        let shell = Self {
            downloads: Mutex::new(downloads),
            sessions: Mutex::new(SessionRegistry::new()),
            visibility: Mutex::new(visibility),
            portals: Mutex::new(PortalStore::new(db)),
            shortcuts: ShortcutManager::with_overrides(&current.shortcuts),
            screen_share: ScreenShareBroker::new(deps.notifier.clone(), deps.capture),
            devtools: DevToolsWaiter::from_settings(deps.views, &current.devtools),
            notifier: deps.notifier,
            prompt: deps.prompt,
            settings: Mutex::new(settings),
        };
        info!(product = %current.general.product_name, "shell ready");
        shell
    }

    pub fn settings(&self) -> MutexGuard<'_, SettingsEngine> {
        lock(&self.settings)
    }

    pub fn downloads(&self) -> MutexGuard<'_, DownloadManager> {
        lock(&self.downloads)
    }

    pub fn visibility(&self) -> MutexGuard<'_, VisibilitySync> {
        lock(&self.visibility)
    }

    pub fn portals(&self) -> MutexGuard<'_, PortalStore> {
        lock(&self.portals)
    }

    pub fn shortcuts(&self) -> &ShortcutManager {
        &self.shortcuts
    }

    pub fn screen_share(&self) -> &ScreenShareBroker {
        &self.screen_share
    }

    pub fn devtools(&self) -> &DevToolsWaiter {
        &self.devtools
    }

    /// Cloned so a blocking prompt can run off the async worker.
    pub fn prompt_dialog(&self) -> Arc<dyn PromptDialog> {
        self.prompt.clone()
    }

    /// Attaches per-session hooks the first time a view of `session` appears.
    pub fn register_session<F>(&self, session: &SessionId, attach: F) -> bool
    where
        F: FnOnce(&SessionId),
    {
        lock(&self.sessions).register(session, attach)
    }

    pub fn is_session_registered(&self, session: &SessionId) -> bool {
        lock(&self.sessions).is_registered(session)
    }

    /// A click on a desktop notification raised by a portal.
    pub fn notification_click(&self, service_id: &str) {
        debug!(%service_id, "notification clicked");
        notify_or_log(
            self.notifier.as_ref(),
            Notification::MakeServiceActive {
                service_id: service_id.to_string(),
            },
        );
        self.visibility().reveal();
    }

    /// Another launch of the application was attempted.
    pub fn second_instance(&self) {
        info!("second instance launched, revealing main window");
        self.visibility().reveal();
    }

    /// Key combo intercepted inside a portal view, relayed with its bound
    /// action (if any) so the presentation layer decides what it means.
    pub fn relay_keyboard_shortcut(&self, shortcut: KeyboardShortcut) {
        let action = self.shortcuts.resolve(&shortcut);
        debug!(key = %shortcut.key, action = ?action, "relaying keyboard shortcut");
        notify_or_log(
            self.notifier.as_ref(),
            Notification::ProcessKeyboardShortcut { shortcut, action },
        );
    }

    /// The "Toggle Sidebar" application menu item.
    pub fn toggle_sidebar(&self) {
        notify_or_log(self.notifier.as_ref(), Notification::ToggleSidebar);
    }

    pub fn toggle_window(&self) {
        self.visibility().toggle();
    }

    pub fn handle_window_signal(&self, signal: WindowSignal) -> Option<CloseAction> {
        self.visibility().handle_signal(signal)
    }

    /// Returns `true` when the action asks the process to exit.
    pub fn handle_tray_action(&self, action: TrayAction) -> bool {
        match action {
            TrayAction::ToggleWindow => {
                self.toggle_window();
                false
            }
            TrayAction::Quit => {
                self.shutdown();
                true
            }
        }
    }

    /// Quit path: lifts close interception so the window can be destroyed
    /// and rejects any picker request still waiting for an answer.
    pub fn shutdown(&self) {
        info!("shell shutting down");
        self.visibility().begin_quit();
        self.screen_share.abandon_pending();
    }
}
