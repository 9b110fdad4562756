//! Window/tray/dock visibility synchronizer.
//!
//! The main window is the only source of truth. The tray menu label and the
//! dock icon are projections of its state and are rebuilt after every
//! transition, never patched in place.
//!
//! Close requests are turned into hides so the process stays resident behind
//! the tray, until [`VisibilitySync::begin_quit`] lifts the interception.

use tracing::{debug, info};

use crate::types::visibility::{
    CloseAction, TrayAction, TrayMenu, TrayMenuItem, VisibilityState, WindowSignal,
    WindowSnapshot,
};

/// Native main window.
pub trait MainWindow: Send {
    fn snapshot(&self) -> WindowSnapshot;
    fn show(&self);
    fn hide(&self);
    fn focus(&self);
    fn restore(&self);
    fn set_fullscreen(&self, fullscreen: bool);
}

/// System tray icon owning a context menu.
pub trait TrayHost: Send {
    fn set_menu(&self, menu: TrayMenu);
}

/// Dock icon (macOS).
pub trait DockHost: Send {
    fn show(&self);
    fn hide(&self);
}

/// Window-management affordances that differ per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTraits {
    /// Fullscreen windows live in their own space and must leave it before hiding.
    pub fullscreen_affordance: bool,
    pub has_dock: bool,
}

impl PlatformTraits {
    pub fn current() -> Self {
        Self {
            fullscreen_affordance: cfg!(target_os = "macos"),
            has_dock: cfg!(target_os = "macos"),
        }
    }
}

/// Builds the tray menu for a window state.
pub fn tray_menu(snapshot: &WindowSnapshot, product_name: &str) -> TrayMenu {
    let toggle_label = if snapshot.is_hidden() {
        format!("Show {}", product_name)
    } else {
        format!("Hide {}", product_name)
    };
    TrayMenu {
        items: vec![
            TrayMenuItem {
                label: toggle_label,
                action: TrayAction::ToggleWindow,
            },
            TrayMenuItem {
                label: "Quit".to_string(),
                action: TrayAction::Quit,
            },
        ],
    }
}

pub struct VisibilitySync {
    window: Box<dyn MainWindow>,
    tray: Box<dyn TrayHost>,
    dock: Option<Box<dyn DockHost>>,
    platform: PlatformTraits,
    product_name: String,
    intercept_close: bool,
    hide_on_leave_fullscreen: bool,
    refullscreen_on_show: bool,
}

impl VisibilitySync {
    pub fn new(
        window: Box<dyn MainWindow>,
        tray: Box<dyn TrayHost>,
        dock: Option<Box<dyn DockHost>>,
        platform: PlatformTraits,
        product_name: impl Into<String>,
    ) -> Self {
        let dock = if platform.has_dock { dock } else { None };
        Self {
            window,
            tray,
            dock,
            platform,
            product_name: product_name.into(),
            intercept_close: true,
            hide_on_leave_fullscreen: false,
            refullscreen_on_show: false,
        }
    }

    pub fn state(&self) -> VisibilityState {
        VisibilityState::derive(&self.window.snapshot())
    }

    pub fn is_intercepting_close(&self) -> bool {
        self.intercept_close
    }

    /// Recomputes the tray menu from the window's current state.
    pub fn refresh_tray(&self) {
        let menu = tray_menu(&self.window.snapshot(), &self.product_name);
        self.tray.set_menu(menu);
    }

    /// Tray activation: restore, hide or show depending on current state.
    pub fn toggle(&mut self) {
        let snapshot = self.window.snapshot();
        if snapshot.minimized {
            debug!("toggle: restoring minimized window");
            self.window.restore();
        } else if snapshot.visible && snapshot.focused {
            if self.platform.fullscreen_affordance && snapshot.fullscreen {
                // Hide once the window has left its fullscreen space.
                debug!("toggle: leaving fullscreen before hiding");
                self.hide_on_leave_fullscreen = true;
                self.refullscreen_on_show = true;
                self.window.set_fullscreen(false);
                return;
            }
            debug!("toggle: hiding window");
            self.window.hide();
        } else {
            debug!("toggle: showing window");
            self.window.show();
            self.window.focus();
        }
        self.refresh_tray();
    }

    /// Brings the window to the front without ever hiding it.
    pub fn reveal(&mut self) {
        let snapshot = self.window.snapshot();
        if snapshot.minimized {
            self.window.restore();
        } else if snapshot.visible && snapshot.focused {
            return;
        } else {
            self.window.show();
            self.window.focus();
        }
        self.refresh_tray();
    }

    pub fn handle_signal(&mut self, signal: WindowSignal) -> Option<CloseAction> {
        match signal {
            WindowSignal::Shown => {
                if let Some(dock) = self.dock.as_ref() {
                    dock.show();
                }
                if std::mem::take(&mut self.refullscreen_on_show) {
                    self.window.set_fullscreen(true);
                }
                self.refresh_tray();
            }
            WindowSignal::Hidden => {
                if let Some(dock) = self.dock.as_ref() {
                    dock.hide();
                }
                self.refresh_tray();
            }
            WindowSignal::LeftFullscreen => {
                // The tray follows on the Hidden signal this hide produces.
                if std::mem::take(&mut self.hide_on_leave_fullscreen) {
                    self.window.hide();
                }
            }
            WindowSignal::Minimized
            | WindowSignal::Restored
            | WindowSignal::Focused
            | WindowSignal::Unfocused => self.refresh_tray(),
            WindowSignal::CloseRequested => return Some(self.on_close_requested()),
        }
        None
    }

    fn on_close_requested(&mut self) -> CloseAction {
        if self.intercept_close {
            debug!("close intercepted, hiding main window");
            self.window.hide();
            self.refresh_tray();
            CloseAction::Hide
        } else {
            CloseAction::Allow
        }
    }

    /// Lifts close interception so the quit path can destroy the window.
    pub fn begin_quit(&mut self) {
        info!("close interception removed for quit");
        self.intercept_close = false;
        self.hide_on_leave_fullscreen = false;
        self.refullscreen_on_show = false;
    }
}
