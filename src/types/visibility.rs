use serde::{Deserialize, Serialize};

use super::screen::Rect;

/// Raw flags read from the main window at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub minimized: bool,
    pub visible: bool,
    pub focused: bool,
    pub fullscreen: bool,
}

impl WindowSnapshot {
    /// Hidden from the user's point of view: minimized or not visible.
    pub fn is_hidden(&self) -> bool {
        self.minimized || !self.visible
    }
}

/// Visibility of the main window, always derived from a [`WindowSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityState {
    Hidden,
    VisibleUnfocused,
    VisibleFocused,
    Minimized,
    Fullscreen,
}

impl VisibilityState {
    pub fn derive(snapshot: &WindowSnapshot) -> Self {
        if snapshot.minimized {
            VisibilityState::Minimized
        } else if !snapshot.visible {
            VisibilityState::Hidden
        } else if snapshot.fullscreen {
            VisibilityState::Fullscreen
        } else if snapshot.focused {
            VisibilityState::VisibleFocused
        } else {
            VisibilityState::VisibleUnfocused
        }
    }
}

/// Events reported by the native window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSignal {
    Shown,
    Hidden,
    Minimized,
    Restored,
    Focused,
    Unfocused,
    LeftFullscreen,
    CloseRequested,
}

/// What the window binding must do with a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// The window was hidden; the native close must be prevented.
    Hide,
    /// Interception is off (quitting); let the window be destroyed.
    Allow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrayAction {
    ToggleWindow,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayMenuItem {
    pub label: String,
    pub action: TrayAction,
}

/// Tray context menu, rebuilt from window state on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayMenu {
    pub items: Vec<TrayMenuItem>,
}

impl TrayMenu {
    pub fn toggle_label(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.action == TrayAction::ToggleWindow)
            .map(|item| item.label.as_str())
    }
}

/// Main window geometry remembered across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Last normal (not maximized, minimized or fullscreen) bounds, in
    /// physical desktop pixels.
    pub bounds: Option<Rect>,
    pub maximized: bool,
}
