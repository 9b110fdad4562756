//! Shortcut Manager for Web Portals.
//!
//! Holds the accelerator table for shell actions (sidebar toggle, find in
//! page, zoom) with conflict detection and platform-specific modifier
//! adaptation. Embedded views forward intercepted key events; the table
//! resolves them to an action name.

use std::collections::HashMap;

use crate::types::errors::ShortcutError;
use crate::types::shortcut::KeyboardShortcut;

pub const TOGGLE_SIDEBAR: &str = "toggle_sidebar";
pub const FIND_IN_PAGE: &str = "find_in_page";

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: &str) -> Option<&str>;
    fn list_shortcuts(&self) -> &HashMap<String, String>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String>;
    fn resolve(&self, shortcut: &KeyboardShortcut) -> Option<String>;
}

/// Shortcut manager with in-memory storage and platform adaptation.
pub struct ShortcutManager {
    shortcuts: HashMap<String, String>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self {
            shortcuts: Self::default_shortcuts(),
        }
    }

    /// Defaults overlaid with user bindings; conflicting overrides are skipped.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut mgr = Self::new();
        for (action, keys) in overrides {
            if let Err(e) = mgr.register_shortcut(action, keys) {
                tracing::warn!(%action, %keys, error = %e, "ignoring shortcut override");
            }
        }
        mgr
    }

    /// Checks the `Mod+Mod+Key` shape and applies platform adaptation.
    fn parse_accelerator(keys: &str) -> Result<String, ShortcutError> {
        let keys = keys.trim();
        if keys.is_empty() {
            return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
        }
        if keys.split('+').any(|segment| segment.trim().is_empty()) {
            return Err(ShortcutError::InvalidKeys(format!("malformed accelerator '{}'", keys)));
        }
        Ok(Self::adapt_for_platform(keys))
    }

    /// `CommandOrControl`: Cmd on macOS, Ctrl elsewhere.
    fn adapt_for_platform(keys: &str) -> String {
        if cfg!(target_os = "macos") {
            keys.replace("Ctrl+", "Cmd+")
        } else {
            keys.to_string()
        }
    }

    fn default_shortcuts() -> HashMap<String, String> {
        let defaults = [
            (TOGGLE_SIDEBAR, "Ctrl+B"),
            (FIND_IN_PAGE, "Ctrl+F"),
            ("reload", "Ctrl+R"),
            ("force_reload", "Ctrl+Shift+R"),
            ("toggle_devtools", "Ctrl+Shift+I"),
            ("reset_zoom", "Ctrl+0"),
            ("zoom_in", "Ctrl+Plus"),
            ("zoom_in_alt", "Ctrl+="),
            ("zoom_out", "Ctrl+Minus"),
            ("toggle_fullscreen", "F11"),
        ];

        defaults
            .into_iter()
            .map(|(a, k)| (a.to_string(), Self::adapt_for_platform(k)))
            .collect()
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        let accelerator = Self::parse_accelerator(keys)?;
        if let Some(bound_to) = self.has_conflict(&accelerator, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                keys, bound_to
            )));
        }
        self.shortcuts.insert(action.to_string(), accelerator);
        Ok(())
    }

    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError> {
        match self.shortcuts.remove(action) {
            Some(_) => Ok(()),
            None => Err(ShortcutError::NotFound(action.to_string())),
        }
    }

    fn get_shortcut(&self, action: &str) -> Option<&str> {
        self.shortcuts.get(action).map(String::as_str)
    }

    fn list_shortcuts(&self) -> &HashMap<String, String> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = Self::default_shortcuts();
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String> {
        let wanted = Self::adapt_for_platform(keys);
        self.shortcuts
            .iter()
            .filter(|(action, _)| Some(action.as_str()) != exclude_action)
            .find(|(_, bound)| bound.eq_ignore_ascii_case(&wanted))
            .map(|(action, _)| action.clone())
    }

    fn resolve(&self, shortcut: &KeyboardShortcut) -> Option<String> {
        let pressed = shortcut.accelerator();
        self.shortcuts
            .iter()
            .find(|(_, bound)| bound.eq_ignore_ascii_case(&pressed))
            .map(|(action, _)| action.clone())
    }
}
