// Web Portals Window State Keeper
// Remembers the main window's position, size and maximized flag across runs.
// Geometry is stored as JSON next to the settings file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::screen::Rect;
use crate::types::visibility::{WindowGeometry, WindowSnapshot};

/// Tracks the main window's geometry and persists it on request.
pub struct WindowStateKeeper {
    path: PathBuf,
    geometry: WindowGeometry,
}

impl WindowStateKeeper {
    /// Creates a keeper with no remembered geometry.
    ///
    /// # Arguments
    /// * `path_override` - File to use instead of `<config dir>/window-state.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("window-state.json"));
        Self {
            path,
            geometry: WindowGeometry::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Loads the remembered geometry; `None` on first launch, when no file
    /// has been written yet.
    ///
    /// # Errors
    /// * `SettingsError::IoError` if the file exists but cannot be read.
    /// * `SettingsError::SerializationError` if the file is malformed.
    pub fn load(&mut self) -> Result<Option<WindowGeometry>, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no window state file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read window state: {}", e)))?;
        self.geometry = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse window state: {}", e))
        })?;
        Ok(Some(self.geometry))
    }

    /// Records the window's current geometry. Bounds are only taken from a
    /// normal window, so un-maximizing later returns to them; a minimized or
    /// fullscreen window changes nothing.
    pub fn track(&mut self, bounds: Rect, snapshot: &WindowSnapshot, maximized: bool) {
        if snapshot.minimized || snapshot.fullscreen {
            return;
        }
        self.geometry.maximized = maximized;
        if !maximized && bounds.width > 0 && bounds.height > 0 {
            self.geometry.bounds = Some(bounds);
        }
    }

    /// Remembered bounds, if their center still lies on one of `displays`.
    pub fn restorable_bounds(&self, displays: &[Rect]) -> Option<Rect> {
        let bounds = self.geometry.bounds?;
        let (cx, cy) = bounds.center();
        displays
            .iter()
            .any(|display| display.contains(cx, cy))
            .then_some(bounds)
    }

    /// Writes the geometry as JSON, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `SettingsError::IoError` if the directory or file cannot be written.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.geometry).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize window state: {}", e))
        })?;
        fs::write(&self.path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write window state: {}", e)))
    }
}
