use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level shell settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellSettings {
    pub general: GeneralSettings,
    pub window: WindowSettings,
    pub downloads: DownloadSettings,
    pub devtools: DevToolsSettings,
    /// User overrides for accelerator bindings, keyed by action name.
    #[serde(default)]
    pub shortcuts: HashMap<String, String>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            window: WindowSettings::default(),
            downloads: DownloadSettings::default(),
            devtools: DevToolsSettings::default(),
            shortcuts: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub product_name: String,
    /// Keep the main window hidden at launch; the tray restores it.
    pub start_minimized: bool,
    /// Page loaded into the main window's presentation view.
    pub ui_url: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            product_name: "Web Portals".to_string(),
            start_minimized: false,
            ui_url: default_ui_url().to_string(),
        }
    }
}

/// WebView2 exposes custom protocols as `http://<scheme>.localhost`.
fn default_ui_url() -> &'static str {
    if cfg!(target_os = "windows") {
        "http://wp.localhost/"
    } else {
        "wp://localhost/"
    }
}

/// Initial main window geometry, relative to the primary display work area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSettings {
    pub width_ratio: f64,
    pub height_ratio: f64,
    pub maximized: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width_ratio: 0.75,
            height_ratio: 0.75,
            maximized: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DownloadSettings {
    /// Default save-dialog directory; the platform downloads dir when unset.
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevToolsSettings {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for DevToolsSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            max_attempts: 100,
        }
    }
}
