use std::path::PathBuf;

// === DownloadError ===

/// Errors related to download management operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The OS shell could not open the downloaded file.
    #[error("Failed to open {}: {reason}", .path.display())]
    OpenFailed { path: PathBuf, reason: String },
    /// The OS shell could not reveal the file in its folder.
    #[error("Failed to reveal {}: {reason}", .path.display())]
    RevealFailed { path: PathBuf, reason: String },
}

// === NotifyError ===

/// Errors raised while delivering a notification to the presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The presentation layer is gone or not yet attached.
    #[error("Presentation layer unavailable: {0}")]
    Unavailable(String),
    /// The notification could not be encoded.
    #[error("Notification encoding failed: {0}")]
    Encoding(String),
}

// === ScreenShareError ===

/// Errors related to the screen-share picker handshake.
#[derive(Debug, thiserror::Error)]
pub enum ScreenShareError {
    /// Another picker request is still waiting for its response.
    #[error("Screen picker already pending for service: {service_id}")]
    RequestPending { service_id: String },
    /// Forwarding the request to the presentation layer failed.
    #[error("Failed to forward screen picker request: {0}")]
    Forward(#[from] NotifyError),
    /// The broker was torn down before a response arrived.
    #[error("Screen picker request abandoned")]
    Abandoned,
    /// Listing displays or capture sources failed.
    #[error("Capture source enumeration failed: {0}")]
    Enumeration(String),
}

// === DevToolsError ===

/// Errors related to opening DevTools on an embedded view.
#[derive(Debug, thiserror::Error)]
pub enum DevToolsError {
    /// The view handle does not resolve to a live view.
    #[error("View not found: {0}")]
    ViewNotFound(u64),
    /// The DevTools surface never appeared.
    #[error("DevTools for view {view_id} did not appear after {attempts} attempts")]
    SurfaceTimeout { view_id: u64, attempts: u32 },
}

// === StoreError ===

/// Errors related to partition and service persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record with the given ID was not found.
    #[error("Record not found: {0}")]
    NotFound(String),
    /// Input failed validation.
    #[error("Invalid input: {0}")]
    Invalid(String),
    /// Database operation failed.
    #[error("Store database error: {0}")]
    Database(#[from] rusqlite::Error),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// An I/O error occurred reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided setting key is invalid.
    #[error("Invalid setting key: {0}")]
    InvalidKey(String),
    /// The provided setting value is invalid.
    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

// === ShortcutError ===

/// Errors related to accelerator bindings.
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    /// No binding exists for the given action.
    #[error("Shortcut not found: {0}")]
    NotFound(String),
    /// The key combination is already bound to another action.
    #[error("Shortcut conflict: {0}")]
    Conflict(String),
    /// The key combination is malformed.
    #[error("Invalid shortcut keys: {0}")]
    InvalidKeys(String),
}

// === ShellError ===

/// Top-level error wrapping every subsystem error.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    ScreenShare(#[from] ScreenShareError),
    #[error(transparent)]
    DevTools(#[from] DevToolsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The native window, webview or tray could not be created.
    #[error("Native UI failure: {0}")]
    Gui(String),
}
