use serde::Serialize;

use super::download::DownloadSnapshot;
use super::shortcut::KeyboardShortcut;

/// Messages emitted from the core to the presentation layer.
///
/// Serialized as `{"channel": "<name>", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel", content = "payload")]
pub enum Notification {
    #[serde(rename = "download-started")]
    DownloadStarted(DownloadSnapshot),
    #[serde(rename = "download-progress")]
    DownloadProgress(DownloadSnapshot),
    #[serde(rename = "download-done")]
    DownloadDone(DownloadSnapshot),
    #[serde(rename = "request-screen-sharing")]
    RequestScreenSharing {
        #[serde(rename = "serviceId")]
        service_id: String,
        #[serde(rename = "requestId")]
        request_id: u64,
    },
    #[serde(rename = "makeServiceActive")]
    MakeServiceActive {
        #[serde(rename = "serviceId")]
        service_id: String,
    },
    #[serde(rename = "toggle-sidebar")]
    ToggleSidebar,
    #[serde(rename = "process-keyboard-shortcut")]
    ProcessKeyboardShortcut {
        #[serde(flatten)]
        shortcut: KeyboardShortcut,
        /// Shell action bound to the combo, if any.
        action: Option<String>,
    },
}

impl Notification {
    pub fn channel(&self) -> &'static str {
        match self {
            Notification::DownloadStarted(_) => "download-started",
            Notification::DownloadProgress(_) => "download-progress",
            Notification::DownloadDone(_) => "download-done",
            Notification::RequestScreenSharing { .. } => "request-screen-sharing",
            Notification::MakeServiceActive { .. } => "makeServiceActive",
            Notification::ToggleSidebar => "toggle-sidebar",
            Notification::ProcessKeyboardShortcut { .. } => "process-keyboard-shortcut",
        }
    }
}
