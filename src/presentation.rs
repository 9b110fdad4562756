//! Seams between the core and the presentation layer.
//!
//! The core never talks to a webview directly: it emits [`Notification`]s
//! through a [`Notifier`] and asks for modal text input through a
//! [`PromptDialog`]. The GUI binding implements both over `wry`.

use tracing::warn;

use crate::types::errors::NotifyError;
use crate::types::notification::Notification;

/// Delivers notifications from the core to the presentation layer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Fire-and-forget delivery: failures are logged, never propagated.
pub fn notify_or_log(notifier: &dyn Notifier, notification: Notification) {
    let channel = notification.channel();
    if let Err(e) = notifier.notify(notification) {
        warn!(channel, error = %e, "notification dropped");
    }
}

/// Blocking modal text prompt. `None` means the user dismissed it.
pub trait PromptDialog: Send + Sync {
    fn prompt(&self, label: &str, default_value: Option<&str>) -> Option<String>;
}
