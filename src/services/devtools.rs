//! DevTools attachment waiter.
//!
//! The engine creates a view's DevTools surface some time after it was asked
//! to open it. The waiter polls for the surface at a fixed interval and
//! focuses it once it exists. Polling gives up after `max_attempts`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::types::errors::DevToolsError;
use crate::types::settings::DevToolsSettings;

/// A lazily created debugging surface.
pub trait DevToolsSurface: Send + Sync {
    fn focus(&self);
}

/// An embedded view that can host DevTools.
pub trait InspectableView: Send + Sync {
    fn open_devtools(&self);
    fn devtools_surface(&self) -> Option<Arc<dyn DevToolsSurface>>;
}

/// Resolves view handle ids coming from the presentation layer.
pub trait ViewLookup: Send + Sync {
    fn find_view(&self, view_id: u64) -> Option<Arc<dyn InspectableView>>;
}

pub struct DevToolsWaiter {
    views: Arc<dyn ViewLookup>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl DevToolsWaiter {
    pub fn new(views: Arc<dyn ViewLookup>, poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            views,
            poll_interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_settings(views: Arc<dyn ViewLookup>, settings: &DevToolsSettings) -> Self {
        Self::new(
            views,
            Duration::from_millis(settings.poll_interval_ms),
            settings.max_attempts,
        )
    }

    /// Opens DevTools for `view_id` and focuses the surface once it appears.
    pub async fn open_devtools(&self, view_id: u64) -> Result<(), DevToolsError> {
        let view = self
            .views
            .find_view(view_id)
            .ok_or(DevToolsError::ViewNotFound(view_id))?;

        view.open_devtools();

        for attempt in 1..=self.max_attempts {
            if let Some(surface) = view.devtools_surface() {
                debug!(view_id, attempt, "devtools surface ready");
                surface.focus();
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        warn!(view_id, attempts = self.max_attempts, "devtools surface never appeared");
        Err(DevToolsError::SurfaceTimeout {
            view_id,
            attempts: self.max_attempts,
        })
    }
}
