//! Screen-share picker handshake.
//!
//! Embedded portal views cannot show the native source picker themselves.
//! A view's request is parked in a single pending slot, forwarded to the
//! presentation layer as `request-screen-sharing`, and resolved by the first
//! matching `screen-picker-response`. Any later response finds the slot empty
//! and is ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::presentation::Notifier;
use crate::types::errors::ScreenShareError;
use crate::types::notification::Notification;
use crate::types::screen::{
    DesktopCapture, DisplayInfo, MediaStreamConstraints, RawCaptureSource, ScreenList,
    ScreenSource, VideoConstraints,
};

/// OS enumeration of displays and capturable sources.
pub trait CaptureEnumerator: Send + Sync {
    fn displays(&self) -> Result<Vec<DisplayInfo>, String>;
    fn sources(&self) -> Result<Vec<RawCaptureSource>, String>;
}

struct PendingPicker {
    request_id: u64,
    service_id: String,
    responder: oneshot::Sender<Option<String>>,
}

pub struct ScreenShareBroker {
    notifier: Arc<dyn Notifier>,
    enumerator: Arc<dyn CaptureEnumerator>,
    pending: Mutex<Option<PendingPicker>>,
    next_request_id: AtomicU64,
}

impl ScreenShareBroker {
    pub fn new(notifier: Arc<dyn Notifier>, enumerator: Arc<dyn CaptureEnumerator>) -> Self {
        Self {
            notifier,
            enumerator,
            pending: Mutex::new(None),
            next_request_id: AtomicU64::new(1),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<PendingPicker>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks the presentation layer to let the user pick a source for
    /// `service_id`.
    ///
    /// Resolves to `Some(constraints)` for a chosen source and `None` when the
    /// user dismissed the picker. A request issued while another one is still
    /// waiting fails with [`ScreenShareError::RequestPending`].
    pub async fn request_picker(
        &self,
        service_id: &str,
    ) -> Result<Option<MediaStreamConstraints>, ScreenShareError> {
        let (responder, response) = oneshot::channel();
        let request_id = {
            let mut slot = self.slot();
            if let Some(pending) = slot.as_ref() {
                // The requester of a stale entry went away without an answer.
                if !pending.responder.is_closed() {
                    return Err(ScreenShareError::RequestPending {
                        service_id: pending.service_id.clone(),
                    });
                }
                debug!(request_id = pending.request_id, "discarding abandoned picker request");
            }
            let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
            *slot = Some(PendingPicker {
                request_id,
                service_id: service_id.to_string(),
                responder,
            });
            request_id
        };

        let forwarded = self.notifier.notify(Notification::RequestScreenSharing {
            service_id: service_id.to_string(),
            request_id,
        });
        if let Err(e) = forwarded {
            warn!(%service_id, request_id, error = %e, "screen picker request not forwarded");
            self.clear(request_id);
            return Err(ScreenShareError::Forward(e));
        }

        info!(%service_id, request_id, "waiting for screen picker response");
        match response.await {
            Ok(Some(source_id)) => Ok(Some(media_stream_constraints(&source_id))),
            Ok(None) => Ok(None),
            Err(_) => Err(ScreenShareError::Abandoned),
        }
    }

    /// Delivers the presentation layer's answer.
    ///
    /// `request_id` may be omitted by older front-ends; it then matches
    /// whatever request is pending. Returns `false` when nothing was waiting
    /// for this response.
    pub fn respond(&self, request_id: Option<u64>, source_id: Option<String>) -> bool {
        let pending = {
            let mut slot = self.slot();
            let matches = slot
                .as_ref()
                .is_some_and(|p| request_id.map_or(true, |id| id == p.request_id));
            if matches {
                slot.take()
            } else {
                None
            }
        };

        match pending {
            Some(p) => {
                debug!(request_id = p.request_id, chosen = source_id.is_some(), "screen picker answered");
                p.responder.send(source_id).is_ok()
            }
            None => {
                debug!(?request_id, "stray screen picker response ignored");
                false
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.slot().is_some()
    }

    /// Drops any pending request; its caller observes `Abandoned`.
    pub fn abandon_pending(&self) {
        if let Some(p) = self.slot().take() {
            info!(request_id = p.request_id, "abandoning pending screen picker request");
        }
    }

    fn clear(&self, request_id: u64) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|p| p.request_id == request_id) {
            *slot = None;
        }
    }

    /// Lists displays and shareable sources with thumbnails.
    pub fn get_screens(&self) -> Result<ScreenList, ScreenShareError> {
        let displays = self.enumerator.displays().map_err(|e| {
            warn!(error = %e, "display enumeration failed");
            ScreenShareError::Enumeration(e)
        })?;
        let raw = self.enumerator.sources().map_err(|e| {
            warn!(error = %e, "capture source enumeration failed");
            ScreenShareError::Enumeration(e)
        })?;

        let sources = raw
            .into_iter()
            .map(|source| {
                let display = resolve_display(&source, &displays);
                ScreenSource {
                    thumbnail: thumbnail_data_url(&source.thumbnail_png),
                    id: source.id,
                    name: source.name,
                    kind: source.kind,
                    display,
                }
            })
            .collect();

        Ok(ScreenList { displays, sources })
    }
}

/// Display a source lives on: by explicit display id, else the display
/// containing the center of the window's bounds.
fn resolve_display(source: &RawCaptureSource, displays: &[DisplayInfo]) -> Option<DisplayInfo> {
    if let Some(display_id) = source.display_id.as_deref() {
        return displays.iter().find(|d| d.id == display_id).cloned();
    }
    let (cx, cy) = source.bounds?.center();
    displays.iter().find(|d| d.bounds.contains(cx, cy)).cloned()
}

fn thumbnail_data_url(png: &[u8]) -> String {
    if png.is_empty() {
        return String::new();
    }
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

/// Desktop-capture constraints for a chosen source id.
pub fn media_stream_constraints(source_id: &str) -> MediaStreamConstraints {
    MediaStreamConstraints {
        audio: false,
        video: VideoConstraints {
            mandatory: DesktopCapture {
                chrome_media_source: "desktop".to_string(),
                chrome_media_source_id: source_id.to_string(),
            },
        },
    }
}
