//! Download Manager for Web Portals.
//!
//! Tracks every transfer the browser engine hands over from a registered
//! session: asks the user for a destination, relays progress and completion
//! to the presentation layer, and exposes pause/resume/cancel.
//!
//! Native callbacks identify a transfer by its [`TransferKey`]; a side table
//! maps that key to the record id so lookups never scan the record map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::presentation::{notify_or_log, Notifier};
use crate::types::download::{
    DownloadSnapshot, DownloadState, NativeOutcome, NativeProgress, TransferKey,
};
use crate::types::errors::DownloadError;
use crate::types::notification::Notification;

/// The browser engine's live transfer object.
pub trait NativeTransfer: Send {
    fn key(&self) -> TransferKey;
    fn suggested_filename(&self) -> String;
    fn total_bytes(&self) -> u64;
    fn received_bytes(&self) -> u64;
    fn is_paused(&self) -> bool;
    fn can_resume(&self) -> bool;
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel(&mut self);
    /// Commits the destination. The engine holds the transfer until this is called.
    fn set_save_path(&mut self, path: &Path);
}

/// Blocking save dialog. `None` means the user dismissed it.
pub trait SaveDialog: Send + Sync {
    fn choose_save_path(&self, default_path: &Path) -> Option<PathBuf>;
}

/// OS shell delegation for finished downloads.
pub trait ShellOpener: Send + Sync {
    fn open_path(&self, path: &Path) -> std::io::Result<()>;
    fn reveal_path(&self, path: &Path) -> std::io::Result<()>;
}

/// Trait defining download lifecycle operations.
pub trait DownloadManagerTrait {
    fn on_transfer_requested(&mut self, item: Box<dyn NativeTransfer>) -> Option<String>;
    fn on_progress(&mut self, key: TransferKey, progress: NativeProgress);
    fn on_done(&mut self, key: TransferKey, outcome: NativeOutcome);
    fn pause(&mut self, id: &str) -> bool;
    fn resume(&mut self, id: &str) -> bool;
    fn cancel(&mut self, id: &str);
    fn open(&self, save_path: &Path) -> Result<(), DownloadError>;
    fn reveal(&self, save_path: &Path) -> Result<(), DownloadError>;
    fn list(&self) -> Vec<DownloadSnapshot>;
    fn get(&self, id: &str) -> Option<DownloadSnapshot>;
}

/// A tracked transfer. The native handle is owned here and released once the
/// transfer reaches a terminal state.
pub struct DownloadRecord {
    pub id: String,
    pub filename: String,
    pub total_bytes: u64,
    pub received_bytes: u64,
    pub state: DownloadState,
    pub save_path: PathBuf,
    key: TransferKey,
    handle: Option<Box<dyn NativeTransfer>>,
    finished: bool,
}

impl DownloadRecord {
    pub fn snapshot(&self) -> DownloadSnapshot {
        DownloadSnapshot {
            id: self.id.clone(),
            filename: self.filename.clone(),
            total_bytes: self.total_bytes,
            received_bytes: self.received_bytes,
            state: self.state,
            save_path: self.save_path.clone(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn refresh_counters(&mut self) {
        if let Some(handle) = self.handle.as_ref() {
            self.total_bytes = handle.total_bytes();
            self.received_bytes = self.received_bytes.max(handle.received_bytes());
        }
    }
}

/// Download manager with an in-memory record map and a handle side table.
pub struct DownloadManager {
    downloads: HashMap<String, DownloadRecord>,
    by_transfer: HashMap<TransferKey, String>,
    order: Vec<String>,
    downloads_dir: PathBuf,
    dialog: Arc<dyn SaveDialog>,
    opener: Arc<dyn ShellOpener>,
    notifier: Arc<dyn Notifier>,
}

impl DownloadManager {
    pub fn new(
        downloads_dir: PathBuf,
        dialog: Arc<dyn SaveDialog>,
        opener: Arc<dyn ShellOpener>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            downloads: HashMap::new(),
            by_transfer: HashMap::new(),
            order: Vec::new(),
            downloads_dir,
            dialog,
            opener,
            notifier,
        }
    }

    /// Number of records currently tracked, finished ones included.
    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }

    /// Whether a native key still routes to a live record.
    pub fn is_tracking(&self, key: TransferKey) -> bool {
        self.by_transfer.contains_key(&key)
    }

    fn record_for_key(&mut self, key: TransferKey) -> Option<&mut DownloadRecord> {
        let id = self.by_transfer.get(&key)?;
        self.downloads.get_mut(id)
    }
}

impl DownloadManagerTrait for DownloadManager {
    /// Decides the destination of a new transfer before returning.
    ///
    /// The record and its side-table entry exist before the save path is
    /// committed, so a transfer that finishes immediately is still observed.
    fn on_transfer_requested(&mut self, mut item: Box<dyn NativeTransfer>) -> Option<String> {
        let key = item.key();
        if let Some(existing) = self.by_transfer.get(&key) {
            warn!(?key, id = %existing, "transfer already tracked");
            return Some(existing.clone());
        }

        let suggested = item.suggested_filename();
        let default_path = self.downloads_dir.join(&suggested);
        let Some(save_path) = self.dialog.choose_save_path(&default_path) else {
            debug!(?key, "save dialog dismissed, cancelling transfer");
            item.cancel();
            return None;
        };

        let id = Uuid::new_v4().to_string();
        let filename = save_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(suggested);

        let record = DownloadRecord {
            id: id.clone(),
            filename,
            total_bytes: item.total_bytes(),
            received_bytes: item.received_bytes(),
            state: if item.is_paused() {
                DownloadState::Paused
            } else {
                DownloadState::Progressing
            },
            save_path: save_path.clone(),
            key,
            handle: Some(item),
            finished: false,
        };

        self.by_transfer.insert(key, id.clone());
        self.order.push(id.clone());
        let record = self.downloads.entry(id.clone()).or_insert(record);
        if let Some(handle) = record.handle.as_mut() {
            handle.set_save_path(&save_path);
        }
        let snapshot = record.snapshot();

        info!(%id, path = %save_path.display(), "download started");
        notify_or_log(self.notifier.as_ref(), Notification::DownloadStarted(snapshot));
        Some(id)
    }

    fn on_progress(&mut self, key: TransferKey, progress: NativeProgress) {
        let Some(record) = self.record_for_key(key) else {
            trace!(?key, "progress for untracked transfer dropped");
            return;
        };
        if record.finished {
            return;
        }

        record.refresh_counters();
        let paused = record.handle.as_ref().is_some_and(|h| h.is_paused());
        record.state = match (paused, progress) {
            (true, _) => DownloadState::Paused,
            (false, NativeProgress::Progressing) => DownloadState::Progressing,
            (false, NativeProgress::Interrupted) => DownloadState::Interrupted,
        };
        let snapshot = record.snapshot();

        trace!(id = %snapshot.id, received = snapshot.received_bytes, total = snapshot.total_bytes, "download progress");
        notify_or_log(self.notifier.as_ref(), Notification::DownloadProgress(snapshot));
    }

    /// Terminal event. The side-table entry is dropped first, so a second
    /// done or a late progress event for the same key is ignored.
    fn on_done(&mut self, key: TransferKey, outcome: NativeOutcome) {
        let Some(id) = self.by_transfer.remove(&key) else {
            trace!(?key, "done for untracked transfer dropped");
            return;
        };
        let Some(record) = self.downloads.get_mut(&id) else {
            return;
        };

        record.refresh_counters();
        record.state = outcome.into();
        record.finished = true;
        record.handle = None;
        let snapshot = record.snapshot();

        info!(%id, state = ?snapshot.state, "download finished");
        notify_or_log(self.notifier.as_ref(), Notification::DownloadDone(snapshot));
    }

    fn pause(&mut self, id: &str) -> bool {
        let Some(record) = self.downloads.get_mut(id) else {
            return false;
        };
        let Some(handle) = record.handle.as_mut() else {
            return false;
        };
        if record.finished || handle.is_paused() || !handle.can_resume() {
            return false;
        }

        handle.pause();
        record.state = DownloadState::Paused;
        let snapshot = record.snapshot();
        debug!(%id, "download paused");
        notify_or_log(self.notifier.as_ref(), Notification::DownloadProgress(snapshot));
        true
    }

    fn resume(&mut self, id: &str) -> bool {
        let Some(record) = self.downloads.get_mut(id) else {
            return false;
        };
        let Some(handle) = record.handle.as_mut() else {
            return false;
        };
        if record.finished || !handle.is_paused() || !handle.can_resume() {
            return false;
        }

        handle.resume();
        record.state = DownloadState::Progressing;
        let snapshot = record.snapshot();
        debug!(%id, "download resumed");
        notify_or_log(self.notifier.as_ref(), Notification::DownloadProgress(snapshot));
        true
    }

    /// Advisory to the engine; local tracking is dropped unconditionally.
    fn cancel(&mut self, id: &str) {
        let Some(mut record) = self.downloads.remove(id) else {
            return;
        };
        if let Some(handle) = record.handle.as_mut() {
            handle.cancel();
        }
        self.by_transfer.remove(&record.key);
        self.order.retain(|tracked| tracked != id);
        debug!(%id, "download cancelled and evicted");
    }

    fn open(&self, save_path: &Path) -> Result<(), DownloadError> {
        self.opener
            .open_path(save_path)
            .map_err(|e| DownloadError::OpenFailed {
                path: save_path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn reveal(&self, save_path: &Path) -> Result<(), DownloadError> {
        self.opener
            .reveal_path(save_path)
            .map_err(|e| DownloadError::RevealFailed {
                path: save_path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Snapshots of all tracked downloads, newest first.
    fn list(&self) -> Vec<DownloadSnapshot> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.downloads.get(id))
            .map(DownloadRecord::snapshot)
            .collect()
    }

    fn get(&self, id: &str) -> Option<DownloadSnapshot> {
        self.downloads.get(id).map(DownloadRecord::snapshot)
    }
}
