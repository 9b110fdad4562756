use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    Progressing,
    Paused,
    Completed,
    Cancelled,
    Interrupted,
}

/// Opaque identity of a native transfer object, assigned by the engine binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferKey(pub u64);

/// Non-terminal signal carried by a native progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeProgress {
    Progressing,
    /// Transient interruption; the engine may still resume the transfer.
    Interrupted,
}

/// Terminal outcome carried by a native done event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOutcome {
    Completed,
    Cancelled,
    Interrupted,
}

impl From<NativeOutcome> for DownloadState {
    fn from(outcome: NativeOutcome) -> Self {
        match outcome {
            NativeOutcome::Completed => DownloadState::Completed,
            NativeOutcome::Cancelled => DownloadState::Cancelled,
            NativeOutcome::Interrupted => DownloadState::Interrupted,
        }
    }
}

/// Read-only projection of a download handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSnapshot {
    pub id: String,
    pub filename: String,
    pub total_bytes: u64,
    pub received_bytes: u64,
    pub state: DownloadState,
    pub save_path: PathBuf,
}
