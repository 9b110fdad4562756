//! Unit tests for the download lifecycle manager.

#[path = "../support/mod.rs"]
mod support;

use std::path::PathBuf;
use std::sync::Arc;

use webportals::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use webportals::types::download::{DownloadState, NativeOutcome, NativeProgress, TransferKey};
use webportals::types::errors::DownloadError;
use webportals::types::notification::Notification;

use support::{FakeTransfer, RecordingNotifier, RecordingOpener, ScriptedSaveDialog};

struct Fixture {
    manager: DownloadManager,
    notifier: Arc<RecordingNotifier>,
    dialog: Arc<ScriptedSaveDialog>,
    opener: Arc<RecordingOpener>,
}

fn setup() -> Fixture {
    let notifier = RecordingNotifier::new();
    let dialog = ScriptedSaveDialog::new();
    let opener = RecordingOpener::new();
    let manager = DownloadManager::new(
        PathBuf::from("/home/user/Downloads"),
        dialog.clone(),
        opener.clone(),
        notifier.clone(),
    );
    Fixture {
        manager,
        notifier,
        dialog,
        opener,
    }
}

fn snapshot_of(notification: &Notification) -> &webportals::types::download::DownloadSnapshot {
    match notification {
        Notification::DownloadStarted(s)
        | Notification::DownloadProgress(s)
        | Notification::DownloadDone(s) => s,
        other => panic!("not a download notification: {:?}", other),
    }
}

// ─── Start ───

#[test]
fn test_dialog_defaults_to_downloads_dir_with_suggested_name() {
    let mut fx = setup();
    let (item, _) = FakeTransfer::new(1, "report.pdf", 10);
    fx.manager.on_transfer_requested(item);
    assert_eq!(
        fx.dialog.asked(),
        vec![PathBuf::from("/home/user/Downloads/report.pdf")]
    );
}

#[test]
fn test_start_commits_path_and_notifies() {
    let mut fx = setup();
    fx.dialog.answer(Some(PathBuf::from("/tmp/renamed.bin")));
    let (item, state) = FakeTransfer::new(1, "a.bin", 1000);

    let id = fx.manager.on_transfer_requested(item).unwrap();

    assert_eq!(state.lock().unwrap().save_path, Some(PathBuf::from("/tmp/renamed.bin")));
    let sent = fx.notifier.sent();
    assert_eq!(sent.len(), 1);
    let started = snapshot_of(&sent[0]);
    assert_eq!(started.id, id);
    assert_eq!(started.filename, "renamed.bin");
    assert_eq!(started.total_bytes, 1000);
    assert_eq!(started.state, DownloadState::Progressing);
    assert!(fx.manager.is_tracking(TransferKey(1)));
}

#[test]
fn test_paused_item_starts_paused() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 10);
    state.lock().unwrap().paused = true;
    let id = fx.manager.on_transfer_requested(item).unwrap();
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Paused);
}

#[test]
fn test_dismissed_dialog_cancels_without_record() {
    let mut fx = setup();
    fx.dialog.answer(None);
    let (item, state) = FakeTransfer::new(1, "a.bin", 10);

    assert!(fx.manager.on_transfer_requested(item).is_none());

    assert!(state.lock().unwrap().cancelled);
    assert!(state.lock().unwrap().save_path.is_none());
    assert!(fx.manager.is_empty());
    assert!(fx.notifier.sent().is_empty());
}

#[test]
fn test_duplicate_key_returns_existing_id() {
    let mut fx = setup();
    let (first, _) = FakeTransfer::new(5, "a.bin", 10);
    let (second, _) = FakeTransfer::new(5, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(first).unwrap();
    assert_eq!(fx.manager.on_transfer_requested(second), Some(id));
    assert_eq!(fx.manager.len(), 1);
    assert_eq!(fx.dialog.asked().len(), 1);
}

// ─── Progress and completion ───

#[test]
fn test_thousand_byte_transfer_scenario() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 1000);
    let id = fx.manager.on_transfer_requested(item).unwrap();

    for received in [250, 500, 1000] {
        state.lock().unwrap().received_bytes = received;
        fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);
    }
    fx.manager.on_done(TransferKey(1), NativeOutcome::Completed);

    assert_eq!(fx.notifier.count("download-started"), 1);
    assert_eq!(fx.notifier.count("download-progress"), 3);
    assert_eq!(fx.notifier.count("download-done"), 1);

    let sent = fx.notifier.sent();
    let received: Vec<u64> = sent[1..4].iter().map(|n| snapshot_of(n).received_bytes).collect();
    assert_eq!(received, vec![250, 500, 1000]);

    let done = snapshot_of(sent.last().unwrap());
    assert_eq!(done.state, DownloadState::Completed);
    assert_eq!(done.received_bytes, 1000);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Completed);
}

#[test]
fn test_done_reports_sizes_learned_at_completion() {
    let mut fx = setup();
    // Engines without progress reporting only know the size once the file is written.
    let (item, state) = FakeTransfer::new(1, "a.bin", 0);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    assert_eq!(fx.manager.get(&id).unwrap().total_bytes, 0);

    {
        let mut s = state.lock().unwrap();
        s.total_bytes = 4096;
        s.received_bytes = 4096;
    }
    fx.manager.on_done(TransferKey(1), NativeOutcome::Completed);

    let sent = fx.notifier.sent();
    let done = snapshot_of(sent.last().unwrap());
    assert_eq!(done.total_bytes, 4096);
    assert_eq!(done.received_bytes, 4096);
}

#[test]
fn test_received_bytes_never_regress() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 1000);
    let id = fx.manager.on_transfer_requested(item).unwrap();

    state.lock().unwrap().received_bytes = 600;
    fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);
    state.lock().unwrap().received_bytes = 400;
    fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);

    assert_eq!(fx.manager.get(&id).unwrap().received_bytes, 600);
}

#[test]
fn test_progress_reports_paused_when_handle_is_paused() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 1000);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    state.lock().unwrap().paused = true;
    fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Paused);
}

#[test]
fn test_transient_interruption_is_not_terminal() {
    let mut fx = setup();
    let (item, _) = FakeTransfer::new(1, "a.bin", 1000);
    let id = fx.manager.on_transfer_requested(item).unwrap();

    fx.manager.on_progress(TransferKey(1), NativeProgress::Interrupted);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Interrupted);

    fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Progressing);
    assert!(fx.manager.is_tracking(TransferKey(1)));
}

#[test]
fn test_events_after_done_are_ignored() {
    let mut fx = setup();
    let (item, _) = FakeTransfer::new(1, "a.bin", 1000);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    fx.manager.on_done(TransferKey(1), NativeOutcome::Cancelled);
    fx.notifier.clear();

    fx.manager.on_progress(TransferKey(1), NativeProgress::Progressing);
    fx.manager.on_done(TransferKey(1), NativeOutcome::Completed);

    assert!(fx.notifier.sent().is_empty());
    assert!(!fx.manager.is_tracking(TransferKey(1)));
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Cancelled);
}

#[test]
fn test_unknown_key_events_are_dropped() {
    let mut fx = setup();
    fx.manager.on_progress(TransferKey(99), NativeProgress::Progressing);
    fx.manager.on_done(TransferKey(99), NativeOutcome::Completed);
    assert!(fx.notifier.sent().is_empty());
}

#[test]
fn test_notification_failure_does_not_break_tracking() {
    let mut fx = setup();
    fx.notifier.fail(true);
    let (item, _) = FakeTransfer::new(1, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    fx.manager.on_done(TransferKey(1), NativeOutcome::Completed);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Completed);
}

// ─── Pause / resume / cancel ───

#[test]
fn test_pause_then_resume() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(item).unwrap();

    assert!(fx.manager.pause(&id));
    assert!(state.lock().unwrap().paused);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Paused);
    assert!(!fx.manager.pause(&id), "already paused");

    assert!(fx.manager.resume(&id));
    assert!(!state.lock().unwrap().paused);
    assert_eq!(fx.manager.get(&id).unwrap().state, DownloadState::Progressing);
    assert!(!fx.manager.resume(&id), "not paused");
    assert_eq!(fx.notifier.count("download-progress"), 2);
}

#[test]
fn test_pause_refused_when_not_resumable() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 10);
    state.lock().unwrap().can_resume = false;
    let id = fx.manager.on_transfer_requested(item).unwrap();
    assert!(!fx.manager.pause(&id));
    assert!(!state.lock().unwrap().paused);
}

#[test]
fn test_pause_resume_unknown_or_finished() {
    let mut fx = setup();
    assert!(!fx.manager.pause("missing"));
    assert!(!fx.manager.resume("missing"));

    let (item, _) = FakeTransfer::new(1, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    fx.manager.on_done(TransferKey(1), NativeOutcome::Completed);
    assert!(!fx.manager.pause(&id));
    assert!(!fx.manager.resume(&id));
}

#[test]
fn test_cancel_evicts_record_and_cancels_handle() {
    let mut fx = setup();
    let (item, state) = FakeTransfer::new(1, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    fx.notifier.clear();

    fx.manager.cancel(&id);

    assert!(state.lock().unwrap().cancelled);
    assert!(fx.manager.get(&id).is_none());
    assert!(!fx.manager.is_tracking(TransferKey(1)));
    assert!(fx.notifier.sent().is_empty());

    // A late done for the evicted transfer finds nothing.
    fx.manager.on_done(TransferKey(1), NativeOutcome::Cancelled);
    assert!(fx.notifier.sent().is_empty());
}

#[test]
fn test_cancel_unknown_id_is_noop() {
    let mut fx = setup();
    let (item, _) = FakeTransfer::new(1, "a.bin", 10);
    fx.manager.on_transfer_requested(item);
    fx.notifier.clear();

    fx.manager.cancel("does-not-exist");

    assert_eq!(fx.manager.len(), 1);
    assert!(fx.notifier.sent().is_empty());
}

// ─── Shell delegation and listing ───

#[test]
fn test_open_and_reveal_delegate() {
    let fx = setup();
    let path = PathBuf::from("/tmp/a.bin");
    fx.manager.open(&path).unwrap();
    fx.manager.reveal(&path).unwrap();
    assert_eq!(*fx.opener.opened.lock().unwrap(), vec![path.clone()]);
    assert_eq!(*fx.opener.revealed.lock().unwrap(), vec![path]);
}

#[test]
fn test_open_failure_is_reported() {
    let fx = setup();
    fx.opener.fail(true);
    let err = fx.manager.open(&PathBuf::from("/tmp/a.bin")).unwrap_err();
    assert!(matches!(err, DownloadError::OpenFailed { .. }));
    assert!(err.to_string().contains("/tmp/a.bin"));
}

#[test]
fn test_list_is_newest_first() {
    let mut fx = setup();
    let (a, _) = FakeTransfer::new(1, "a.bin", 10);
    let (b, _) = FakeTransfer::new(2, "b.bin", 10);
    let first = fx.manager.on_transfer_requested(a).unwrap();
    let second = fx.manager.on_transfer_requested(b).unwrap();
    let ids: Vec<String> = fx.manager.list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn test_snapshot_wire_format() {
    let mut fx = setup();
    let (item, _) = FakeTransfer::new(1, "a.bin", 10);
    let id = fx.manager.on_transfer_requested(item).unwrap();
    let json = serde_json::to_value(Notification::DownloadStarted(fx.manager.get(&id).unwrap())).unwrap();
    assert_eq!(json["channel"], "download-started");
    assert_eq!(json["payload"]["id"], id.as_str());
    assert_eq!(json["payload"]["totalBytes"], 10);
    assert_eq!(json["payload"]["receivedBytes"], 0);
    assert_eq!(json["payload"]["state"], "progressing");
    assert_eq!(json["payload"]["savePath"], "/home/user/Downloads/a.bin");
}
