//! Property-based tests for the tray menu projection.
//!
//! Whatever sequence of tray toggles, reveals and native window events is
//! applied, the last tray menu handed to the tray host must describe the
//! window's actual state: "Show" while hidden or minimized, "Hide" otherwise.

#[path = "../support/mod.rs"]
mod support;

use proptest::prelude::*;

use webportals::services::visibility::VisibilitySync;
use webportals::types::visibility::{CloseAction, WindowSignal, WindowSnapshot};

use support::{event_log, plain_platform, FakeWindow, RecordingTray};

#[derive(Debug, Clone, Copy)]
enum Op {
    Toggle,
    Reveal,
    UserMinimize,
    UserRestore,
    UserFocus,
    UserBlur,
    UserClose,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Toggle),
        Just(Op::Reveal),
        Just(Op::UserMinimize),
        Just(Op::UserRestore),
        Just(Op::UserFocus),
        Just(Op::UserBlur),
        Just(Op::UserClose),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = WindowSnapshot> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(minimized, visible, focused)| {
        WindowSnapshot {
            minimized,
            visible,
            focused: focused && visible,
            fullscreen: false,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tray_label_tracks_window_state(
        initial in arb_snapshot(),
        ops in prop::collection::vec(arb_op(), 1..30),
    ) {
        let log = event_log();
        let (window, state) = FakeWindow::new(initial, log.clone());
        let (tray, menus) = RecordingTray::new(log);
        let mut sync = VisibilitySync::new(window, tray, None, plain_platform(), "Web Portals");
        sync.refresh_tray();

        for op in ops {
            match op {
                Op::Toggle => sync.toggle(),
                Op::Reveal => {
                    sync.reveal();
                    prop_assert!(!state.lock().unwrap().is_hidden());
                }
                Op::UserMinimize => {
                    state.lock().unwrap().minimized = true;
                    sync.handle_signal(WindowSignal::Minimized);
                }
                Op::UserRestore => {
                    {
                        let mut s = state.lock().unwrap();
                        s.minimized = false;
                        s.visible = true;
                    }
                    sync.handle_signal(WindowSignal::Restored);
                }
                Op::UserFocus => {
                    state.lock().unwrap().focused = true;
                    sync.handle_signal(WindowSignal::Focused);
                }
                Op::UserBlur => {
                    state.lock().unwrap().focused = false;
                    sync.handle_signal(WindowSignal::Unfocused);
                }
                Op::UserClose => {
                    let action = sync.handle_signal(WindowSignal::CloseRequested);
                    prop_assert_eq!(action, Some(CloseAction::Hide));
                    prop_assert!(!state.lock().unwrap().visible);
                }
            }

            let snapshot = *state.lock().unwrap();
            let expected = if snapshot.is_hidden() {
                "Show Web Portals"
            } else {
                "Hide Web Portals"
            };
            let menus = menus.lock().unwrap();
            let label = menus.last().and_then(|m| m.toggle_label());
            prop_assert_eq!(label, Some(expected));
        }
    }
}
