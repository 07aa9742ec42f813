//! Property-based tests for the App state machine.
//!
//! Arbitrary interleavings of keys, serial traffic and ticks must keep the
//! routing rules intact.

use std::time::{Duration, Instant};

use bytes::Bytes;
use proptest::prelude::*;
use stxcom_app::{App, AppAction, AppEvent, KeyInput};
use stxcom_core::SessionConfig;
use stxcom_proto::ClockTime;

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => prop::char::range(' ', '~').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Esc),
        1 => Just(KeyInput::Ctrl('k')),
        1 => Just(KeyInput::Ctrl('x')),
        1 => prop::char::range('a', 'z')
            .prop_filter("router keys", |c| !matches!(c, 'c' | 'k' | 'x'))
            .prop_map(KeyInput::Ctrl),
    ]
}

fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        6 => key_strategy().prop_map(AppEvent::Key),
        2 => prop::collection::vec(any::<u8>(), 0..12).prop_map(|b| AppEvent::SerialData {
            bytes: Bytes::from(b),
            clock: ClockTime::MIDNIGHT,
        }),
        1 => Just(AppEvent::Tick),
    ]
}

proptest! {
    #[test]
    fn only_ctrl_c_quits(events in prop::collection::vec(event_strategy(), 0..60)) {
        #[allow(clippy::disallowed_methods)]
        let mut now = Instant::now();
        let mut app = App::new(SessionConfig::default(), 38_400);

        for event in events {
            now += Duration::from_millis(7);
            let actions = app.handle(event, now);
            prop_assert!(!actions.contains(&AppAction::Quit));
        }

        let actions = app.handle(AppEvent::Key(KeyInput::Ctrl('c')), now);
        prop_assert_eq!(actions.last(), Some(&AppAction::Quit));
    }

    #[test]
    fn inactive_menu_forwards_every_char(c in prop::char::range(' ', '~')) {
        #[allow(clippy::disallowed_methods)]
        let now = Instant::now();
        let mut app = App::new(SessionConfig::default(), 38_400);

        let actions = app.handle(AppEvent::Key(KeyInput::Char(c)), now);
        let expected = AppAction::Write {
            data: Bytes::from(c.to_string()),
            kind: stxcom_core::WriteKind::Keystroke,
        };
        prop_assert_eq!(actions, vec![expected]);
    }

    #[test]
    fn serial_output_never_reaches_device(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        #[allow(clippy::disallowed_methods)]
        let now = Instant::now();
        let mut app = App::new(SessionConfig::default(), 38_400);

        let actions = app.handle(AppEvent::SerialData { bytes: Bytes::from(bytes), clock: ClockTime::MIDNIGHT }, now);
        // Only a ready prompt may send, and the queue is empty.
        let no_writes = actions.iter().all(|a| !matches!(a, AppAction::Write { .. }));
        prop_assert!(no_writes);
    }
}
