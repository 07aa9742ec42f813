//! Runtime reconfiguration menu.
//!
//! Ctrl-K opens the menu from anywhere. The next key picks an item; later
//! keys are collected by that item until it completes.
//!
//! # State Machine
//!
//! ```text
//!            Ctrl-K              d/l/q/r/b/f
//!  Inactive ───────> Selector ──────────────> item ──> Inactive
//!     ↑                  │ t / other                │ LineMode stays until Esc
//!     └──────────────────┘                          │
//! ```
//!
//! [`transition`] is pure. [`Menu`] owns the current state and the last line
//! submitted in line mode.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bytes::Bytes;
use stxcom_core::{Section, config::MAX_DELAY};

use crate::KeyInput;

/// Rates offered by the baud item, keyed `a`, `b`, `c`.
pub const BAUD_CHOICES: [(char, u32); 3] = [('a', 38_400), ('b', 9_600), ('c', 300)];

/// Destructive backspace: move left, blank, move left.
const RUBOUT: &str = "\x08 \x08";

/// Menu edit state. Collecting states carry their own buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuState {
    /// Menu closed; keys go to the device.
    #[default]
    Inactive,
    /// Menu line printed, waiting for an item key.
    AwaitingSelector,
    /// Waiting for a section key.
    Download,
    /// Editing a command line.
    LineMode {
        /// Characters typed so far.
        buffer: String,
    },
    /// Editing the re-query interval.
    Query {
        /// Digits typed so far.
        buffer: String,
    },
    /// Waiting for the DTR level key.
    SignalSet,
    /// Waiting for a baud choice key.
    BaudSet,
    /// Editing the download file name.
    FilenameEdit {
        /// Characters typed so far.
        buffer: String,
    },
}

/// Read-only facts the menu needs to word its prompts.
#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    /// Current baud rate.
    pub baud: u32,
    /// Current download file.
    pub download_file: Option<&'a Path>,
    /// Last line submitted in line mode.
    pub last_line: &'a str,
}

/// Side effect requested by a menu transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEffect {
    /// Local text for the operator.
    Print(String),
    /// Diagnostic line.
    Notice(String),
    /// Bytes for the device.
    Write(Bytes),
    /// Store the submitted line for recall.
    Remember(String),
    /// Download the given section of the current script file.
    LoadScript(Section),
    /// Change the re-query interval.
    SetQueryInterval(Duration),
    /// Drive DTR to this level.
    SetSignal(bool),
    /// Change the baud rate.
    SetBaud(u32),
    /// Use this script file for later downloads.
    SetDownloadFile(PathBuf),
}

/// Menu line printed when the menu opens.
pub const MENU_LINE: &str = "stxcom: Filename, Query, Line_mode, Download, Baud set, dtR";

/// Compute the next state and effects for `key`.
pub fn transition(
    state: MenuState,
    key: KeyInput,
    ctx: &MenuContext<'_>,
) -> (MenuState, Vec<MenuEffect>) {
    if key == KeyInput::Ctrl('k') {
        return (MenuState::AwaitingSelector, vec![MenuEffect::Print(MENU_LINE.to_string())]);
    }

    match state {
        MenuState::Inactive => (MenuState::Inactive, vec![]),
        MenuState::AwaitingSelector => select(key, ctx),
        MenuState::Download => {
            let section = match key {
                KeyInput::Enter => Section::Whole,
                KeyInput::Char(c) => Section::Label(c.to_string()),
                _ => return (MenuState::Inactive, vec![]),
            };
            (MenuState::Inactive, vec![MenuEffect::LoadScript(section)])
        },
        MenuState::LineMode { buffer } => line_mode(buffer, key, ctx),
        MenuState::Query { mut buffer } => match key {
            KeyInput::Enter => {
                let interval = Duration::from_millis(parse_leading_digits(&buffer)).min(MAX_DELAY);
                (MenuState::Inactive, vec![
                    MenuEffect::SetQueryInterval(interval),
                    MenuEffect::Print(format!("; query every {} ms", interval.as_millis())),
                ])
            },
            KeyInput::Backspace => {
                let effects = rubout(&mut buffer);
                (MenuState::Query { buffer }, effects)
            },
            other => {
                let effects = append(&mut buffer, other);
                (MenuState::Query { buffer }, effects)
            },
        },
        MenuState::SignalSet => {
            let level = key != KeyInput::Char('0');
            (MenuState::Inactive, vec![MenuEffect::SetSignal(level)])
        },
        MenuState::BaudSet => {
            let choice = match key {
                KeyInput::Char(c) => BAUD_CHOICES.iter().find(|(k, _)| *k == c).map(|(_, b)| *b),
                _ => None,
            };
            (MenuState::Inactive, choice.map(MenuEffect::SetBaud).into_iter().collect())
        },
        MenuState::FilenameEdit { mut buffer } => match key {
            KeyInput::Enter => {
                let effects = if buffer.is_empty() {
                    vec![]
                } else {
                    vec![MenuEffect::SetDownloadFile(PathBuf::from(buffer))]
                };
                (MenuState::Inactive, effects)
            },
            KeyInput::Backspace => {
                let effects = rubout(&mut buffer);
                (MenuState::FilenameEdit { buffer }, effects)
            },
            other => {
                let effects = append(&mut buffer, other);
                (MenuState::FilenameEdit { buffer }, effects)
            },
        },
    }
}

fn select(key: KeyInput, ctx: &MenuContext<'_>) -> (MenuState, Vec<MenuEffect>) {
    let KeyInput::Char(item) = key else {
        return (MenuState::Inactive, vec![]);
    };

    let (state, prompt) = match item {
        'd' => (MenuState::Download, "; download script section:".to_string()),
        'l' => (MenuState::LineMode { buffer: String::new() }, "; line mode: ".to_string()),
        'q' => (MenuState::Query { buffer: String::new() }, "; query mode (ms): ".to_string()),
        'r' => (MenuState::SignalSet, "; set dtr >".to_string()),
        'b' => {
            (MenuState::BaudSet, format!("; Baud rate [{}]: a: 38400, b: 9600, c: 300 >", ctx.baud))
        },
        'f' => {
            let current = ctx.download_file.map(|p| p.display().to_string()).unwrap_or_default();
            (MenuState::FilenameEdit { buffer: String::new() }, format!("; download filename [{current}]: "))
        },
        't' => return (MenuState::Inactive, vec![MenuEffect::Notice("menu test".to_string())]),
        _ => return (MenuState::Inactive, vec![]),
    };
    (state, vec![MenuEffect::Print(prompt)])
}

fn line_mode(mut buffer: String, key: KeyInput, ctx: &MenuContext<'_>) -> (MenuState, Vec<MenuEffect>) {
    let effects = match key {
        KeyInput::Enter => {
            let mut effects: Vec<MenuEffect> = buffer
                .chars()
                .filter_map(|c| KeyInput::Char(c).to_bytes())
                .map(MenuEffect::Write)
                .collect();
            effects.push(MenuEffect::Write(Bytes::from_static(b"\r")));
            effects.push(MenuEffect::Remember(std::mem::take(&mut buffer)));
            effects
        },
        KeyInput::Backspace | KeyInput::Left => rubout(&mut buffer),
        KeyInput::Up => {
            buffer = ctx.last_line.to_string();
            vec![MenuEffect::Print(buffer.clone())]
        },
        KeyInput::Esc => {
            return (MenuState::Inactive, vec![MenuEffect::Print("; end line mode".to_string())]);
        },
        other => append(&mut buffer, other),
    };
    (MenuState::LineMode { buffer }, effects)
}

/// Append a printable key and echo it. Other keys are ignored.
fn append(buffer: &mut String, key: KeyInput) -> Vec<MenuEffect> {
    match key {
        KeyInput::Char(c) => {
            buffer.push(c);
            vec![MenuEffect::Print(c.to_string())]
        },
        _ => vec![],
    }
}

/// Drop the last character and erase it on screen.
fn rubout(buffer: &mut String) -> Vec<MenuEffect> {
    match buffer.pop() {
        Some(_) => vec![MenuEffect::Print(RUBOUT.to_string())],
        None => vec![],
    }
}

/// Value of the leading decimal digits; zero when there are none. Saturates
/// on overflow.
fn parse_leading_digits(text: &str) -> u64 {
    text.chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

/// Menu state plus the line-mode recall slot.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    state: MenuState,
    last_line: String,
}

impl Menu {
    /// Create a closed menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Whether keys are consumed by the menu.
    pub fn is_active(&self) -> bool {
        self.state != MenuState::Inactive
    }

    /// Last line submitted in line mode.
    pub fn last_line(&self) -> &str {
        &self.last_line
    }

    /// Feed one key. `Remember` effects are applied here and not returned.
    pub fn handle(
        &mut self,
        key: KeyInput,
        baud: u32,
        download_file: Option<&Path>,
    ) -> Vec<MenuEffect> {
        let ctx = MenuContext { baud, download_file, last_line: &self.last_line };
        let (next, effects) = transition(std::mem::take(&mut self.state), key, &ctx);
        self.state = next;

        effects
            .into_iter()
            .filter_map(|effect| match effect {
                MenuEffect::Remember(line) => {
                    self.last_line = line;
                    None
                },
                other => Some(other),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn feed(menu: &mut Menu, keys: &[KeyInput]) -> Vec<MenuEffect> {
        keys.iter().flat_map(|k| menu.handle(*k, 38_400, None)).collect()
    }

    fn written(effects: &[MenuEffect]) -> Vec<u8> {
        effects
            .iter()
            .filter_map(|e| match e {
                MenuEffect::Write(b) => Some(b.to_vec()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn open(menu: &mut Menu, item: char) {
        feed(menu, &[KeyInput::Ctrl('k'), KeyInput::Char(item)]);
    }

    #[test]
    fn line_mode_edit_and_recall() {
        let mut menu = Menu::new();
        open(&mut menu, 'l');

        let effects = feed(&mut menu, &[
            KeyInput::Char('a'),
            KeyInput::Char('b'),
            KeyInput::Backspace,
            KeyInput::Char('c'),
            KeyInput::Enter,
        ]);
        assert_eq!(written(&effects), b"ac\r");
        assert_eq!(menu.last_line(), "ac");
        assert!(effects.contains(&MenuEffect::Print(RUBOUT.to_string())));

        let recalled = feed(&mut menu, &[KeyInput::Up]);
        assert!(written(&recalled).is_empty());
        assert_eq!(recalled, vec![MenuEffect::Print("ac".into())]);
        assert_eq!(menu.state(), &MenuState::LineMode { buffer: "ac".into() });
    }

    #[test]
    fn line_mode_stays_until_escape() {
        let mut menu = Menu::new();
        open(&mut menu, 'l');
        feed(&mut menu, &[KeyInput::Char('x'), KeyInput::Enter]);
        assert!(menu.is_active());

        feed(&mut menu, &[KeyInput::Esc]);
        assert!(!menu.is_active());
    }

    #[test]
    fn left_arrow_deletes_in_line_mode() {
        let mut menu = Menu::new();
        open(&mut menu, 'l');
        let effects = feed(&mut menu, &[KeyInput::Char('a'), KeyInput::Left, KeyInput::Enter]);
        assert_eq!(written(&effects), b"\r");
    }

    #[test]
    fn download_section_key() {
        let mut menu = Menu::new();
        open(&mut menu, 'd');
        assert_eq!(feed(&mut menu, &[KeyInput::Char('x')]), vec![MenuEffect::LoadScript(
            Section::Label("x".into())
        )]);
        assert!(!menu.is_active());

        open(&mut menu, 'd');
        assert_eq!(feed(&mut menu, &[KeyInput::Enter]), vec![MenuEffect::LoadScript(Section::Whole)]);
    }

    #[test]
    fn download_cancelled_by_non_char_key() {
        let mut menu = Menu::new();
        open(&mut menu, 'd');
        assert!(feed(&mut menu, &[KeyInput::Esc]).is_empty());
        assert!(!menu.is_active());
    }

    #[test]
    fn query_interval_parsing() {
        for (typed, expected) in [("250", 250), ("", 0), ("abc", 0), ("12x4", 12)] {
            let mut menu = Menu::new();
            open(&mut menu, 'q');
            let keys: Vec<KeyInput> = typed.chars().map(KeyInput::Char).collect();
            feed(&mut menu, &keys);

            let effects = feed(&mut menu, &[KeyInput::Enter]);
            assert_eq!(effects[0], MenuEffect::SetQueryInterval(Duration::from_millis(expected)));
            assert!(!menu.is_active());
        }
    }

    #[test]
    fn query_interval_clamped() {
        let mut menu = Menu::new();
        open(&mut menu, 'q');
        let keys: Vec<KeyInput> = "99999999999999999999999".chars().map(KeyInput::Char).collect();
        feed(&mut menu, &keys);

        let effects = feed(&mut menu, &[KeyInput::Enter]);
        assert_eq!(effects, vec![
            MenuEffect::SetQueryInterval(MAX_DELAY),
            MenuEffect::Print("; query every 3600000 ms".into()),
        ]);
    }

    #[test]
    fn query_backspace_trims() {
        let mut menu = Menu::new();
        open(&mut menu, 'q');
        feed(&mut menu, &[KeyInput::Char('5'), KeyInput::Char('0'), KeyInput::Backspace]);
        let effects = feed(&mut menu, &[KeyInput::Enter]);
        assert_eq!(effects[0], MenuEffect::SetQueryInterval(Duration::from_millis(5)));
    }

    #[test]
    fn signal_levels() {
        let mut menu = Menu::new();
        open(&mut menu, 'r');
        assert_eq!(feed(&mut menu, &[KeyInput::Char('0')]), vec![MenuEffect::SetSignal(false)]);
        open(&mut menu, 'r');
        assert_eq!(feed(&mut menu, &[KeyInput::Char('1')]), vec![MenuEffect::SetSignal(true)]);
    }

    #[test]
    fn baud_choices() {
        let mut menu = Menu::new();
        open(&mut menu, 'b');
        assert_eq!(feed(&mut menu, &[KeyInput::Char('c')]), vec![MenuEffect::SetBaud(300)]);

        open(&mut menu, 'b');
        assert!(feed(&mut menu, &[KeyInput::Char('z')]).is_empty());
        assert!(!menu.is_active());
    }

    #[test]
    fn baud_prompt_shows_current_rate() {
        let mut menu = Menu::new();
        menu.handle(KeyInput::Ctrl('k'), 9_600, None);
        let effects = menu.handle(KeyInput::Char('b'), 9_600, None);
        insta::assert_debug_snapshot!(effects, @r#"
        [
            Print(
                "; Baud rate [9600]: a: 38400, b: 9600, c: 300 >",
            ),
        ]
        "#);
    }

    #[test]
    fn filename_commit_and_backspace() {
        let mut menu = Menu::new();
        open(&mut menu, 'f');
        let effects = feed(&mut menu, &[
            KeyInput::Char('a'),
            KeyInput::Char('.'),
            KeyInput::Char('x'),
            KeyInput::Backspace,
            KeyInput::Char('f'),
            KeyInput::Enter,
        ]);
        assert_eq!(effects.last(), Some(&MenuEffect::SetDownloadFile(PathBuf::from("a.f"))));

        open(&mut menu, 'f');
        assert!(feed(&mut menu, &[KeyInput::Enter]).is_empty());
    }

    #[test]
    fn unknown_selector_closes_menu() {
        let mut menu = Menu::new();
        open(&mut menu, 'z');
        assert!(!menu.is_active());

        open(&mut menu, 't');
        assert!(!menu.is_active());
    }

    #[test]
    fn ctrl_k_reopens_from_any_state() {
        let mut menu = Menu::new();
        open(&mut menu, 'q');
        feed(&mut menu, &[KeyInput::Char('9')]);
        let effects = feed(&mut menu, &[KeyInput::Ctrl('k')]);
        assert_eq!(menu.state(), &MenuState::AwaitingSelector);
        assert_eq!(effects, vec![MenuEffect::Print(MENU_LINE.into())]);
    }

    fn key_strategy() -> impl Strategy<Value = KeyInput> {
        prop_oneof![
            4 => prop::char::range('0', 'z').prop_map(KeyInput::Char),
            1 => Just(KeyInput::Enter),
            1 => Just(KeyInput::Backspace),
            1 => Just(KeyInput::Up),
            1 => Just(KeyInput::Left),
            1 => Just(KeyInput::Esc),
            1 => Just(KeyInput::Ctrl('k')),
        ]
    }

    proptest! {
        #[test]
        fn inactive_menu_ignores_everything_but_ctrl_k(key in key_strategy()) {
            let mut menu = Menu::new();
            let effects = menu.handle(key, 38_400, None);
            if key == KeyInput::Ctrl('k') {
                prop_assert!(menu.is_active());
            } else {
                prop_assert!(effects.is_empty());
                prop_assert!(!menu.is_active());
            }
        }

        #[test]
        fn writes_only_come_from_line_mode(keys in prop::collection::vec(key_strategy(), 0..40)) {
            let mut menu = Menu::new();
            for key in keys {
                let was_line_mode = matches!(menu.state(), MenuState::LineMode { .. });
                let effects = menu.handle(key, 38_400, None);
                if effects.iter().any(|e| matches!(e, MenuEffect::Write(_))) {
                    prop_assert!(was_line_mode);
                    prop_assert_eq!(key, KeyInput::Enter);
                }
            }
        }
    }
}
