//! Download scripts and the staged line queue.
//!
//! A script is plain text. Lines starting with `\ =LABEL=` open a section,
//! and a line starting with `\ ===` ends the usable part of the file. Both
//! are comment lines to the device (`\` starts a line comment in Forth-style
//! consoles), so a marker line may be sent along with its section.
//!
//! ```text
//! \ =a=
//! : blink  led on 100 ms led off ;
//! \ =b=
//! 3 0 do blink loop
//! \ ===
//! notes that are never sent
//! ```

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::ScriptError;

/// Prefix shared by section markers and the end sentinel.
pub const SECTION_PREFIX: &str = "\\ =";

/// Line prefix that ends the usable script.
pub const END_SENTINEL: &str = "\\ ===";

/// Which part of a script to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// The whole script, up to the end sentinel.
    Whole,
    /// The section opened by `\ =LABEL=`.
    Label(String),
}

impl Section {
    /// Marker line prefix for a labelled section.
    pub fn marker(&self) -> Option<String> {
        match self {
            Self::Whole => None,
            Self::Label(label) => Some(format!("{SECTION_PREFIX}{label}=")),
        }
    }
}

/// How the lines of a parsed script were selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No section requested.
    Whole,
    /// Section found; the first line is its marker.
    Section(String),
    /// Section requested but absent; the whole script was kept.
    MissingSection(String),
}

/// A parsed download script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    lines: Vec<String>,
    selection: Selection,
}

impl Script {
    /// Parse `text`, keeping only `section`.
    ///
    /// # Errors
    ///
    /// - `ScriptError::Empty` if nothing is left to send
    pub fn parse(text: &str, section: &Section) -> Result<Self, ScriptError> {
        let (selected, selection) = match section {
            Section::Whole => (text, Selection::Whole),
            Section::Label(label) => match select_section(text, section) {
                Some(selected) => (selected, Selection::Section(label.clone())),
                None => (text, Selection::MissingSection(label.clone())),
            },
        };

        let usable = match find_line_starting(selected, END_SENTINEL, 0) {
            Some(end) => &selected[..end],
            None => selected,
        };

        let lines = split_lines(usable);
        if lines.is_empty() {
            return Err(ScriptError::Empty);
        }

        Ok(Self { lines, selection })
    }

    /// All lines in send order, marker line included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume into lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// How the lines were selected.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Section marker line, when a section was found.
    pub fn header(&self) -> Option<&str> {
        match self.selection {
            Selection::Section(_) => self.lines.first().map(String::as_str),
            Selection::Whole | Selection::MissingSection(_) => None,
        }
    }

    /// Lines after the section marker; every line for a whole script.
    pub fn body(&self) -> &[String] {
        match self.selection {
            Selection::Section(_) => self.lines.get(1..).unwrap_or_default(),
            Selection::Whole | Selection::MissingSection(_) => &self.lines,
        }
    }
}

/// Slice of `text` from the section marker line up to (not including) the
/// next section marker.
fn select_section<'a>(text: &'a str, section: &Section) -> Option<&'a str> {
    let marker = section.marker()?;
    let start = find_line_starting(text, &marker, 0)?;
    let rest = &text[start..];

    let body_start = rest.find('\n').map_or(rest.len(), |i| i + 1);
    let end = find_line_starting(rest, SECTION_PREFIX, body_start).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Byte offset of the first line at or after `from` that begins with
/// `prefix`. `from` must be a line start.
fn find_line_starting(text: &str, prefix: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while pos <= text.len() {
        let rest = text.get(pos..)?;
        if rest.starts_with(prefix) {
            return Some(pos);
        }
        pos += rest.find('\n')? + 1;
    }
    None
}

/// Split on LF or CRLF. A final line terminator does not produce an empty
/// trailing line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> =
        text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line).to_string()).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Decode single-byte script text. Every byte maps to the char of the same
/// code point, so nothing is lost.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text for the wire, one byte per char. Chars beyond U+00FF become
/// `?`.
pub fn encode_latin1(text: &str) -> Bytes {
    text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
}

/// Lines staged for transmission.
///
/// Replaced wholesale by each download and drained from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptQueue {
    lines: VecDeque<String>,
}

impl ScriptQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents.
    pub fn replace(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines = lines.into_iter().collect();
    }

    /// Pop the next line to send.
    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Take every queued line, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }

    /// Discard all queued lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of queued lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn label(l: &str) -> Section {
        Section::Label(l.to_string())
    }

    #[test]
    fn section_excludes_following_section() {
        let text = "\\ =x=\nLINE1\nLINE2\n\\ =y=\nOTHER";
        let script = Script::parse(text, &label("x")).unwrap();

        assert_eq!(script.header(), Some("\\ =x="));
        assert_eq!(script.body(), ["LINE1", "LINE2"]);
        assert_eq!(script.lines().len(), 3);
    }

    #[test]
    fn section_in_middle_of_file() {
        let text = "preamble\r\n\\ =a=\r\none\r\n\\ =b=\r\ntwo\r\nthree\r\n\\ =c=\r\nfour\r\n";
        let script = Script::parse(text, &label("b")).unwrap();

        assert_eq!(script.lines(), ["\\ =b=", "two", "three"]);
        assert_eq!(script.selection(), &Selection::Section("b".into()));
    }

    #[test]
    fn last_section_stops_at_end_sentinel() {
        let text = "\\ =a=\none\n\\ =b=\ntwo\n\\ ===\nnotes\n";
        let script = Script::parse(text, &label("b")).unwrap();
        assert_eq!(script.body(), ["two"]);
    }

    #[test]
    fn whole_script_stops_at_end_sentinel() {
        let text = "first\nsecond\n\\ =====\nnot sent\n";
        let script = Script::parse(text, &Section::Whole).unwrap();

        assert_eq!(script.lines(), ["first", "second"]);
        assert_eq!(script.header(), None);
        assert_eq!(script.body(), ["first", "second"]);
    }

    #[test]
    fn missing_section_keeps_whole_script() {
        let text = "\\ =a=\none\n";
        let script = Script::parse(text, &label("z")).unwrap();

        assert_eq!(script.selection(), &Selection::MissingSection("z".into()));
        assert_eq!(script.lines(), ["\\ =a=", "one"]);
    }

    #[test]
    fn marker_must_start_a_line() {
        let text = "say \\ =x= here\n\\ =x=\nreal\n";
        let script = Script::parse(text, &label("x")).unwrap();
        assert_eq!(script.body(), ["real"]);
    }

    #[test]
    fn label_is_matched_literally() {
        let text = "\\ =.=\ndot\n\\ =a=\nletter\n";
        let script = Script::parse(text, &label(".")).unwrap();
        assert_eq!(script.body(), ["dot"]);
    }

    #[test]
    fn empty_script_rejected() {
        assert_eq!(Script::parse("", &Section::Whole), Err(ScriptError::Empty));
        assert_eq!(Script::parse("\\ ===\nall notes\n", &Section::Whole), Err(ScriptError::Empty));
    }

    #[test]
    fn blank_lines_are_kept() {
        let script = Script::parse("a\n\nb\n", &Section::Whole).unwrap();
        assert_eq!(script.lines(), ["a", "", "b"]);

        let script = Script::parse("\r\n", &Section::Whole).unwrap();
        assert_eq!(script.lines(), [""]);
    }

    #[test]
    fn latin1_round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = decode_latin1(&bytes);
        assert_eq!(&encode_latin1(&text)[..], &bytes[..]);
        assert_eq!(&encode_latin1("a€b")[..], b"a?b");
    }

    #[test]
    fn queue_drains_front_first() {
        let mut queue = ScriptQueue::new();
        queue.replace(["fet".to_string(), "AB".to_string()]);
        queue.replace(["CD".to_string(), "EF".to_string()]);

        assert_eq!(queue.pop().as_deref(), Some("CD"));
        assert_eq!(queue.drain(), vec!["EF".to_string()]);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    proptest! {
        #[test]
        fn lines_never_contain_terminators(text in "[a-z\\\\ =\r\n]{0,64}") {
            if let Ok(script) = Script::parse(&text, &Section::Whole) {
                for line in script.lines() {
                    prop_assert!(!line.contains('\n'));
                    prop_assert!(!line.starts_with(END_SENTINEL));
                }
            }
        }

        #[test]
        fn section_body_has_no_markers(text in "[ab\\\\ =\n]{0,64}", key in "[ab]") {
            if let Ok(script) = Script::parse(&text, &Section::Label(key)) {
                if script.header().is_some() {
                    for line in script.body() {
                        prop_assert!(!line.starts_with(SECTION_PREFIX));
                    }
                }
            }
        }
    }
}
