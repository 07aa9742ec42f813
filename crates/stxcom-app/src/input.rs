//! Terminal-agnostic keyboard input.

use bytes::Bytes;

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Character typed with Ctrl held.
    Ctrl(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
}

impl KeyInput {
    /// Bytes a terminal would send to the device for this key.
    ///
    /// Returns `None` for Ctrl combinations without a control code.
    pub fn to_bytes(self) -> Option<Bytes> {
        let bytes: &'static [u8] = match self {
            Self::Char(c) => {
                let mut buf = [0u8; 4];
                return Some(Bytes::copy_from_slice(c.encode_utf8(&mut buf).as_bytes()));
            },
            Self::Ctrl(c) => return control_code(c).map(|b| Bytes::copy_from_slice(&[b])),
            Self::Enter => b"\r",
            Self::Backspace => b"\x7f",
            Self::Delete => b"\x1b[3~",
            Self::Tab => b"\t",
            Self::Esc => b"\x1b",
            Self::Left => b"\x1b[D",
            Self::Right => b"\x1b[C",
            Self::Up => b"\x1b[A",
            Self::Down => b"\x1b[B",
            Self::Home => b"\x1b[H",
            Self::End => b"\x1b[F",
        };
        Some(Bytes::from_static(bytes))
    }
}

/// Control code for Ctrl+`c` (`a` → 0x01 ... `_` → 0x1f).
fn control_code(c: char) -> Option<u8> {
    let upper = u8::try_from(c.to_ascii_uppercase()).ok()?;
    (b'@'..=b'_').contains(&upper).then_some(upper & 0x1f)
}
