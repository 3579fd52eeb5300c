//! Normalized key model
//!
//! `Key` is the portable symbolic key, `KeyEvent` one logical keystroke.
//! Keys are always carried as `Option<Key>`: control chords whose
//! conventional code is zero (Ctrl+Space, Ctrl+2) are ordinary variants.

use std::fmt;

/// Symbolic key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Insert,
    Delete,
    Home,
    End,
    PgUp,
    PgDn,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Plain Backspace (BS)
    Backspace,
    /// Ctrl+Backspace (DEL)
    Backspace2,
    Tab,
    Enter,
    Esc,
    Space,
    CtrlSpace,
    CtrlA,
    CtrlB,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlF,
    CtrlG,
    CtrlH,
    CtrlI,
    CtrlJ,
    CtrlK,
    CtrlL,
    CtrlM,
    CtrlN,
    CtrlO,
    CtrlP,
    CtrlQ,
    CtrlR,
    CtrlS,
    CtrlT,
    CtrlU,
    CtrlV,
    CtrlW,
    CtrlX,
    CtrlY,
    CtrlZ,
    /// Ctrl+[
    CtrlLsqBracket,
    /// Ctrl+\
    CtrlBackslash,
    /// Ctrl+]
    CtrlRsqBracket,
    Ctrl2,
    Ctrl3,
    Ctrl4,
    Ctrl5,
    Ctrl6,
    Ctrl7,
    Ctrl8,
}

/// Control-letter keys indexed by control code - 1 (Ctrl+A = 0x01 .. Ctrl+] = 0x1D)
const CONTROL_KEYS: [Key; 29] = [
    Key::CtrlA,
    Key::CtrlB,
    Key::CtrlC,
    Key::CtrlD,
    Key::CtrlE,
    Key::CtrlF,
    Key::CtrlG,
    Key::CtrlH,
    Key::CtrlI,
    Key::CtrlJ,
    Key::CtrlK,
    Key::CtrlL,
    Key::CtrlM,
    Key::CtrlN,
    Key::CtrlO,
    Key::CtrlP,
    Key::CtrlQ,
    Key::CtrlR,
    Key::CtrlS,
    Key::CtrlT,
    Key::CtrlU,
    Key::CtrlV,
    Key::CtrlW,
    Key::CtrlX,
    Key::CtrlY,
    Key::CtrlZ,
    Key::CtrlLsqBracket,
    Key::CtrlBackslash,
    Key::CtrlRsqBracket,
];

impl Key {
    /// Function keys in order (F1..F12)
    pub const FUNCTION_KEYS: [Key; 12] = [
        Key::F1,
        Key::F2,
        Key::F3,
        Key::F4,
        Key::F5,
        Key::F6,
        Key::F7,
        Key::F8,
        Key::F9,
        Key::F10,
        Key::F11,
        Key::F12,
    ];

    /// Map an ASCII control code (1..=29) to its Ctrl+letter key
    pub fn from_control_code(code: u16) -> Option<Key> {
        match code {
            1..=29 => Some(CONTROL_KEYS[code as usize - 1]),
            _ => None,
        }
    }

    /// Function key from its number (1-12)
    pub fn function(n: u8) -> Option<Key> {
        match n {
            1..=12 => Some(Self::FUNCTION_KEYS[n as usize - 1]),
            _ => None,
        }
    }

    /// Conventional 16-bit key code
    ///
    /// Control chords use their ASCII control code, so several keys share
    /// a value (CtrlSpace = Ctrl2 = 0x00, Esc = Ctrl3 = 0x1B,
    /// Backspace2 = Ctrl8 = 0x7F). Function and navigation keys count
    /// down from 0xFFFF.
    pub fn code(self) -> u16 {
        match self {
            Key::F1 => 0xFFFF,
            Key::F2 => 0xFFFE,
            Key::F3 => 0xFFFD,
            Key::F4 => 0xFFFC,
            Key::F5 => 0xFFFB,
            Key::F6 => 0xFFFA,
            Key::F7 => 0xFFF9,
            Key::F8 => 0xFFF8,
            Key::F9 => 0xFFF7,
            Key::F10 => 0xFFF6,
            Key::F11 => 0xFFF5,
            Key::F12 => 0xFFF4,
            Key::Insert => 0xFFF3,
            Key::Delete => 0xFFF2,
            Key::Home => 0xFFF1,
            Key::End => 0xFFF0,
            Key::PgUp => 0xFFEF,
            Key::PgDn => 0xFFEE,
            Key::ArrowUp => 0xFFED,
            Key::ArrowDown => 0xFFEC,
            Key::ArrowLeft => 0xFFEB,
            Key::ArrowRight => 0xFFEA,
            Key::CtrlSpace | Key::Ctrl2 => 0x00,
            Key::Backspace => 0x08,
            Key::Tab => 0x09,
            Key::Enter => 0x0D,
            Key::Esc | Key::Ctrl3 => 0x1B,
            Key::Ctrl4 => 0x1C,
            Key::Ctrl5 => 0x1D,
            Key::Ctrl6 => 0x1E,
            Key::Ctrl7 => 0x1F,
            Key::Space => 0x20,
            Key::Backspace2 | Key::Ctrl8 => 0x7F,
            ctrl => CONTROL_KEYS
                .iter()
                .position(|&k| k == ctrl)
                .map(|i| i as u16 + 1)
                .unwrap_or_default(),
        }
    }

    /// Human-readable name ("ArrowLeft", "Ctrl+A", "F5")
    pub fn name(self) -> &'static str {
        match self {
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",
            Key::Insert => "Insert",
            Key::Delete => "Delete",
            Key::Home => "Home",
            Key::End => "End",
            Key::PgUp => "PgUp",
            Key::PgDn => "PgDn",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::Backspace => "Backspace",
            Key::Backspace2 => "Ctrl+Backspace",
            Key::Tab => "Tab",
            Key::Enter => "Enter",
            Key::Esc => "Esc",
            Key::Space => "Space",
            Key::CtrlSpace => "Ctrl+Space",
            Key::CtrlA => "Ctrl+A",
            Key::CtrlB => "Ctrl+B",
            Key::CtrlC => "Ctrl+C",
            Key::CtrlD => "Ctrl+D",
            Key::CtrlE => "Ctrl+E",
            Key::CtrlF => "Ctrl+F",
            Key::CtrlG => "Ctrl+G",
            Key::CtrlH => "Ctrl+H",
            Key::CtrlI => "Ctrl+I",
            Key::CtrlJ => "Ctrl+J",
            Key::CtrlK => "Ctrl+K",
            Key::CtrlL => "Ctrl+L",
            Key::CtrlM => "Ctrl+M",
            Key::CtrlN => "Ctrl+N",
            Key::CtrlO => "Ctrl+O",
            Key::CtrlP => "Ctrl+P",
            Key::CtrlQ => "Ctrl+Q",
            Key::CtrlR => "Ctrl+R",
            Key::CtrlS => "Ctrl+S",
            Key::CtrlT => "Ctrl+T",
            Key::CtrlU => "Ctrl+U",
            Key::CtrlV => "Ctrl+V",
            Key::CtrlW => "Ctrl+W",
            Key::CtrlX => "Ctrl+X",
            Key::CtrlY => "Ctrl+Y",
            Key::CtrlZ => "Ctrl+Z",
            Key::CtrlLsqBracket => "Ctrl+[",
            Key::CtrlBackslash => "Ctrl+\\",
            Key::CtrlRsqBracket => "Ctrl+]",
            Key::Ctrl2 => "Ctrl+2",
            Key::Ctrl3 => "Ctrl+3",
            Key::Ctrl4 => "Ctrl+4",
            Key::Ctrl5 => "Ctrl+5",
            Key::Ctrl6 => "Ctrl+6",
            Key::Ctrl7 => "Ctrl+7",
            Key::Ctrl8 => "Ctrl+8",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One normalized keystroke
///
/// A translated event carries either a symbolic key or a literal rune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Literal character (None for symbolic keys)
    pub rune: Option<char>,
    /// Symbolic key (None for literal characters)
    pub key: Option<Key>,
}

impl KeyEvent {
    /// Event for a symbolic key
    pub fn key(key: Key) -> Self {
        Self {
            rune: None,
            key: Some(key),
        }
    }

    /// Event for a literal character
    pub fn rune(rune: char) -> Self {
        Self {
            rune: Some(rune),
            key: None,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.key, self.rune) {
            (Some(key), _) => write!(f, "{}", key),
            (None, Some(rune)) => write!(f, "{:?}", rune),
            (None, None) => f.write_str("<none>"),
        }
    }
}
