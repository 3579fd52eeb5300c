//! Key translation
//!
//! Map a raw console key record to a normalized `KeyEvent`.
//! Classification order (first match wins):
//! 1. Function keys F1-F12 (any modifiers)
//! 2. Named keys with codes up to VK_DELETE
//! 3. Ctrl chords: control codes 1-29, then the digit-row table
//! 4. Literal character
//!
//! Key-up records and records that fit none of these yield `None`.

use super::keycodes::{
    function_key_number, VK_BACK, VK_DELETE, VK_DOWN, VK_END, VK_ESCAPE, VK_HOME, VK_INSERT,
    VK_LEFT, VK_NEXT, VK_OEM_2, VK_OEM_3, VK_OEM_MINUS, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SPACE,
    VK_TAB, VK_UP,
};
use super::keys::{Key, KeyEvent};
use super::record::KeyRecord;

/// Ctrl + digit-row / punctuation chords
///
/// Several virtual-key codes reach the same chord depending on the
/// keyboard layout: Ctrl+2 arrives as '`' (0xC0) or '2', Ctrl+7 as
/// '-' (0xBD), '/' (0xBF) or '7', Ctrl+8 as Backspace or '8'.
const CTRL_DIGIT_KEYS: &[(u16, Key)] = &[
    (VK_OEM_3, Key::Ctrl2),
    (b'2' as u16, Key::Ctrl2),
    (b'3' as u16, Key::Ctrl3),
    (b'4' as u16, Key::Ctrl4),
    (b'5' as u16, Key::Ctrl5),
    (b'6' as u16, Key::Ctrl6),
    (VK_OEM_MINUS, Key::Ctrl7),
    (VK_OEM_2, Key::Ctrl7),
    (b'7' as u16, Key::Ctrl7),
    (VK_BACK, Key::Ctrl8),
    (b'8' as u16, Key::Ctrl8),
];

/// Translate a raw key record
///
/// Returns None for key-up records and records that produce no key
/// (bare modifier presses, unmapped control codes).
pub fn translate(record: &KeyRecord) -> Option<KeyEvent> {
    if !record.key_down {
        return None;
    }

    let vk = record.virtual_key_code;
    let ctrl = record.control_key_state.ctrl();

    if let Some(n) = function_key_number(vk) {
        return Key::function(n).map(KeyEvent::key);
    }

    if vk <= VK_DELETE {
        if let Some(key) = named_key(vk, ctrl) {
            return Some(KeyEvent::key(key));
        }
    }

    if ctrl {
        if let Some(key) = Key::from_control_code(record.unicode_char) {
            return Some(KeyEvent::key(key));
        }
        if let Some(key) = ctrl_digit_key(vk) {
            return Some(KeyEvent::key(key));
        }
    }

    if record.unicode_char != 0 {
        return char::from_u32(record.unicode_char as u32).map(KeyEvent::rune);
    }

    None
}

/// Named navigation / editing key
fn named_key(vk: u16, ctrl: bool) -> Option<Key> {
    let key = match vk {
        VK_INSERT => Key::Insert,
        VK_DELETE => Key::Delete,
        VK_HOME => Key::Home,
        VK_END => Key::End,
        VK_PRIOR => Key::PgUp,
        VK_NEXT => Key::PgDn,
        VK_UP => Key::ArrowUp,
        VK_DOWN => Key::ArrowDown,
        VK_LEFT => Key::ArrowLeft,
        VK_RIGHT => Key::ArrowRight,
        VK_BACK if ctrl => Key::Backspace2,
        VK_BACK => Key::Backspace,
        VK_TAB => Key::Tab,
        VK_RETURN => Key::Enter,
        VK_ESCAPE => Key::Esc,
        VK_SPACE if ctrl => Key::CtrlSpace,
        VK_SPACE => Key::Space,
        _ => return None,
    };
    Some(key)
}

/// Ctrl chord on the digit row
fn ctrl_digit_key(vk: u16) -> Option<Key> {
    CTRL_DIGIT_KEYS
        .iter()
        .find(|&&(code, _)| code == vk)
        .map(|&(_, key)| key)
}
