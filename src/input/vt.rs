//! VT input decoding
//!
//! Terminals deliver keys as bytes: control codes, UTF-8 text and
//! escape sequences. This decoder turns such a byte buffer into the
//! console key records the translator consumes, so TTY input follows
//! the same classification path as native console input.
//!
//! Recognized sequences:
//! - CSI `A`/`B`/`C`/`D`/`H`/`F` (cursor, home/end), with xterm
//!   modifier parameter (`ESC [ 1 ; 5 A` = Ctrl+Up)
//! - CSI `n ~` (insert/delete/home/end/page keys, F1-F12)
//! - CSI `Z` (Shift+Tab)
//! - SS3 `P`/`Q`/`R`/`S` (F1-F4), SS3 cursor keys
//! - Linux console `ESC [ [ A`..`E` (F1-F5)
//! - `ESC x` (Alt+x)
//!
//! Well-formed but unknown CSI sequences (mouse, focus reports) are
//! swallowed. Reads may split a sequence or a UTF-8 character anywhere,
//! so `Decoder` holds an incomplete tail until the next read. An ESC
//! alone in a read is the Esc key; a held tail that never completes is
//! released by `Decoder::flush`.

use super::keycodes::{
    ControlKeyState, VK_0, VK_A, VK_BACK, VK_DELETE, VK_DOWN, VK_END, VK_ESCAPE, VK_F1, VK_F10,
    VK_F11, VK_F12, VK_F2, VK_F3, VK_F4, VK_F5, VK_F6, VK_F7, VK_F8, VK_F9, VK_HOME, VK_INSERT,
    VK_LEFT, VK_NEXT, VK_OEM_5, VK_OEM_6, VK_OEM_MINUS, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SPACE,
    VK_TAB, VK_UP,
};
use super::record::KeyRecord;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Streaming decoder for terminal input
#[derive(Debug, Default)]
pub struct Decoder {
    /// Bytes of a sequence or character still waiting for the rest
    tail: Vec<u8>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an incomplete sequence is held back
    pub fn has_pending(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Decode one read; an incomplete trailing sequence is kept for the next
    pub fn feed(&mut self, input: &[u8]) -> Vec<KeyRecord> {
        if self.tail.is_empty() && matches!(input, [ESC]) {
            return vec![esc_key()];
        }

        let mut buf = std::mem::take(&mut self.tail);
        buf.extend_from_slice(input);

        let mut records = Vec::with_capacity(buf.len());
        let used = decode_into(&buf, false, &mut records);
        buf.drain(..used);
        self.tail = buf;
        records
    }

    /// Decode the held tail as if no more input will follow
    pub fn flush(&mut self) -> Vec<KeyRecord> {
        let tail = std::mem::take(&mut self.tail);
        let mut records = Vec::new();
        decode_into(&tail, true, &mut records);
        records
    }
}

/// Decode a complete buffer of terminal input into key records
pub fn decode(input: &[u8]) -> Vec<KeyRecord> {
    let mut decoder = Decoder::new();
    let mut records = decoder.feed(input);
    records.extend(decoder.flush());
    records
}

/// Decode as much of `input` as possible, return bytes consumed
///
/// Unless `at_end` is set, stops in front of an incomplete sequence.
fn decode_into(input: &[u8], at_end: bool, out: &mut Vec<KeyRecord>) -> usize {
    let mut pos = 0;

    while pos < input.len() {
        let step = if input[pos] == ESC {
            decode_escape(&input[pos..], at_end, out)
        } else {
            decode_char(&input[pos..], ControlKeyState::empty(), at_end, out)
        };
        match step {
            Some(consumed) => pos += consumed.max(1),
            None => break,
        }
    }

    pos
}

/// Result of parsing an escape sequence
enum Parsed<T> {
    /// Bytes consumed and the decoded value
    Done(usize, T),
    /// Input ended inside the sequence
    Incomplete,
    /// Not a sequence this decoder knows
    Invalid,
}

/// Decode a sequence starting with ESC, return bytes consumed
/// (None if incomplete)
fn decode_escape(input: &[u8], at_end: bool, out: &mut Vec<KeyRecord>) -> Option<usize> {
    let Some(&next) = input.get(1) else {
        if !at_end {
            return None;
        }
        out.push(esc_key());
        return Some(1);
    };

    match next {
        b'[' => match parse_csi(input) {
            Parsed::Done(len, record) => {
                out.extend(record);
                return Some(len);
            }
            Parsed::Incomplete if !at_end => return None,
            _ => {}
        },
        b'O' => match parse_ss3(input) {
            Parsed::Done(len, record) => {
                out.push(record);
                return Some(len);
            }
            Parsed::Incomplete if !at_end => return None,
            _ => {}
        },
        // ESC ESC: the first one is a plain Esc
        ESC => {
            out.push(esc_key());
            return Some(1);
        }
        _ => {}
    }

    // Alt + character
    decode_char(&input[1..], ControlKeyState::LEFT_ALT, at_end, out).map(|n| n + 1)
}

/// Parse `ESC [ ...`
fn parse_csi(input: &[u8]) -> Parsed<Option<KeyRecord>> {
    // Linux console function keys: ESC [ [ A..E
    if input.get(2) == Some(&b'[') {
        let vk = match input.get(3) {
            None => return Parsed::Incomplete,
            Some(b'A') => VK_F1,
            Some(b'B') => VK_F2,
            Some(b'C') => VK_F3,
            Some(b'D') => VK_F4,
            Some(b'E') => VK_F5,
            Some(_) => return Parsed::Invalid,
        };
        return Parsed::Done(4, Some(key(vk, 0, ControlKeyState::empty())));
    }

    let mut end = 2;
    while matches!(input.get(end), Some(0x30..=0x3f)) {
        end += 1;
    }
    let params = &input[2..end];
    while matches!(input.get(end), Some(0x20..=0x2f)) {
        end += 1;
    }
    let final_byte = match input.get(end) {
        Some(&b @ 0x40..=0x7e) => b,
        Some(_) => return Parsed::Invalid,
        None => return Parsed::Incomplete,
    };
    let len = end + 1;

    let mut fields = params
        .split(|&b| b == b';')
        .map(|f| std::str::from_utf8(f).ok().and_then(|s| s.parse::<u16>().ok()));
    let first = fields.next().flatten();
    let mods = fields.next().flatten().map(modifier_state).unwrap_or_default();

    let vk = match final_byte {
        b'A' => VK_UP,
        b'B' => VK_DOWN,
        b'C' => VK_RIGHT,
        b'D' => VK_LEFT,
        b'H' => VK_HOME,
        b'F' => VK_END,
        b'P' => VK_F1,
        b'Q' => VK_F2,
        b'R' => VK_F3,
        b'S' => VK_F4,
        b'Z' => {
            let record = key(VK_TAB, b'\t' as u16, ControlKeyState::SHIFT);
            return Parsed::Done(len, Some(record));
        }
        b'~' => match first.and_then(tilde_key) {
            Some(vk) => vk,
            None => return Parsed::Done(len, None),
        },
        _ => return Parsed::Done(len, None),
    };

    Parsed::Done(len, Some(key(vk, 0, mods)))
}

/// Parse `ESC O x`
fn parse_ss3(input: &[u8]) -> Parsed<KeyRecord> {
    let vk = match input.get(2) {
        None => return Parsed::Incomplete,
        Some(b'P') => VK_F1,
        Some(b'Q') => VK_F2,
        Some(b'R') => VK_F3,
        Some(b'S') => VK_F4,
        Some(b'A') => VK_UP,
        Some(b'B') => VK_DOWN,
        Some(b'C') => VK_RIGHT,
        Some(b'D') => VK_LEFT,
        Some(b'H') => VK_HOME,
        Some(b'F') => VK_END,
        Some(_) => return Parsed::Invalid,
    };
    Parsed::Done(3, key(vk, 0, ControlKeyState::empty()))
}

/// `CSI n ~` key numbers
fn tilde_key(n: u16) -> Option<u16> {
    let vk = match n {
        1 | 7 => VK_HOME,
        2 => VK_INSERT,
        3 => VK_DELETE,
        4 | 8 => VK_END,
        5 => VK_PRIOR,
        6 => VK_NEXT,
        11 => VK_F1,
        12 => VK_F2,
        13 => VK_F3,
        14 => VK_F4,
        15 => VK_F5,
        17 => VK_F6,
        18 => VK_F7,
        19 => VK_F8,
        20 => VK_F9,
        21 => VK_F10,
        23 => VK_F11,
        24 => VK_F12,
        _ => return None,
    };
    Some(vk)
}

/// xterm modifier parameter (1 + shift|alt<<1|ctrl<<2)
fn modifier_state(param: u16) -> ControlKeyState {
    let bits = param.saturating_sub(1);
    let mut state = ControlKeyState::empty();
    if bits & 1 != 0 {
        state |= ControlKeyState::SHIFT;
    }
    if bits & 2 != 0 {
        state |= ControlKeyState::LEFT_ALT;
    }
    if bits & 4 != 0 {
        state |= ControlKeyState::LEFT_CTRL;
    }
    state
}

/// Decode one control byte or UTF-8 character, return bytes consumed
/// (None if a character is cut off and more input may follow)
fn decode_char(
    input: &[u8],
    extra: ControlKeyState,
    at_end: bool,
    out: &mut Vec<KeyRecord>,
) -> Option<usize> {
    let Some(&b) = input.first() else {
        return Some(0);
    };
    let ctrl = ControlKeyState::LEFT_CTRL | extra;

    let record = match b {
        0x00 => key(VK_SPACE, 0, ctrl),
        0x08 => key(VK_BACK, DEL as u16, ctrl),
        b'\t' => key(VK_TAB, b as u16, extra),
        b'\r' => key(VK_RETURN, b as u16, extra),
        ESC => key(VK_ESCAPE, b as u16, extra),
        0x01..=0x1a => key(VK_A + b as u16 - 1, b as u16, ctrl),
        0x1c => key(VK_OEM_5, b as u16, ctrl),
        0x1d => key(VK_OEM_6, b as u16, ctrl),
        0x1e => key(VK_0 + 6, b as u16, ctrl | ControlKeyState::SHIFT),
        0x1f => key(VK_OEM_MINUS, b as u16, ctrl | ControlKeyState::SHIFT),
        DEL => key(VK_BACK, 0x08, extra),
        b' ' => key(VK_SPACE, b as u16, extra),
        b'a'..=b'z' => key(VK_A + (b - b'a') as u16, b as u16, extra),
        b'A'..=b'Z' => key(
            VK_A + (b - b'A') as u16,
            b as u16,
            extra | ControlKeyState::SHIFT,
        ),
        b'0'..=b'9' => key(VK_0 + (b - b'0') as u16, b as u16, extra),
        0x21..=0x7e => key(0, b as u16, extra),
        _ => return decode_utf8(input, extra, at_end, out),
    };

    out.push(record);
    Some(1)
}

/// Decode one multi-byte UTF-8 character into UTF-16 records
fn decode_utf8(
    input: &[u8],
    extra: ControlKeyState,
    at_end: bool,
    out: &mut Vec<KeyRecord>,
) -> Option<usize> {
    let len = match input[0] {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Some(1),
    };
    let Some(bytes) = input.get(..len) else {
        // Cut off by the end of the read: wait for the continuation bytes
        let continued = input[1..].iter().all(|b| (0x80..=0xbf).contains(b));
        return if continued && !at_end { None } else { Some(1) };
    };
    let Some(ch) = std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) else {
        return Some(1);
    };

    let mut units = [0u16; 2];
    for &unit in ch.encode_utf16(&mut units).iter() {
        out.push(key(0, unit, extra));
    }
    Some(len)
}

fn esc_key() -> KeyRecord {
    key(VK_ESCAPE, ESC as u16, ControlKeyState::empty())
}

fn key(vk: u16, unicode_char: u16, state: ControlKeyState) -> KeyRecord {
    KeyRecord::press(vk, unicode_char, state)
}
