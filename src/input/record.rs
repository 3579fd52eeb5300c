//! Raw console input records

use super::keycodes::ControlKeyState;

/// Event type tag of a console key record
pub const KEY_EVENT: u16 = 0x0001;
/// Event type tag of a console mouse record
pub const MOUSE_EVENT: u16 = 0x0002;
/// Event type tag of a console buffer-resize record
pub const WINDOW_BUFFER_SIZE_EVENT: u16 = 0x0004;
/// Event type tag of a console menu record
pub const MENU_EVENT: u16 = 0x0008;
/// Event type tag of a console focus record
pub const FOCUS_EVENT: u16 = 0x0010;

/// Short name of a console record type, for logging
pub fn event_type_name(event_type: u16) -> &'static str {
    match event_type {
        KEY_EVENT => "key",
        MOUSE_EVENT => "mouse",
        WINDOW_BUFFER_SIZE_EVENT => "buffer-size",
        MENU_EVENT => "menu",
        FOCUS_EVENT => "focus",
        _ => "none",
    }
}

/// Platform-reported key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyRecord {
    /// true=press, false=release
    pub key_down: bool,
    /// Number of coalesced auto-repeat presses
    pub repeat_count: u16,
    /// Layout-independent virtual-key code
    pub virtual_key_code: u16,
    /// Hardware scan code
    pub virtual_scan_code: u16,
    /// UTF-16 code unit produced by the key (0 = none)
    pub unicode_char: u16,
    /// Modifier keys held
    pub control_key_state: ControlKeyState,
}

impl KeyRecord {
    /// Single key-down record
    pub fn press(virtual_key_code: u16, unicode_char: u16, state: ControlKeyState) -> Self {
        Self {
            key_down: true,
            repeat_count: 1,
            virtual_key_code,
            virtual_scan_code: 0,
            unicode_char,
            control_key_state: state,
        }
    }

    /// Same record as a key-up
    pub fn released(mut self) -> Self {
        self.key_down = false;
        self
    }

    /// Same record with a different repeat count
    pub fn repeated(mut self, repeat_count: u16) -> Self {
        self.repeat_count = repeat_count;
        self
    }
}

/// One record read from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    /// Keyboard record
    Key(KeyRecord),
    /// Mouse, resize, menu or focus record (event type tag); discarded
    Other(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_name() {
        assert_eq!(event_type_name(KEY_EVENT), "key");
        assert_eq!(event_type_name(MOUSE_EVENT), "mouse");
        assert_eq!(event_type_name(WINDOW_BUFFER_SIZE_EVENT), "buffer-size");
        assert_eq!(event_type_name(MENU_EVENT), "menu");
        assert_eq!(event_type_name(FOCUS_EVENT), "focus");
        assert_eq!(event_type_name(0), "none");
    }

    #[test]
    fn test_record_builders() {
        let record = KeyRecord::press(0x41, 'a' as u16, ControlKeyState::empty());
        assert!(record.key_down);
        assert_eq!(record.repeat_count, 1);
        assert!(!record.released().key_down);
        assert_eq!(record.repeated(5).repeat_count, 5);
    }
}
