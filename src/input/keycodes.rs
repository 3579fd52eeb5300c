//! Console virtual-key codes and modifier state
//!
//! Values match the Windows console `KEY_EVENT_RECORD` encoding,
//! which every backend reports (the Unix backend synthesizes them
//! from VT byte sequences).

use bitflags::bitflags;

// ============================================================================
// Editing Keys
// ============================================================================

/// Backspace key
pub const VK_BACK: u16 = 0x08;

/// Tab key
pub const VK_TAB: u16 = 0x09;

/// Enter key
pub const VK_RETURN: u16 = 0x0D;

/// Escape key
pub const VK_ESCAPE: u16 = 0x1B;

/// Space bar
pub const VK_SPACE: u16 = 0x20;

// ============================================================================
// Navigation Keys
// ============================================================================

/// Page Up key
pub const VK_PRIOR: u16 = 0x21;

/// Page Down key
pub const VK_NEXT: u16 = 0x22;

/// End key
pub const VK_END: u16 = 0x23;

/// Home key
pub const VK_HOME: u16 = 0x24;

/// Left arrow key
pub const VK_LEFT: u16 = 0x25;

/// Up arrow key
pub const VK_UP: u16 = 0x26;

/// Right arrow key
pub const VK_RIGHT: u16 = 0x27;

/// Down arrow key
pub const VK_DOWN: u16 = 0x28;

/// Insert key
pub const VK_INSERT: u16 = 0x2D;

/// Delete key (highest code of the named-key table)
pub const VK_DELETE: u16 = 0x2E;

// ============================================================================
// Character Keys
// ============================================================================

/// Digit row '0' ('1'..'9' follow contiguously)
pub const VK_0: u16 = 0x30;

/// Letter 'A' ('B'..'Z' follow contiguously)
pub const VK_A: u16 = 0x41;

/// OEM '-' / '_' key (US layout)
pub const VK_OEM_MINUS: u16 = 0xBD;

/// OEM '/' / '?' key (US layout)
pub const VK_OEM_2: u16 = 0xBF;

/// OEM '`' / '~' key (US layout)
pub const VK_OEM_3: u16 = 0xC0;

/// OEM '\' / '|' key (US layout)
pub const VK_OEM_5: u16 = 0xDC;

/// OEM ']' / '}' key (US layout)
pub const VK_OEM_6: u16 = 0xDD;

// ============================================================================
// Function Keys
// ============================================================================

/// F1 key
pub const VK_F1: u16 = 0x70;

/// F2 key
pub const VK_F2: u16 = 0x71;

/// F3 key
pub const VK_F3: u16 = 0x72;

/// F4 key
pub const VK_F4: u16 = 0x73;

/// F5 key
pub const VK_F5: u16 = 0x74;

/// F6 key
pub const VK_F6: u16 = 0x75;

/// F7 key
pub const VK_F7: u16 = 0x76;

/// F8 key
pub const VK_F8: u16 = 0x77;

/// F9 key
pub const VK_F9: u16 = 0x78;

/// F10 key
pub const VK_F10: u16 = 0x79;

/// F11 key
pub const VK_F11: u16 = 0x7A;

/// F12 key
pub const VK_F12: u16 = 0x7B;

// ============================================================================
// Modifier Keys
// ============================================================================

/// Shift key
pub const VK_SHIFT: u16 = 0x10;

/// Control key
pub const VK_CONTROL: u16 = 0x11;

/// Alt key
pub const VK_MENU: u16 = 0x12;

bitflags! {
    /// Modifier state reported with each key record (`dwControlKeyState`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlKeyState: u32 {
        const RIGHT_ALT = 0x0001;
        const LEFT_ALT = 0x0002;
        const RIGHT_CTRL = 0x0004;
        const LEFT_CTRL = 0x0008;
        const SHIFT = 0x0010;
        const NUM_LOCK = 0x0020;
        const SCROLL_LOCK = 0x0040;
        const CAPS_LOCK = 0x0080;
        const ENHANCED_KEY = 0x0100;
    }
}

impl ControlKeyState {
    /// Either Ctrl key held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.intersects(Self::LEFT_CTRL.union(Self::RIGHT_CTRL))
    }

    /// Either Alt key held
    #[inline]
    pub const fn alt(self) -> bool {
        self.intersects(Self::LEFT_ALT.union(Self::RIGHT_ALT))
    }

    /// Shift held
    #[inline]
    pub const fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if virtual-key code is a modifier key
#[inline]
pub const fn is_modifier_key(vk: u16) -> bool {
    matches!(vk, VK_SHIFT | VK_CONTROL | VK_MENU)
}

/// Convert function key code to function key number (1-12)
/// Returns None if not a function key
#[inline]
pub const fn function_key_number(vk: u16) -> Option<u8> {
    if vk >= VK_F1 && vk <= VK_F12 {
        Some((vk - VK_F1) as u8 + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_key_number() {
        assert_eq!(function_key_number(VK_F1), Some(1));
        assert_eq!(function_key_number(VK_F12), Some(12));
        assert_eq!(function_key_number(VK_F12 + 1), None);
        assert_eq!(function_key_number(VK_DELETE), None);
    }

    #[test]
    fn test_control_key_state() {
        assert!(ControlKeyState::LEFT_CTRL.ctrl());
        assert!(ControlKeyState::RIGHT_CTRL.ctrl());
        assert!(!ControlKeyState::SHIFT.ctrl());
        assert!(ControlKeyState::RIGHT_ALT.alt());
        assert!((ControlKeyState::SHIFT | ControlKeyState::LEFT_ALT).shift());
        assert_eq!(ControlKeyState::from_bits_retain(0x0C).bits(), 0x0C);
    }
}
