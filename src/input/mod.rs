//! Input translation
//!
//! Turn raw console key records into normalized key events.
//! - Console virtual-key codes and modifier bits (keycodes)
//! - Raw records as the console reports them (record)
//! - Record to key/rune classification (translate)
//! - Terminal byte streams to records (vt)

pub mod keycodes;
pub mod keys;
pub mod record;
pub mod translate;
pub mod vt;

pub use keycodes::ControlKeyState;
pub use keys::{Key, KeyEvent};
pub use record::{InputRecord, KeyRecord};
pub use translate::translate;
pub use vt::decode;
