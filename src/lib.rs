//! conkey - keyboard capture for console applications
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Console (CONIN$ / raw TTY + VT decode)  │
//! │                    ↓ KeyRecord           │
//! │  Input pump thread → translate           │
//! │                    ↓ channel             │
//! │  Keyboard::get_key (caller thread)       │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ```no_run
//! let mut keyboard = conkey::Keyboard::new();
//! keyboard.open()?;
//! if let Some(event) = keyboard.get_key()? {
//!     println!("{event}");
//! }
//! keyboard.close();
//! # Ok::<(), conkey::Error>(())
//! ```

#[cfg(not(any(unix, windows)))]
compile_error!("conkey supports Unix terminals and the Windows console only");

pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod pump;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use input::{decode, translate, ControlKeyState, Key, KeyEvent, KeyRecord};
pub use pump::PumpState;
pub use session::{get_single_key, Interrupter, Keyboard};
