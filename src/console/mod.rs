//! Console input backends
//!
//! The input pump only needs two blocking operations from the OS:
//! wait until input is ready (or the interrupt fires), and read one
//! record. Each backend also hands out an `Interrupt` that forces a
//! pending wait to return.
//! - Unix: TTY in raw mode, poll(2) over the TTY and a socketpair
//! - Windows: CONIN$ via WaitForMultipleObjects / ReadConsoleInputW

use std::io;

use crate::input::InputRecord;

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(unix)]
pub use unix::{UnixConsole as PlatformConsole, UnixInterrupt as PlatformInterrupt};
#[cfg(windows)]
pub use windows::{WindowsConsole as PlatformConsole, WindowsInterrupt as PlatformInterrupt};

/// Wake source for a blocked `ConsoleInput::wait`
pub trait Interrupt: Send + 'static {
    /// Force the pending (or next) wait to return
    fn raise(&self) -> io::Result<()>;
}

/// Blocking console input source, owned by the input pump
pub trait ConsoleInput: Send + 'static {
    /// Interrupt paired with this console
    type Interrupt: Interrupt;

    /// Block until input is ready or the interrupt is raised
    fn wait(&mut self) -> io::Result<()>;

    /// Read exactly one input record
    fn read_record(&mut self) -> io::Result<InputRecord>;
}
