//! Unix terminal input
//!
//! Put the controlling TTY in raw mode and read it non-blocking.
//! The terminal delivers bytes, not key records, so every read is run
//! through the VT decoder and the resulting records are queued. A
//! sequence cut off by the end of a read is held by the decoder; if
//! nothing follows within `ESCAPE_TIMEOUT_MS` it is released as typed.
//! A socketpair acts as the interrupt: writing one byte to it makes
//! the poll in `wait` return.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::raw::c_int;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use log::{debug, info, trace, warn};
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::termios::{self, Termios};

use super::{ConsoleInput, Interrupt};
use crate::config::ConsoleConfig;
use crate::error::{Error, Result};
use crate::input::{vt, InputRecord, KeyRecord};

/// Largest chunk read from the TTY at once
const READ_CHUNK: usize = 256;

/// Event tag returned when a wakeup produced no key record
const NO_RECORD: u16 = 0;

/// How long a held partial sequence may wait for the rest (tmux default)
const ESCAPE_TIMEOUT_MS: c_int = 50;

/// Raw-mode terminal input
pub struct UnixConsole {
    /// Opened TTY
    tty: File,
    /// Original termios settings (for restoration)
    orig_termios: Termios,
    /// Read end of the interrupt socketpair
    wake: UnixStream,
    /// Stateful VT decoder (holds sequences split across reads)
    decoder: vt::Decoder,
    /// Records decoded but not yet handed out
    pending: VecDeque<KeyRecord>,
}

/// Write end of the interrupt socketpair
pub struct UnixInterrupt {
    wake: UnixStream,
}

impl UnixConsole {
    /// Create the interrupt, then open the TTY in raw non-blocking mode
    pub fn open(config: &ConsoleConfig) -> Result<(Self, UnixInterrupt)> {
        let (wake, raise) = UnixStream::pair().map_err(Error::Interrupt)?;
        wake.set_nonblocking(true).map_err(Error::Interrupt)?;
        raise.set_nonblocking(true).map_err(Error::Interrupt)?;

        let path = PathBuf::from(&config.path);
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| Error::Open { path, source })?;

        // Save original settings
        let orig_termios = termios::tcgetattr(&tty).map_err(|e| Error::Configure(e.into()))?;

        // Set to raw mode
        let mut raw = orig_termios.clone();
        termios::cfmakeraw(&mut raw);
        // TCSANOW: keys typed before open stay in the input queue
        termios::tcsetattr(&tty, termios::SetArg::TCSANOW, &raw)
            .map_err(|e| Error::Configure(e.into()))?;

        let console = Self {
            tty,
            orig_termios,
            wake,
            decoder: vt::Decoder::new(),
            pending: VecDeque::new(),
        };

        // From here on Drop restores the terminal if anything fails
        set_nonblocking(console.tty.as_raw_fd()).map_err(Error::Configure)?;

        info!("Console input opened: {} (raw mode)", config.path);

        Ok((console, UnixInterrupt { wake: raise }))
    }

    /// Discard queued interrupt bytes
    fn drain_wake(&mut self) {
        let mut buf = [0u8; 16];
        loop {
            match self.wake.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed to drain interrupt socket: {}", e);
                    break;
                }
            }
        }
    }
}

impl ConsoleInput for UnixConsole {
    type Interrupt = UnixInterrupt;

    fn wait(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            return Ok(());
        }

        // Short timeout while the decoder holds a partial sequence
        let timeout = if self.decoder.has_pending() {
            ESCAPE_TIMEOUT_MS
        } else {
            -1
        };

        let woken = loop {
            let mut fds = [
                PollFd::new(&self.tty, PollFlags::POLLIN),
                PollFd::new(&self.wake, PollFlags::POLLIN),
            ];
            match poll(&mut fds, timeout) {
                Ok(0) => {
                    let records = self.decoder.flush();
                    trace!("Escape timeout, released {} held records", records.len());
                    self.pending.extend(records);
                    break false;
                }
                Ok(_) => {
                    let ready = |fd: &PollFd| {
                        fd.revents()
                            .map_or(false, |r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP))
                    };
                    break ready(&fds[1]);
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if woken {
            trace!("Console wait interrupted");
            self.drain_wake();
        }
        Ok(())
    }

    fn read_record(&mut self) -> io::Result<InputRecord> {
        if let Some(record) = self.pending.pop_front() {
            return Ok(InputRecord::Key(record));
        }

        let mut buf = [0u8; READ_CHUNK];
        let n = match nix::unistd::read(self.tty.as_raw_fd(), &mut buf) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => n,
            // Spurious readiness or an interrupt-only wakeup
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => return Ok(InputRecord::Other(NO_RECORD)),
            Err(e) => return Err(e.into()),
        };

        trace!("Console read {} bytes: {:02x?}", n, &buf[..n]);
        let records = self.decoder.feed(&buf[..n]);
        self.pending.extend(records);

        Ok(match self.pending.pop_front() {
            Some(record) => InputRecord::Key(record),
            None => InputRecord::Other(NO_RECORD),
        })
    }
}

impl Drop for UnixConsole {
    fn drop(&mut self) {
        // Restore original termios settings
        let _ = termios::tcsetattr(&self.tty, termios::SetArg::TCSAFLUSH, &self.orig_termios);
        if !self.pending.is_empty() {
            debug!("Discarding {} undelivered key records", self.pending.len());
        }
        info!("Console input settings restored");
    }
}

impl Interrupt for UnixInterrupt {
    fn raise(&self) -> io::Result<()> {
        match (&self.wake).write(&[1]) {
            Ok(_) => Ok(()),
            // Socket buffer full: a wakeup is already queued
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)?;
    let mut flags = OFlag::from_bits_truncate(flags);
    flags.insert(OFlag::O_NONBLOCK);
    fcntl(fd, FcntlArg::F_SETFL(flags))?;
    Ok(())
}
