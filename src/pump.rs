//! Input pump
//!
//! Background thread that owns the console: wait for input, check for
//! cancellation, read one record, translate it and deliver the result.
//! Shutdown is two-phase: raise the cancel flag, then fire the console
//! interrupt so the blocked wait returns and observes the flag.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use log::{debug, info, trace, warn};

use crate::config::PumpConfig;
use crate::console::{ConsoleInput, Interrupt};
use crate::error::{Error, Result};
use crate::input::keycodes::is_modifier_key;
use crate::input::record::event_type_name;
use crate::input::{translate, InputRecord, KeyEvent, KeyRecord};

/// Pump thread name
const THREAD_NAME: &str = "conkey-pump";

/// Lifecycle of a pump thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PumpState {
    /// Waiting for and delivering input
    Running = 0,
    /// Cancellation requested, waiting for the thread to exit
    Stopping = 1,
    /// Thread has exited
    Stopped = 2,
}

impl PumpState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PumpState::Running,
            1 => PumpState::Stopping,
            _ => PumpState::Stopped,
        }
    }
}

/// Handle to a running pump thread
pub struct Pump<I: Interrupt> {
    /// Cancellation request, checked after every wait
    cancel: Arc<AtomicBool>,
    /// Current `PumpState`
    state: Arc<AtomicU8>,
    /// Wakes the pump's blocked wait
    interrupt: I,
    /// None once joined
    thread: Option<JoinHandle<()>>,
}

impl<I: Interrupt> Pump<I> {
    /// Spawn the pump thread over an opened console
    ///
    /// On failure the console and interrupt are dropped, releasing both.
    pub fn start<C>(
        console: C,
        interrupt: I,
        events: Sender<Result<KeyEvent>>,
        config: &PumpConfig,
    ) -> Result<Self>
    where
        C: ConsoleInput<Interrupt = I>,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let state = Arc::new(AtomicU8::new(PumpState::Running as u8));
        let error_limit = config.error_limit();

        let thread = {
            let cancel = Arc::clone(&cancel);
            let state = Arc::clone(&state);
            std::thread::Builder::new()
                .name(THREAD_NAME.into())
                .spawn(move || {
                    run(console, &events, &cancel, error_limit);
                    state.store(PumpState::Stopped as u8, Ordering::Release);
                })
                .map_err(Error::Spawn)?
        };

        debug!("Input pump started (error limit: {:?})", error_limit);

        Ok(Self {
            cancel,
            state,
            interrupt,
            thread: Some(thread),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> PumpState {
        PumpState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Request shutdown and wait until the thread has exited
    ///
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        if self.state() == PumpState::Running {
            self.state.store(PumpState::Stopping as u8, Ordering::Release);
        }
        self.cancel.store(true, Ordering::Release);
        if let Err(e) = self.interrupt.raise() {
            warn!("Failed to raise console interrupt: {}", e);
        }

        if thread.join().is_err() {
            warn!("Input pump thread panicked");
        }
        self.state.store(PumpState::Stopped as u8, Ordering::Release);
        debug!("Input pump stopped");
    }
}

impl<I: Interrupt> Drop for Pump<I> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Counts consecutive wait/read failures against an optional limit
struct FailureCount {
    current: u32,
    limit: Option<u32>,
}

impl FailureCount {
    /// Record a failure; true if the limit has been reached
    fn fail(&mut self) -> bool {
        self.current = self.current.saturating_add(1);
        self.limit.map_or(false, |limit| self.current >= limit)
    }

    fn reset(&mut self) {
        self.current = 0;
    }
}

/// Pump loop; returns when cancelled, the receiver is gone or the
/// failure limit is hit
fn run<C: ConsoleInput>(
    mut console: C,
    events: &Sender<Result<KeyEvent>>,
    cancel: &AtomicBool,
    error_limit: Option<u32>,
) {
    let mut failures = FailureCount {
        current: 0,
        limit: error_limit,
    };
    let mut surrogates = SurrogatePair::default();

    loop {
        if let Err(e) = console.wait() {
            warn!("Console wait failed: {}", e);
            if !report(events, Error::Wait(e), &mut failures) {
                return;
            }
        }

        if cancel.load(Ordering::Acquire) {
            info!("Input pump cancelled");
            return;
        }

        let record = match console.read_record() {
            Ok(record) => {
                failures.reset();
                record
            }
            Err(e) => {
                warn!("Console read failed: {}", e);
                if !report(events, Error::Read(e), &mut failures) {
                    return;
                }
                continue;
            }
        };

        let record = match record {
            InputRecord::Key(record) => record,
            InputRecord::Other(kind) => {
                trace!("Ignoring {} record ({:#06x})", event_type_name(kind), kind);
                continue;
            }
        };

        let event = match surrogates.feed(&record) {
            Utf16::Unit => translate(&record),
            Utf16::Pending => None,
            Utf16::Pair(rune) => Some(KeyEvent::rune(rune)),
        };
        let Some(event) = event else {
            if record.key_down && !is_modifier_key(record.virtual_key_code) {
                trace!("Untranslated key record: {:?}", record);
            }
            continue;
        };

        trace!("Key event {} x{}", event, record.repeat_count);
        for _ in 0..record.repeat_count {
            if events.send(Ok(event)).is_err() {
                debug!("Key receiver dropped, input pump exiting");
                return;
            }
        }
    }
}

/// Deliver a pump failure; false if the pump must exit
fn report(events: &Sender<Result<KeyEvent>>, error: Error, failures: &mut FailureCount) -> bool {
    if events.send(Err(error)).is_err() {
        return false;
    }
    if failures.fail() {
        warn!("Input pump giving up after {} consecutive failures", failures.current);
        let _ = events.send(Err(Error::TooManyErrors(failures.current)));
        return false;
    }
    true
}

/// Outcome of feeding one key record to `SurrogatePair`
#[derive(Debug, PartialEq, Eq)]
enum Utf16 {
    /// Not part of a surrogate pair, translate as usual
    Unit,
    /// High surrogate held until its partner arrives (or orphaned low dropped)
    Pending,
    /// Completed supplementary-plane character
    Pair(char),
}

/// Joins characters outside the BMP that the console splits over two
/// key-down records
#[derive(Debug, Default)]
struct SurrogatePair {
    high: Option<u16>,
}

impl SurrogatePair {
    fn feed(&mut self, record: &KeyRecord) -> Utf16 {
        if !record.key_down {
            return Utf16::Unit;
        }
        let unit = record.unicode_char;
        if (0xD800..=0xDBFF).contains(&unit) {
            self.high = Some(unit);
            return Utf16::Pending;
        }
        if (0xDC00..=0xDFFF).contains(&unit) {
            return match self.high.take() {
                Some(high) => match char::decode_utf16([high, unit]).next() {
                    Some(Ok(rune)) => Utf16::Pair(rune),
                    _ => Utf16::Pending,
                },
                None => Utf16::Pending,
            };
        }
        self.high = None;
        Utf16::Unit
    }
}
