//! Scripted console for tests
//!
//! Steps are fed through a channel so a test can drive the pump one
//! record at a time. Once the script is exhausted the console blocks
//! until its interrupt is raised, like a real idle console.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{select, unbounded, Receiver, Sender};

use super::{ConsoleInput, Interrupt};
use crate::input::{InputRecord, KeyRecord};

/// One scripted console result
#[derive(Debug)]
pub enum Step {
    Record(InputRecord),
    WaitError(io::ErrorKind),
    ReadError(io::ErrorKind),
}

/// Observations shared between a test and the handles it scripted
#[derive(Debug, Default)]
pub struct Observed {
    pub raised: AtomicUsize,
    pub console_released: AtomicBool,
    pub interrupt_released: AtomicBool,
}

/// Test-side handle that feeds the console
pub struct Script {
    steps: Sender<Step>,
    pub observed: Arc<Observed>,
}

pub struct MockConsole {
    steps: Receiver<Step>,
    wake: Receiver<()>,
    pending: Option<Step>,
    observed: Arc<Observed>,
}

pub struct MockInterrupt {
    wake: Sender<()>,
    observed: Arc<Observed>,
}

/// Create a console/interrupt pair and the script that drives them
pub fn scripted() -> (Script, MockConsole, MockInterrupt) {
    let (steps_tx, steps_rx) = unbounded();
    let (wake_tx, wake_rx) = unbounded();
    let observed = Arc::new(Observed::default());
    (
        Script {
            steps: steps_tx,
            observed: Arc::clone(&observed),
        },
        MockConsole {
            steps: steps_rx,
            wake: wake_rx,
            pending: None,
            observed: Arc::clone(&observed),
        },
        MockInterrupt { wake: wake_tx, observed },
    )
}

impl Script {
    pub fn push(&self, step: Step) {
        let _ = self.steps.send(step);
    }

    pub fn key(&self, record: KeyRecord) {
        self.push(Step::Record(InputRecord::Key(record)));
    }
}

impl ConsoleInput for MockConsole {
    type Interrupt = MockInterrupt;

    fn wait(&mut self) -> io::Result<()> {
        if self.pending.is_some() {
            return Ok(());
        }
        select! {
            recv(self.steps) -> step => match step {
                Ok(Step::WaitError(kind)) => return Err(kind.into()),
                Ok(step) => self.pending = Some(step),
                // Script finished: idle until woken
                Err(_) => {
                    let _ = self.wake.recv();
                }
            },
            recv(self.wake) -> _ => {}
        }
        Ok(())
    }

    fn read_record(&mut self) -> io::Result<InputRecord> {
        // Without a readied step, block like a console read would
        let step = match self.pending.take() {
            Some(step) => step,
            None => self
                .steps
                .recv()
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?,
        };
        match step {
            Step::Record(record) => Ok(record),
            Step::ReadError(kind) | Step::WaitError(kind) => Err(kind.into()),
        }
    }
}

impl Drop for MockConsole {
    fn drop(&mut self) {
        self.observed.console_released.store(true, Ordering::SeqCst);
    }
}

impl Interrupt for MockInterrupt {
    fn raise(&self) -> io::Result<()> {
        self.observed.raised.fetch_add(1, Ordering::SeqCst);
        let _ = self.wake.send(());
        Ok(())
    }
}

impl Drop for MockInterrupt {
    fn drop(&mut self) {
        self.observed.interrupt_released.store(true, Ordering::SeqCst);
    }
}
