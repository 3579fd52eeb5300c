//! Keyboard capture session
//!
//! `Keyboard` owns at most one open session: a console, its interrupt
//! and the pump thread feeding the key channel. Open and close are
//! idempotent, and close does not return until the pump has exited.
//!
//! Session management is single-threaded: `open`/`close` take
//! `&mut self`. Other threads may only wake a blocked `get_key` through
//! an `Interrupter`.

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use log::{debug, info};

use crate::config::{Config, ConsoleConfig};
use crate::console::{ConsoleInput, Interrupt, PlatformConsole};
use crate::error::{Error, Result};
use crate::input::KeyEvent;
use crate::pump::{Pump, PumpState};

/// Opens a console and its interrupt for a new session
type Opener<C> =
    Box<dyn FnMut(&ConsoleConfig) -> Result<(C, <C as ConsoleInput>::Interrupt)> + Send>;

/// Resources of one open session
struct Session<I: Interrupt> {
    pump: Pump<I>,
    events: Receiver<Result<KeyEvent>>,
}

/// Console keyboard capture
pub struct Keyboard<C: ConsoleInput = PlatformConsole> {
    config: Config,
    opener: Opener<C>,
    session: Option<Session<C::Interrupt>>,
    /// Rendezvous channel: a send only succeeds while `get_key` waits
    interrupt_tx: Sender<()>,
    interrupt_rx: Receiver<()>,
}

/// Wakes a `Keyboard::get_key` blocked on another thread
#[derive(Debug, Clone)]
pub struct Interrupter {
    tx: Sender<()>,
}

impl Interrupter {
    /// Wake the caller blocked in `get_key`, which then returns `Ok(None)`
    ///
    /// Returns false if nobody was waiting; the notification is not kept.
    pub fn interrupt(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

impl Keyboard<PlatformConsole> {
    /// Keyboard on the platform console with default settings
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Keyboard on the platform console
    pub fn with_config(config: Config) -> Self {
        Self::with_opener(config, PlatformConsole::open)
    }
}

impl Default for Keyboard<PlatformConsole> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ConsoleInput> Keyboard<C> {
    /// Keyboard over a custom console source
    pub fn with_opener<F>(config: Config, opener: F) -> Self
    where
        F: FnMut(&ConsoleConfig) -> Result<(C, C::Interrupt)> + Send + 'static,
    {
        let (interrupt_tx, interrupt_rx) = bounded(0);
        Self {
            config,
            opener: Box::new(opener),
            session: None,
            interrupt_tx,
            interrupt_rx,
        }
    }

    /// Settings used for new sessions
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a session is open
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// State of the current session's pump, None if closed
    pub fn pump_state(&self) -> Option<PumpState> {
        self.session.as_ref().map(|s| s.pump.state())
    }

    /// Handle for waking `get_key` from another thread
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            tx: self.interrupt_tx.clone(),
        }
    }

    /// Open the console and start capturing keys
    ///
    /// No-op if already open. On failure everything acquired so far is
    /// released and the keyboard stays closed.
    pub fn open(&mut self) -> Result<()> {
        if self.session.is_some() {
            debug!("Keyboard already open");
            return Ok(());
        }

        let (console, interrupt) = (self.opener)(&self.config.console)?;
        let (tx, rx) = unbounded();
        let pump = Pump::start(console, interrupt, tx, &self.config.pump)?;

        self.session = Some(Session { pump, events: rx });
        info!("Keyboard opened");
        Ok(())
    }

    /// Stop capturing and release the console
    ///
    /// Blocks until the pump has exited. No-op if already closed.
    pub fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.pump.stop();
        let undelivered = session.events.len();
        if undelivered > 0 {
            debug!("Dropping {} undelivered key events", undelivered);
        }
        info!("Keyboard closed");
    }

    /// Block until a key arrives
    ///
    /// Returns `Ok(None)` if woken by an `Interrupter`, and the pump's
    /// error if it reported a failure instead of a key.
    ///
    /// # Panics
    ///
    /// Panics if the keyboard is not open.
    pub fn get_key(&self) -> Result<Option<KeyEvent>> {
        let Some(session) = &self.session else {
            panic!("Keyboard::get_key called without an open session");
        };

        select! {
            recv(session.events) -> msg => match msg {
                Ok(Ok(event)) => Ok(Some(event)),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(Error::Disconnected),
            },
            recv(self.interrupt_rx) -> _ => {
                debug!("get_key interrupted");
                Ok(None)
            }
        }
    }

    /// Open, read one key, close
    ///
    /// The keyboard is closed afterwards even if the read failed; if it
    /// was already open it is closed as well.
    pub fn get_single_key(&mut self) -> Result<Option<KeyEvent>> {
        self.open()?;
        let result = self.get_key();
        self.close();
        result
    }
}

impl<C: ConsoleInput> Drop for Keyboard<C> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read one key from the platform console with default settings
pub fn get_single_key() -> Result<Option<KeyEvent>> {
    Keyboard::new().get_single_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PumpConfig;
    use crate::console::mock::{scripted, MockConsole, Observed, Script, Step};
    use crate::input::keycodes::{VK_A, VK_DOWN};
    use crate::input::{ControlKeyState, Key, KeyRecord};
    use std::io;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    /// Keyboard whose sessions are scripted; returns each session's script
    fn mock_keyboard(config: Config) -> (Keyboard<MockConsole>, Receiver<Script>) {
        let (scripts_tx, scripts_rx) = unbounded();
        let keyboard = Keyboard::with_opener(config, move |_| {
            let (script, console, interrupt) = scripted();
            let _ = scripts_tx.send(script);
            Ok((console, interrupt))
        });
        (keyboard, scripts_rx)
    }

    fn press_a() -> KeyRecord {
        KeyRecord::press(VK_A, 'a' as u16, ControlKeyState::empty())
    }

    #[test]
    fn test_open_close() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        assert!(!keyboard.is_open());
        assert_eq!(keyboard.pump_state(), None);

        keyboard.open().unwrap();
        assert!(keyboard.is_open());
        assert_eq!(keyboard.pump_state(), Some(PumpState::Running));
        let observed: Arc<Observed> = Arc::clone(&scripts.try_recv().unwrap().observed);

        keyboard.close();
        assert!(!keyboard.is_open());
        assert_eq!(observed.raised.load(Ordering::SeqCst), 1);
        assert!(observed.console_released.load(Ordering::SeqCst));
        assert!(observed.interrupt_released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_double_close_is_noop() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        let observed = Arc::clone(&scripts.try_recv().unwrap().observed);

        keyboard.close();
        keyboard.close();
        assert!(!keyboard.is_open());
        assert_eq!(observed.raised.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_without_open() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.close();
        assert!(!keyboard.is_open());
        assert!(scripts.try_recv().is_err());
    }

    #[test]
    fn test_double_open_starts_one_pump() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        keyboard.open().unwrap();
        assert_eq!(scripts.len(), 1);

        let script = scripts.try_recv().unwrap();
        script.key(press_a());
        assert_eq!(keyboard.get_key().unwrap(), Some(KeyEvent::rune('a')));
    }

    #[test]
    fn test_reopen_after_close() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        keyboard.close();
        keyboard.open().unwrap();
        assert_eq!(scripts.len(), 2);

        let _first = scripts.try_recv().unwrap();
        let second = scripts.try_recv().unwrap();
        second.key(KeyRecord::press(VK_DOWN, 0, ControlKeyState::empty()));
        assert_eq!(keyboard.get_key().unwrap(), Some(KeyEvent::key(Key::ArrowDown)));
    }

    #[test]
    fn test_open_failure_leaves_closed() {
        let attempts = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&attempts);
        let mut keyboard: Keyboard<MockConsole> =
            Keyboard::with_opener(Config::default(), move |config| {
                *counter.lock().unwrap() += 1;
                Err(Error::Open {
                    path: config.path.clone().into(),
                    source: io::ErrorKind::NotFound.into(),
                })
            });

        assert!(matches!(keyboard.open(), Err(Error::Open { .. })));
        assert!(!keyboard.is_open());
        assert!(keyboard.open().is_err());
        assert_eq!(*attempts.lock().unwrap(), 2);
    }

    #[test]
    fn test_repeat_count_delivered_individually() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        let script = scripts.try_recv().unwrap();

        script.key(press_a().repeated(4));
        for _ in 0..4 {
            assert_eq!(keyboard.get_key().unwrap(), Some(KeyEvent::rune('a')));
        }
    }

    #[test]
    fn test_get_key_returns_pump_error() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        let script = scripts.try_recv().unwrap();

        script.push(Step::ReadError(io::ErrorKind::Other));
        assert!(matches!(keyboard.get_key(), Err(Error::Read(_))));
        assert!(keyboard.is_open());
    }

    #[test]
    fn test_get_key_after_pump_gave_up() {
        let config = Config {
            pump: PumpConfig {
                max_consecutive_errors: 1,
            },
            ..Config::default()
        };
        let (mut keyboard, scripts) = mock_keyboard(config);
        keyboard.open().unwrap();
        let script = scripts.try_recv().unwrap();

        script.push(Step::ReadError(io::ErrorKind::Other));
        assert!(matches!(keyboard.get_key(), Err(Error::Read(_))));
        assert!(matches!(keyboard.get_key(), Err(Error::TooManyErrors(1))));
        assert!(matches!(keyboard.get_key(), Err(Error::Disconnected)));
        keyboard.close();
    }

    #[test]
    fn test_interrupter_wakes_get_key() {
        let (mut keyboard, _scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        let interrupter = keyboard.interrupter();

        // Nobody waiting yet
        assert!(!interrupter.interrupt());

        let waker = thread::spawn(move || {
            while !interrupter.interrupt() {
                thread::sleep(Duration::from_millis(5));
            }
        });
        assert_eq!(keyboard.get_key().unwrap(), None);
        waker.join().unwrap();
        assert!(keyboard.is_open());
    }

    #[test]
    fn test_get_single_key_closes() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        let feeder = thread::spawn(move || {
            let script = scripts.recv().unwrap();
            script.key(press_a());
            script
        });

        assert_eq!(keyboard.get_single_key().unwrap(), Some(KeyEvent::rune('a')));
        assert!(!keyboard.is_open());
        let script = feeder.join().unwrap();
        assert!(script.observed.console_released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_get_single_key_closes_on_error() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        let feeder = thread::spawn(move || {
            let script = scripts.recv().unwrap();
            script.push(Step::WaitError(io::ErrorKind::Other));
        });

        assert!(matches!(keyboard.get_single_key(), Err(Error::Wait(_))));
        assert!(!keyboard.is_open());
        feeder.join().unwrap();
    }

    #[test]
    fn test_drop_closes_session() {
        let (mut keyboard, scripts) = mock_keyboard(Config::default());
        keyboard.open().unwrap();
        let observed = Arc::clone(&scripts.try_recv().unwrap().observed);

        drop(keyboard);
        assert!(observed.console_released.load(Ordering::SeqCst));
        assert!(observed.interrupt_released.load(Ordering::SeqCst));
    }

    #[test]
    #[should_panic(expected = "without an open session")]
    fn test_get_key_before_open_panics() {
        let (keyboard, _scripts) = mock_keyboard(Config::default());
        let _ = keyboard.get_key();
    }
}
