//! Windows console input
//!
//! Read key records straight from CONIN$. The console and an
//! auto-reset event are waited on together, so setting the event
//! releases a blocked `wait` without touching the console.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::c_void;
use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;

use log::{info, trace};

use super::{ConsoleInput, Interrupt};
use crate::config::ConsoleConfig;
use crate::error::{Error, Result};
use crate::input::{ControlKeyState, InputRecord, KeyRecord};
use crate::input::record::KEY_EVENT;

type HANDLE = *mut c_void;

const GENERIC_READ: u32 = 0x8000_0000;
const GENERIC_WRITE: u32 = 0x4000_0000;
const FILE_SHARE_READ: u32 = 0x0000_0001;
const FILE_SHARE_WRITE: u32 = 0x0000_0002;
const OPEN_EXISTING: u32 = 3;
const INVALID_HANDLE_VALUE: HANDLE = -1isize as HANDLE;

const INFINITE: u32 = 0xFFFF_FFFF;
const WAIT_OBJECT_0: u32 = 0x0000_0000;
const WAIT_FAILED: u32 = 0xFFFF_FFFF;

#[repr(C)]
#[derive(Copy, Clone, Default)]
struct KEY_EVENT_RECORD {
    key_down: i32,
    repeat_count: u16,
    virtual_key_code: u16,
    virtual_scan_code: u16,
    u_char: u16,
    control_key_state: u32,
}

/// Only the key variant is ever interpreted; it is also the largest
/// member of the native union, so the layout matches.
#[repr(C)]
#[derive(Copy, Clone, Default)]
struct INPUT_RECORD {
    event_type: u16,
    _pad: u16,
    event: KEY_EVENT_RECORD,
}

#[link(name = "kernel32")]
extern "system" {
    fn CreateEventW(attrs: *mut c_void, manual_reset: i32, initial_state: i32, name: *const u16) -> HANDLE;
    fn SetEvent(h: HANDLE) -> i32;
    fn CreateFileW(
        name: *const u16,
        access: u32,
        share_mode: u32,
        attrs: *mut c_void,
        disposition: u32,
        flags: u32,
        template: HANDLE,
    ) -> HANDLE;
    fn WaitForMultipleObjects(count: u32, handles: *const HANDLE, wait_all: i32, ms: u32) -> u32;
    fn ReadConsoleInputW(h: HANDLE, buf: *mut INPUT_RECORD, len: u32, read: *mut u32) -> i32;
}

/// CONIN$ reader
pub struct WindowsConsole {
    conin: OwnedHandle,
    event: Arc<OwnedHandle>,
}

/// Auto-reset event shared with the console wait
pub struct WindowsInterrupt {
    event: Arc<OwnedHandle>,
}

impl WindowsConsole {
    /// Create the interrupt event, then open the console input handle
    pub fn open(config: &ConsoleConfig) -> Result<(Self, WindowsInterrupt)> {
        // Auto-reset, initially non-signaled
        let raw = unsafe { CreateEventW(ptr::null_mut(), 0, 0, ptr::null()) };
        if raw.is_null() {
            return Err(Error::Interrupt(io::Error::last_os_error()));
        }
        let event = Arc::new(unsafe { OwnedHandle::from_raw_handle(raw) });

        let path = PathBuf::from(&config.path);
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(iter::once(0)).collect();
        let raw = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null_mut(),
                OPEN_EXISTING,
                0,
                ptr::null_mut(),
            )
        };
        if raw == INVALID_HANDLE_VALUE {
            // `event` is closed on return
            return Err(Error::Open {
                path,
                source: io::Error::last_os_error(),
            });
        }
        let conin = unsafe { OwnedHandle::from_raw_handle(raw) };

        info!("Console input opened: {}", config.path);

        Ok((
            Self {
                conin,
                event: Arc::clone(&event),
            },
            WindowsInterrupt { event },
        ))
    }
}

impl ConsoleInput for WindowsConsole {
    type Interrupt = WindowsInterrupt;

    fn wait(&mut self) -> io::Result<()> {
        let handles = [self.conin.as_raw_handle(), self.event.as_raw_handle()];
        let ret = unsafe { WaitForMultipleObjects(handles.len() as u32, handles.as_ptr(), 0, INFINITE) };
        match ret {
            WAIT_FAILED => Err(io::Error::last_os_error()),
            r if r == WAIT_OBJECT_0 + 1 => {
                trace!("Console wait interrupted");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn read_record(&mut self) -> io::Result<InputRecord> {
        let mut record = INPUT_RECORD::default();
        let mut read = 0u32;
        let ok = unsafe { ReadConsoleInputW(self.conin.as_raw_handle(), &mut record, 1, &mut read) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        if read == 0 || record.event_type != KEY_EVENT {
            return Ok(InputRecord::Other(record.event_type));
        }

        let key = record.event;
        Ok(InputRecord::Key(KeyRecord {
            key_down: key.key_down != 0,
            repeat_count: key.repeat_count,
            virtual_key_code: key.virtual_key_code,
            virtual_scan_code: key.virtual_scan_code,
            unicode_char: key.u_char,
            control_key_state: ControlKeyState::from_bits_retain(key.control_key_state),
        }))
    }
}

impl Drop for WindowsConsole {
    fn drop(&mut self) {
        info!("Console input closed");
    }
}

impl Interrupt for WindowsInterrupt {
    fn raise(&self) -> io::Result<()> {
        if unsafe { SetEvent(self.event.as_raw_handle()) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_record_layout() {
        assert_eq!(std::mem::size_of::<KEY_EVENT_RECORD>(), 16);
        assert_eq!(std::mem::size_of::<INPUT_RECORD>(), 20);
        assert_eq!(std::mem::align_of::<INPUT_RECORD>(), 4);
    }

    #[test]
    fn test_open_missing_device() {
        let config = ConsoleConfig {
            path: "\\\\.\\nonexistent-console".to_string(),
        };
        assert!(matches!(WindowsConsole::open(&config), Err(Error::Open { .. })));
    }
}
