//! Error types

use std::io;
use std::path::PathBuf;

/// Keyboard capture errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Interrupt primitive could not be created
    #[error("failed to create interrupt handle: {0}")]
    Interrupt(#[source] io::Error),

    /// Console input handle could not be opened
    #[error("failed to open console input {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Console mode could not be set
    #[error("failed to configure console input: {0}")]
    Configure(#[source] io::Error),

    /// Input pump thread could not be started
    #[error("failed to start input pump: {0}")]
    Spawn(#[source] io::Error),

    /// Waiting for console input failed
    #[error("wait for console input failed: {0}")]
    Wait(#[source] io::Error),

    /// Reading a console input record failed
    #[error("console input read failed: {0}")]
    Read(#[source] io::Error),

    /// Input pump gave up after repeated failures
    #[error("input pump stopped after {0} consecutive failures")]
    TooManyErrors(u32),

    /// Input pump exited while a key was awaited
    #[error("input pump is not running")]
    Disconnected,

    /// Configuration file could not be read or parsed
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
