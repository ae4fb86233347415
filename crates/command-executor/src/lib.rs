//! Runtime-agnostic command execution library
//!
//! This crate launches local child processes with a closed standard input and
//! their standard output and standard error merged into a single byte stream.
//! Callers get back an event stream to drain and a handle to wait on or signal
//! the process.

#![warn(missing_docs)]

pub mod backends;
pub mod command;
pub mod error;
pub mod event;
pub mod launcher;
pub mod process;

pub use backends::{LocalLauncher, LocalProcessHandle, MergedOutputStream};
pub use command::Command;
pub use error::{Error, Result};
pub use event::{ProcessEvent, ProcessEventType};
pub use launcher::Launcher;
pub use process::{ExitResult, ExitStatus, ProcessHandle};
