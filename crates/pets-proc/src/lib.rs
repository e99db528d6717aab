//! Process bridge for the pets manifest runner.
//!
//! Manifests describe commands; this crate actually runs them. It exposes
//! the [`Runner`] trait with two operations — run a command to completion
//! ([`Runner::run_with_io`]) or start it and hand back a [`ProcHandle`]
//! ([`Runner::start_with_io`]) — plus [`LocalRunner`], the real
//! implementation on top of `std::process`, and [`FakeRunner`] for tests.
//!
//! Child output is streamed into [`OutputSink`]s owned by the host, so the
//! engine can forward process output to its own stdout/stderr (or capture
//! it in tests) without the child inheriting host descriptors.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod fake;
mod runner;
mod sink;

pub use fake::{FakeRunner, RunnerCall};
pub use runner::{LocalRunner, ProcHandle, Runner};
pub use sink::{BufferSink, OutputSink, stderr_sink, stdout_sink};

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors reported by the process bridge.
#[derive(Debug, Error)]
pub enum ProcError {
    /// The argument vector was empty.
    #[error("cannot run an empty command")]
    EmptyCommand,

    /// The program could not be spawned.
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        /// The program that failed to spawn.
        program: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The command ran but terminated abnormally.
    #[error("command {command:?} failed: {status}")]
    Exit {
        /// The full command line.
        command: String,
        /// The exit status reported by the OS.
        status: ExitStatus,
    },

    /// An I/O error occurred while managing the child process.
    #[error("i/o error while running {command:?}: {source}")]
    Io {
        /// The full command line.
        command: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Result type for process bridge operations.
pub type ProcResult<T> = Result<T, ProcError>;
