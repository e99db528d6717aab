//! Test double for the [`Runner`] trait.
//!
//! Lives in the crate proper (not behind `cfg(test)`) so downstream crates
//! can drive the engine without spawning real processes.

use crate::runner::{ProcHandle, Runner};
use crate::sink::OutputSink;
use crate::{ProcError, ProcResult};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// One recorded invocation of the fake runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerCall {
    /// The argument vector that would have been spawned.
    pub argv: Vec<String>,
    /// The working directory it would have run in.
    pub cwd: PathBuf,
}

/// A [`Runner`] that records calls instead of spawning processes.
#[derive(Clone)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<RunnerCall>>>,
    failure: Arc<Mutex<Option<String>>>,
    stdout: Arc<Mutex<Option<String>>>,
    pid: u32,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            failure: Arc::default(),
            stdout: Arc::default(),
            pid: 42,
        }
    }
}

impl FakeRunner {
    /// A fake runner that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `pid` for handles returned by `start_with_io`.
    #[must_use]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Make every subsequent call fail with `message` as a spawn error.
    pub fn set_failure(&self, message: &str) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(message.to_string());
    }

    /// Write `text` into the stdout sink on every subsequent call.
    pub fn set_stdout(&self, text: &str) {
        *self.stdout.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
    }

    /// All invocations recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of invocations recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn record(&self, argv: &[String], cwd: &Path, stdout: &OutputSink) -> ProcResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RunnerCall {
                argv: argv.to_vec(),
                cwd: cwd.to_path_buf(),
            });

        let canned = self
            .stdout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(text) = canned {
            let mut sink = stdout.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = sink.write_all(text.as_bytes());
        }

        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = failure {
            return Err(ProcError::Spawn {
                program: argv.first().cloned().unwrap_or_default(),
                source: io::Error::other(message),
            });
        }
        Ok(())
    }
}

impl Runner for FakeRunner {
    fn run_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        _stderr: OutputSink,
    ) -> ProcResult<()> {
        self.record(argv, cwd, &stdout)
    }

    fn start_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        _stderr: OutputSink,
    ) -> ProcResult<ProcHandle> {
        self.record(argv, cwd, &stdout)?;
        Ok(ProcHandle::detached(self.pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    #[test]
    fn test_fake_runner_records_calls() {
        let runner = FakeRunner::new();
        let out = BufferSink::new();
        let err = BufferSink::new();
        runner
            .run_with_io(
                &["bash".into(), "-c".into(), "true".into()],
                Path::new("/tmp"),
                out.sink(),
                err.sink(),
            )
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].argv[2], "true");
        assert_eq!(calls[0].cwd, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_fake_runner_failure() {
        let runner = FakeRunner::new();
        runner.set_failure("no such program");
        let out = BufferSink::new();
        let err = BufferSink::new();
        let result = runner.run_with_io(
            &["x".into()],
            Path::new("."),
            out.sink(),
            err.sink(),
        );
        assert!(matches!(result, Err(ProcError::Spawn { .. })));
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_fake_runner_start_pid() {
        let runner = FakeRunner::new().with_pid(1234);
        let out = BufferSink::new();
        let err = BufferSink::new();
        let handle = runner
            .start_with_io(&["x".into()], Path::new("."), out.sink(), err.sink())
            .unwrap();
        assert_eq!(handle.pid(), 1234);
        assert!(handle.into_child().is_none());
    }
}
