//! Real process execution on top of `std::process`.

use crate::sink::{OutputSink, SinkWriter};
use crate::{ProcError, ProcResult};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Contract between the manifest engine and process execution.
///
/// `run_with_io` blocks until the command exits; `start_with_io` returns as
/// soon as the process has been spawned. In both cases the child's stdout
/// and stderr are streamed into the given sinks.
pub trait Runner: Send + Sync {
    /// Run `argv` in `cwd` to completion. A non-zero exit is an error.
    fn run_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> ProcResult<()>;

    /// Spawn `argv` in `cwd` and return a handle without waiting.
    fn start_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> ProcResult<ProcHandle>;
}

/// Handle to a process started with [`Runner::start_with_io`].
///
/// The bridge owns the underlying process; callers only get its id. The
/// process is never implicitly waited on or killed.
pub struct ProcHandle {
    pid: u32,
    child: Option<Child>,
}

impl ProcHandle {
    /// Handle for a process the bridge does not manage (test doubles).
    #[must_use]
    pub fn detached(pid: u32) -> Self {
        Self { pid, child: None }
    }

    fn from_child(child: Child) -> Self {
        Self {
            pid: child.id(),
            child: Some(child),
        }
    }

    /// OS process id of the spawned process.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Take ownership of the underlying child process, if any.
    #[must_use]
    pub fn into_child(self) -> Option<Child> {
        self.child
    }
}

/// [`Runner`] that spawns real OS processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRunner;

impl LocalRunner {
    /// Create a runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn spawn_wired(
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> ProcResult<(Child, Vec<JoinHandle<()>>)> {
        let (program, args) = argv.split_first().ok_or(ProcError::EmptyCommand)?;

        debug!(command = ?argv, cwd = %cwd.display(), "spawning process");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcError::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut pumps = Vec::new();
        if let Some(out) = child.stdout.take() {
            pumps.push(forward(out, stdout));
        }
        if let Some(err) = child.stderr.take() {
            pumps.push(forward(err, stderr));
        }

        Ok((child, pumps))
    }
}

impl Runner for LocalRunner {
    fn run_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> ProcResult<()> {
        let (mut child, pumps) = Self::spawn_wired(argv, cwd, stdout, stderr)?;

        // Drain the pipes fully before reaping so no output is lost.
        for pump in pumps {
            let _ = pump.join();
        }

        let status = child.wait().map_err(|source| ProcError::Io {
            command: argv.join(" "),
            source,
        })?;

        if !status.success() {
            return Err(ProcError::Exit {
                command: argv.join(" "),
                status,
            });
        }
        Ok(())
    }

    fn start_with_io(
        &self,
        argv: &[String],
        cwd: &Path,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> ProcResult<ProcHandle> {
        let (child, _pumps) = Self::spawn_wired(argv, cwd, stdout, stderr)?;
        debug!(pid = child.id(), "process started");
        Ok(ProcHandle::from_child(child))
    }
}

/// Copy everything from `reader` into `sink` on a detached thread.
fn forward<R: Read + Send + 'static>(mut reader: R, sink: OutputSink) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut writer = SinkWriter(sink);
        let _ = io::copy(&mut reader, &mut writer);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    fn sh(cmd: &str) -> Vec<String> {
        vec!["bash".into(), "-c".into(), cmd.into()]
    }

    #[test]
    fn test_run_captures_stdout() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        LocalRunner::new()
            .run_with_io(&sh("echo hello"), Path::new("."), out.sink(), err.sink())
            .unwrap();
        assert_eq!(out.contents(), "hello\n");
        assert_eq!(err.contents(), "");
    }

    #[test]
    fn test_run_captures_stderr() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        LocalRunner::new()
            .run_with_io(&sh("echo oops >&2"), Path::new("."), out.sink(), err.sink())
            .unwrap();
        assert_eq!(err.contents(), "oops\n");
    }

    #[test]
    fn test_run_nonzero_exit_is_error() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        let result = LocalRunner::new().run_with_io(
            &sh("exit 3"),
            Path::new("."),
            out.sink(),
            err.sink(),
        );
        assert!(matches!(result, Err(ProcError::Exit { .. })));
    }

    #[test]
    fn test_run_respects_cwd() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = BufferSink::new();
        let err = BufferSink::new();
        LocalRunner::new()
            .run_with_io(&sh("pwd"), dir.path(), out.sink(), err.sink())
            .unwrap();
        assert!(out.contents().trim_end().ends_with(
            dir.path()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap()
        ));
    }

    #[test]
    fn test_empty_command_is_error() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        let result = LocalRunner::new().run_with_io(&[], Path::new("."), out.sink(), err.sink());
        assert!(matches!(result, Err(ProcError::EmptyCommand)));
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        let result = LocalRunner::new().run_with_io(
            &["definitely-not-a-real-binary-7f3a".to_string()],
            Path::new("."),
            out.sink(),
            err.sink(),
        );
        assert!(matches!(result, Err(ProcError::Spawn { .. })));
    }

    #[test]
    fn test_start_returns_pid_without_blocking() {
        let out = BufferSink::new();
        let err = BufferSink::new();
        let handle = LocalRunner::new()
            .start_with_io(&sh("sleep 5"), Path::new("."), out.sink(), err.sink())
            .unwrap();
        assert!(handle.pid() > 0);
        // Clean up so the test suite doesn't leave a sleeper behind.
        if let Some(mut child) = handle.into_child() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
