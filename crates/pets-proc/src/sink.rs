//! Output sinks shared between the host and child-output forwarding threads.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// A shared write target for process output.
///
/// Sinks are handed to the [`Runner`](crate::Runner) by the host and written
/// to from forwarding threads, so they are reference-counted and locked.
pub type OutputSink = Arc<Mutex<dyn Write + Send>>;

/// A sink that writes to the host process's stdout.
#[must_use]
pub fn stdout_sink() -> OutputSink {
    Arc::new(Mutex::new(io::stdout()))
}

/// A sink that writes to the host process's stderr.
#[must_use]
pub fn stderr_sink() -> OutputSink {
    Arc::new(Mutex::new(io::stderr()))
}

/// An in-memory sink that captures everything written to it.
///
/// Used by tests to assert on process and `print` output.
#[derive(Clone, Default)]
pub struct BufferSink {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    /// Create an empty buffer sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The [`OutputSink`] view of this buffer.
    #[must_use]
    pub fn sink(&self) -> OutputSink {
        // Method-form clone so the concrete Arc unsizes at the binding.
        let sink: OutputSink = self.inner.clone();
        sink
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let buf = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// `Write` adapter that locks an [`OutputSink`] per call.
pub(crate) struct SinkWriter(pub(crate) OutputSink);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_captures_writes() {
        let buffer = BufferSink::new();
        let sink = buffer.sink();
        let mut writer = SinkWriter(sink);
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(buffer.contents(), "hello world");
    }
}
