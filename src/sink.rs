use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::fmt;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Output destination shared by a handler and everything derived from it.
///
/// Cloning shares the same writer and the same lock, so a whole handler
/// family serializes its writes and lines are never interleaved. The lock
/// is held only while a finished line is written and flushed.
pub struct SharedSink<W> {
    inner: Arc<Mutex<W>>,
}

impl<W: Write> SharedSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(out)),
        }
    }

    /// Write one complete line under the lock.
    ///
    /// **Returns**
    /// - `Err(..)` if the writer rejected the bytes or the flush failed.
    ///   Nothing is retried.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut out = self.inner.lock();
        out.write_all(line)?;
        out.flush()
    }
}

impl<W> SharedSink<W> {
    /// Exclusive access to the writer, e.g. to inspect captured output.
    pub fn lock(&self) -> MutexGuard<'_, W> {
        self.inner.lock()
    }

    /// Whether both handles guard the same writer.
    pub fn same_sink(&self, other: &SharedSink<W>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<W> Clone for SharedSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> fmt::Debug for SharedSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Whether `out` is an interactive terminal.
///
/// Only the standard streams and files can be terminals; any other writer
/// type (buffers, sockets, wrappers) reports `false`.
pub fn is_terminal<W: Any>(out: &W) -> bool {
    let out = out as &dyn Any;
    if let Some(stdout) = out.downcast_ref::<io::Stdout>() {
        stdout.is_terminal()
    } else if let Some(stderr) = out.downcast_ref::<io::Stderr>() {
        stderr.is_terminal()
    } else if let Some(file) = out.downcast_ref::<File>() {
        file.is_terminal()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn clones_share_one_writer() {
        let sink = SharedSink::new(Vec::new());
        let other = sink.clone();
        sink.write_line(b"one\n").unwrap();
        other.write_line(b"two\n").unwrap();
        assert!(sink.same_sink(&other));
        assert_eq!(*sink.lock(), b"one\ntwo\n");
    }

    #[test]
    fn write_errors_surface() {
        let sink = SharedSink::new(Broken);
        let err = sink.write_line(b"lost\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn in_memory_writers_are_not_terminals() {
        assert!(!is_terminal(&Vec::<u8>::new()));
        assert!(!is_terminal(&io::sink()));
    }
}
