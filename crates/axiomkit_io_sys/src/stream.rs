//! Stream adapters: a null sink/source and a progress-reporting writer.

use std::io::{self, Read, Write};

/// Ready-made [`NullStream`] value.
pub const DEV_NULL: NullStream = NullStream;

/// Stream with no backing storage.
///
/// Reads claim to fill the whole buffer but leave its contents untouched,
/// writes accept and drop everything, and closing always succeeds. Reads
/// never report EOF, so `read_to_end` on it does not terminate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullStream;

impl NullStream {
    /// Close the stream. Always succeeds.
    pub fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for NullStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(buf.len())
    }
}

impl Write for NullStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer decorator that reports how many bytes each write forwarded.
///
/// The callback receives the per-call byte count, not a running total.
/// Failed writes are returned unchanged without a callback.
pub struct ProgressWriter<W, F> {
    inner: W,
    progress: F,
}

impl<W, F> ProgressWriter<W, F>
where
    W: Write,
    F: FnMut(u64),
{
    /// Wrap `inner`, calling `progress` after every successful write.
    pub fn new(inner: W, progress: F) -> Self {
        Self { inner, progress }
    }

    /// Borrow the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the wrapped writer.
    ///
    /// Bytes written through this reference bypass the progress callback.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Drop the callback and return the wrapped writer. Nothing is flushed.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W, F> Write for ProgressWriter<W, F>
where
    W: Write,
    F: FnMut(u64),
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n_written = self.inner.write(buf)?;
        (self.progress)(n_written as u64);
        Ok(n_written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: std::fmt::Debug, F> std::fmt::Debug for ProgressWriter<W, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressWriter")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
