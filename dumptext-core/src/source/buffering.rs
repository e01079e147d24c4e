use std::cell::RefCell;
use std::io::{self, Read};

use crate::error::SourceError;
use crate::source::ReadAt;

/// Presents random access over a forward-only stream such as piped stdin.
///
/// Bytes are pulled from the stream only as far as the furthest offset
/// requested so far, and everything pulled is retained, so earlier offsets
/// can be re-read at any time.
#[derive(Debug)]
pub struct BufferingReader<R: Read> {
    inner: RefCell<Buffered<R>>,
}

#[derive(Debug)]
struct Buffered<R: Read> {
    reader: R,
    buf: Vec<u8>,
    exhausted: bool,
}

impl<R: Read> Buffered<R> {
    /// Pulls from the stream until `end` bytes are buffered or it runs dry.
    fn fill_to(&mut self, end: u64) -> io::Result<()> {
        let have = self.buf.len() as u64;
        if end <= have || self.exhausted {
            return Ok(());
        }

        let want = end - have;
        let got = (&mut self.reader).take(want).read_to_end(&mut self.buf)? as u64;
        if got < want {
            self.exhausted = true;
            log::debug!("input stream ended after {} bytes", self.buf.len());
        }
        Ok(())
    }
}

impl<R: Read> BufferingReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: RefCell::new(Buffered {
                reader,
                buf: Vec::new(),
                exhausted: false,
            }),
        }
    }

    /// Number of bytes consumed from the stream so far.
    pub fn buffered_len(&self) -> usize {
        self.inner.borrow().buf.len()
    }
}

impl<R: Read> ReadAt for BufferingReader<R> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        if buf.is_empty() {
            return Ok(());
        }
        let wanted = buf.len() as u64;
        let inner = &mut *self.inner.borrow_mut();

        let Some(end) = offset.checked_add(wanted) else {
            return Err(SourceError::ShortRead {
                offset,
                wanted,
                available: 0,
            });
        };
        inner.fill_to(end)?;

        let have = inner.buf.len() as u64;
        if end > have {
            return Err(SourceError::ShortRead {
                offset,
                wanted,
                available: have.saturating_sub(offset),
            });
        }

        buf.copy_from_slice(&inner.buf[offset as usize..end as usize]);
        Ok(())
    }
}
