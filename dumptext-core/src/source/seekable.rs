use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::SourceError;
use crate::source::ReadAt;

/// Random access over anything that can already seek, such as a [`std::fs::File`].
#[derive(Debug)]
pub struct SeekableSource<R: Read + Seek> {
    inner: RefCell<R>,
}

impl<R: Read + Seek> SeekableSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: RefCell::new(inner),
        }
    }
}

impl<R: Read + Seek> ReadAt for SeekableSource<R> {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        if buf.is_empty() {
            return Ok(());
        }
        let reader = &mut *self.inner.borrow_mut();
        reader.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < buf.len() {
            return Err(SourceError::ShortRead {
                offset,
                wanted: buf.len() as u64,
                available: filled as u64,
            });
        }
        Ok(())
    }
}
