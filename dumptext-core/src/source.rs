pub mod buffering;
pub mod seekable;

pub use buffering::BufferingReader;
pub use seekable::SeekableSource;

use crate::error::SourceError;

/// Largest single read issued by [`ReadAt::read_vec_at`].
///
/// Keeps a corrupt size field from turning into one huge allocation.
const CHUNK_SIZE: u64 = 64 * 1024;

/// Random-access reads over a binary blob.
///
/// Implementors take `&self` and use interior mutability where they need it,
/// so they are not meant to be shared across threads.
pub trait ReadAt {
    /// Fills `buf` with the bytes at `[offset, offset + buf.len())`.
    ///
    /// Fails with [`SourceError::ShortRead`] when the source ends first.
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), SourceError>;

    /// Reads `size` bytes at `offset` into a new vector, chunk by chunk.
    fn read_vec_at(&self, offset: u64, size: u64) -> Result<Vec<u8>, SourceError> {
        let mut out = Vec::new();
        let mut done = 0u64;
        while done < size {
            let len = (size - done).min(CHUNK_SIZE);
            let at = offset
                .checked_add(done)
                .ok_or(SourceError::ShortRead {
                    offset,
                    wanted: size,
                    available: done,
                })?;
            let start = out.len();
            out.resize(start + len as usize, 0);
            match self.read_exact_at(&mut out[start..], at) {
                Ok(()) => done += len,
                Err(SourceError::ShortRead { available, .. }) => {
                    return Err(SourceError::ShortRead {
                        offset,
                        wanted: size,
                        available: done + available,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}

impl ReadAt for [u8] {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        if buf.is_empty() {
            return Ok(());
        }
        let available = (self.len() as u64).saturating_sub(offset);
        let wanted = buf.len() as u64;
        if wanted > available {
            return Err(SourceError::ShortRead {
                offset,
                wanted,
                available,
            });
        }
        let start = offset as usize;
        buf.copy_from_slice(&self[start..start + buf.len()]);
        Ok(())
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), SourceError> {
        (**self).read_exact_at(buf, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reads_inside_bounds() {
        let data: &[u8] = &[1, 2, 3, 4, 5];
        let mut buf = [0u8; 3];
        data.read_exact_at(&mut buf, 1).unwrap();
        assert_eq!(buf, [2, 3, 4]);
    }

    #[test]
    fn slice_reports_available_bytes_on_short_read() {
        let data: &[u8] = &[1, 2, 3, 4, 5];
        let mut buf = [0u8; 4];
        match data.read_exact_at(&mut buf, 3) {
            Err(SourceError::ShortRead {
                offset,
                wanted,
                available,
            }) => {
                assert_eq!(offset, 3);
                assert_eq!(wanted, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected short read, got {other:?}"),
        }
    }

    #[test]
    fn read_vec_spans_several_chunks() {
        let data: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| i as u8).collect();
        let got = data.as_slice().read_vec_at(5, CHUNK_SIZE * 2).unwrap();
        assert_eq!(got.as_slice(), &data[5..5 + (CHUNK_SIZE * 2) as usize]);
    }

    #[test]
    fn read_vec_counts_whole_chunks_in_short_read() {
        let data = vec![0xaau8; (CHUNK_SIZE + 10) as usize];
        match data.as_slice().read_vec_at(0, u64::MAX) {
            Err(SourceError::ShortRead {
                wanted, available, ..
            }) => {
                assert_eq!(wanted, u64::MAX);
                assert_eq!(available, CHUNK_SIZE + 10);
            }
            other => panic!("expected short read, got {other:?}"),
        }
    }

    #[test]
    fn read_vec_of_zero_bytes_is_empty() {
        let data: &[u8] = &[];
        assert!(data.read_vec_at(100, 0).unwrap().is_empty());
    }
}
