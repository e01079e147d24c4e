use std::io::{self, Write};

const BYTES_PER_LINE: usize = 16;

/// Streams a canonical hexdump, the layout of `hexdump -C`:
///
/// ```text
/// 00000000  de ad be ef 41 42 43 44  00 00 00 00 00 00 00 00  |....ABCD........|
/// ```
///
/// Full lines are written as soon as their sixteenth byte arrives. A trailing
/// partial line is padded and written by [`HexdumpWriter::finish`], or on drop
/// if `finish` was never called.
#[derive(Debug)]
pub struct HexdumpWriter<W: Write> {
    out: W,
    ascii: [u8; BYTES_PER_LINE],
    used: usize,
    offset: u64,
    finished: bool,
    /// Sink error held back after a partial write, reported by the next call.
    pending: Option<io::Error>,
}

impl<W: Write> HexdumpWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            ascii: [0; BYTES_PER_LINE],
            used: 0,
            offset: 0,
            finished: false,
            pending: None,
        }
    }

    /// Separator after the hex column at `pos`, closing the hex area at the end.
    fn separator(pos: usize) -> &'static [u8] {
        match pos {
            7 => b"  ",
            15 => b"  |",
            _ => b" ",
        }
    }

    fn push(&mut self, b: u8) -> io::Result<()> {
        if self.used == 0 {
            write!(self.out, "{:08x}  ", self.offset)?;
        }

        let [_, _, hi, lo] = super::escape::escape_byte(b);
        self.out.write_all(&[hi, lo])?;
        self.out.write_all(Self::separator(self.used))?;

        self.ascii[self.used] = printable(b);
        self.used += 1;
        self.offset += 1;

        if self.used == BYTES_PER_LINE {
            // The line is complete even if writing its tail fails.
            self.used = 0;
            let ascii = self.ascii;
            self.out.write_all(&ascii)?;
            self.out.write_all(b"|\n")?;
        }
        Ok(())
    }

    /// Pads and writes a pending partial line. Calling it again is a no-op.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.pending.take() {
            return Err(e);
        }
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if self.used == 0 {
            return Ok(());
        }

        let n = self.used;
        for pos in n..BYTES_PER_LINE {
            self.out.write_all(b"  ")?;
            self.out.write_all(Self::separator(pos))?;
        }
        self.out.write_all(&self.ascii[..n])?;
        self.out.write_all(b"|\n")?;
        self.used = 0;
        self.out.flush()
    }
}

impl<W: Write> Write for HexdumpWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(e) = self.pending.take() {
            return Err(e);
        }
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "write to a finished hexdump",
            ));
        }
        let start = self.offset;
        for &b in buf {
            if let Err(e) = self.push(b) {
                let accepted = (self.offset - start) as usize;
                if accepted == 0 {
                    return Err(e);
                }
                self.pending = Some(e);
                return Ok(accepted);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for HexdumpWriter<W> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

fn printable(b: u8) -> u8 {
    if (0x20..=0x7e).contains(&b) {
        b
    } else {
        b'.'
    }
}

pub fn encode<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut dumper = HexdumpWriter::new(out);
    dumper.write_all(bytes)?;
    dumper.finish()
}
