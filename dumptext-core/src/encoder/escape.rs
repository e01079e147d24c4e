use std::io::{self, Write};

const HEX_TABLE: &[u8; 16] = b"0123456789abcdef";

/// The `\xHH` literal for one byte, high nibble first.
pub fn escape_byte(v: u8) -> [u8; 4] {
    [
        b'\\',
        b'x',
        HEX_TABLE[usize::from(v >> 4)],
        HEX_TABLE[usize::from(v & 0x0f)],
    ]
}

/// Writes every byte as `\xHH` with nothing in between (`\xde\xad\xbe\xef`).
pub fn encode<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    for &v in bytes {
        out.write_all(&escape_byte(v))?;
    }
    Ok(())
}
