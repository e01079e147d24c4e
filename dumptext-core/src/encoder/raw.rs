use std::io::{self, Write};

/// Writes the bytes unchanged.
///
/// A byte sequence has no word width, so host byte order needs no reordering.
pub fn encode<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)
}
