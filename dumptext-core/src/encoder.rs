pub mod escape;
pub mod hexdump;
pub mod raw;

pub use hexdump::HexdumpWriter;

use std::io::Write;

use crate::config::Format;
use crate::error::{Error, Result};

impl Format {
    /// Writes `bytes` to `out` in this format.
    ///
    /// Output is streamed; whatever reached `out` before a write failure stays
    /// there.
    pub fn encode<W: Write>(self, out: &mut W, bytes: &[u8]) -> Result<()> {
        log::info!("encoding {} bytes as {}", bytes.len(), self);
        let written = match self {
            Format::Raw => raw::encode(out, bytes),
            Format::Escape => escape::encode(out, bytes),
            Format::Dump => hexdump::encode(out, bytes),
        };
        written.map_err(Error::Write)
    }
}
