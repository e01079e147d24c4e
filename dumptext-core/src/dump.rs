use std::io::Write;

use crate::config::Config;
use crate::container::ElfContainer;
use crate::error::Result;
use crate::source::ReadAt;
use crate::validate::ensure_no_null_bytes;

/// Pulls `config.section` out of the ELF image behind `source`.
///
/// When `config.validate` is set, data containing zero bytes is rejected here,
/// before anything could be encoded.
pub fn extract<S: ReadAt>(config: &Config, source: S) -> Result<Vec<u8>> {
    let elf = ElfContainer::open(source)?;
    let data = elf.read_section(&config.section)?;
    log::info!("extracted {} bytes from {}", data.len(), config.section);

    if config.validate {
        ensure_no_null_bytes(&data)?;
    }
    Ok(data)
}

/// Extracts the configured section and writes it to `out` in `config.format`.
pub fn dump<S: ReadAt, W: Write>(config: &Config, source: S, out: &mut W) -> Result<()> {
    let data = extract(config, source)?;
    config.format.encode(out, &data)?;
    out.flush().map_err(crate::Error::Write)
}
