use std::io::Read;

use flate2::read::ZlibDecoder;
use goblin::container::Ctx;
use goblin::elf::header::{
    Header, EI_CLASS, EI_DATA, ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, ELFMAG, ET_EXEC,
    SELFMAG, SIZEOF_IDENT,
};
use goblin::elf::section_header::{SectionHeader, SHN_UNDEF, SHN_XINDEX, SHT_NOBITS};
use goblin::elf::Elf;
use goblin::elf32::header::SIZEOF_EHDR as SIZEOF_EHDR32;
use goblin::elf32::section_header::SIZEOF_SHDR as SIZEOF_SHDR32;
use goblin::elf64::header::SIZEOF_EHDR as SIZEOF_EHDR64;
use goblin::elf64::section_header::SIZEOF_SHDR as SIZEOF_SHDR64;
use scroll::{Endian, Pread};

use crate::error::{Error, ParseError, Result, SourceError};
use crate::sections::{name_from_strtab, Section};
use crate::source::ReadAt;

/// A parsed ELF header and section header table over a byte source.
///
/// Only metadata is read up front. Section contents stay in the source until
/// [`ElfContainer::section_data`] asks for them, which keeps the buffering
/// stdin path from consuming more of the stream than it needs.
#[derive(Debug)]
pub struct ElfContainer<S: ReadAt> {
    source: S,
    header: Header,
    ctx: Ctx,
    sections: Vec<Section>,
}

impl<S: ReadAt> ElfContainer<S> {
    pub fn open(source: S) -> Result<Self> {
        let mut ident = [0u8; SIZEOF_IDENT];
        read_header_bytes(&source, &mut ident)?;

        if &ident[..SELFMAG] != ELFMAG {
            let mut magic = [0u8; SELFMAG];
            magic.copy_from_slice(&ident[..SELFMAG]);
            return Err(ParseError::BadMagic(magic).into());
        }
        let ehdr_size = match ident[EI_CLASS] {
            ELFCLASS32 => SIZEOF_EHDR32,
            ELFCLASS64 => SIZEOF_EHDR64,
            class => return Err(ParseError::UnsupportedClass(class).into()),
        };
        match ident[EI_DATA] {
            ELFDATA2LSB | ELFDATA2MSB => {}
            data => return Err(ParseError::UnsupportedEncoding(data).into()),
        }

        let mut raw = vec![0u8; ehdr_size];
        read_header_bytes(&source, &mut raw)?;
        let header = Elf::parse_header(&raw).map_err(ParseError::from)?;
        let container = header.container().map_err(ParseError::from)?;
        let endian = header.endianness().map_err(ParseError::from)?;
        let ctx = Ctx::new(container, endian);

        log::debug!(
            "ELF{} {:?} header: machine {:#x}, {} sections at {:#x}",
            if ctx.is_big() { 64 } else { 32 },
            endian,
            header.e_machine,
            header.e_shnum,
            header.e_shoff
        );

        let sections = read_section_table(&source, &header, ctx)?;
        log::debug!("parsed {} section headers", sections.len());

        Ok(Self {
            source,
            header,
            ctx,
            sections,
        })
    }

    pub fn is_64(&self) -> bool {
        self.ctx.is_big()
    }

    pub fn is_little_endian(&self) -> bool {
        self.ctx.is_little_endian()
    }

    pub fn is_executable(&self) -> bool {
        self.header.e_type == ET_EXEC
    }

    pub fn entry_point(&self) -> u64 {
        self.header.e_entry
    }

    pub fn machine(&self) -> u16 {
        self.header.e_machine
    }

    /// Sections in table order, including the null section at index 0.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// First section whose name matches `name` exactly.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Reads the file bytes backing `section`, inflating them if the section
    /// is `SHF_COMPRESSED`.
    pub fn section_data(&self, section: &Section) -> Result<Vec<u8>> {
        if section.is_nobits() {
            return Err(Error::NoBits(section.name.clone()));
        }
        let data = self
            .source
            .read_vec_at(section.file_offset, section.size)
            .map_err(|source| Error::Extract {
                section: section.name.clone(),
                source,
            })?;
        if section.is_compressed() {
            return decompress(section, &data, self.ctx);
        }
        Ok(data)
    }

    /// Looks up `name` and reads its data in one step.
    pub fn read_section(&self, name: &str) -> Result<Vec<u8>> {
        let section = self
            .section(name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))?;
        log::debug!(
            "section {} (#{}) at offset {:#x}, {} bytes",
            section.name,
            section.index,
            section.file_offset,
            section.size
        );
        self.section_data(section)
    }
}

/// Reads header bytes from the start of the source; running out is a truncated header.
fn read_header_bytes<S: ReadAt>(source: &S, buf: &mut [u8]) -> Result<()> {
    match source.read_exact_at(buf, 0) {
        Err(SourceError::ShortRead { available, .. }) => {
            Err(ParseError::TruncatedHeader { available }.into())
        }
        other => other.map_err(Error::from),
    }
}

const ELFCOMPRESS_ZLIB: u32 = 1;

/// Returns `ch_type`, `ch_size` and the header length for the file's class.
fn read_chdr(data: &[u8], ctx: Ctx) -> std::result::Result<(u32, u64, usize), scroll::Error> {
    let endian: Endian = ctx.le;
    let ch_type: u32 = data.pread_with(0, endian)?;
    if ctx.is_big() {
        Ok((ch_type, data.pread_with::<u64>(8, endian)?, 24))
    } else {
        Ok((ch_type, u64::from(data.pread_with::<u32>(4, endian)?), 12))
    }
}

/// Splits an `Elf32_Chdr`/`Elf64_Chdr` off `data` and inflates the zlib stream behind it.
fn decompress(section: &Section, data: &[u8], ctx: Ctx) -> Result<Vec<u8>> {
    let fail = |reason: String| Error::Decompress {
        section: section.name.clone(),
        reason,
    };
    let (ch_type, ch_size, header_len) =
        read_chdr(data, ctx).map_err(|e| fail(format!("bad compression header: {e}")))?;
    if ch_type != ELFCOMPRESS_ZLIB {
        return Err(fail(format!("unsupported compression type {ch_type}")));
    }
    let body = data
        .get(header_len..)
        .ok_or_else(|| fail("bad compression header: truncated".to_string()))?;

    // One byte past the declared size is enough to notice an oversized stream.
    let mut out = Vec::new();
    ZlibDecoder::new(body)
        .take(ch_size.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| fail(format!("zlib: {e}")))?;
    if out.len() as u64 != ch_size {
        return Err(fail(format!(
            "inflated to {} bytes, header declares {ch_size}",
            out.len()
        )));
    }
    log::debug!(
        "section {}: inflated {} bytes to {}",
        section.name,
        data.len(),
        out.len()
    );
    Ok(out)
}

fn malformed(reason: String) -> Error {
    ParseError::MalformedSectionTable(reason).into()
}

/// Reads a metadata range; running out of input means the table is malformed.
fn read_table_bytes<S: ReadAt>(source: &S, offset: u64, size: u64, what: &str) -> Result<Vec<u8>> {
    source.read_vec_at(offset, size).map_err(|e| match e {
        SourceError::ShortRead { available, .. } => malformed(format!(
            "{what} at {offset:#x} needs {size} bytes, only {available} available"
        )),
        e => Error::Source(e),
    })
}

fn parse_shdr(table: &[u8], offset: usize, ctx: Ctx) -> Result<SectionHeader> {
    let sh: std::result::Result<SectionHeader, goblin::error::Error> =
        table.pread_with(offset, ctx);
    sh.map_err(|e| malformed(format!("section header at table offset {offset:#x}: {e}")))
}

fn read_section_table<S: ReadAt>(source: &S, header: &Header, ctx: Ctx) -> Result<Vec<Section>> {
    if header.e_shoff == 0 {
        log::warn!("no section header table (stripped binary?)");
        return Ok(Vec::new());
    }

    let entsize = if ctx.is_big() {
        SIZEOF_SHDR64
    } else {
        SIZEOF_SHDR32
    };
    if header.e_shentsize as usize != entsize {
        return Err(malformed(format!(
            "entry size {} does not match the ELF class (expected {entsize})",
            header.e_shentsize
        )));
    }

    // Extended numbering keeps the real count and string table index in section 0.
    let mut count = header.e_shnum as u64;
    let mut strndx = u32::from(header.e_shstrndx);
    if count == 0 || strndx == SHN_XINDEX {
        let first = read_table_bytes(source, header.e_shoff, entsize as u64, "section header 0")?;
        let sh0 = parse_shdr(&first, 0, ctx)?;
        if count == 0 {
            count = sh0.sh_size;
        }
        if strndx == SHN_XINDEX {
            strndx = sh0.sh_link;
        }
    }

    let table_size = count
        .checked_mul(entsize as u64)
        .ok_or_else(|| malformed(format!("section count {count} overflows")))?;
    let table = read_table_bytes(source, header.e_shoff, table_size, "section header table")?;
    let headers = table
        .chunks_exact(entsize)
        .map(|entry| parse_shdr(entry, 0, ctx))
        .collect::<Result<Vec<_>>>()?;

    let strtab = if strndx == SHN_UNDEF {
        log::warn!("no section name string table; all names are empty");
        None
    } else {
        let sh = headers.get(strndx as usize).ok_or_else(|| {
            malformed(format!(
                "name string table index {strndx} out of range ({} sections)",
                headers.len()
            ))
        })?;
        if sh.sh_type == SHT_NOBITS {
            return Err(malformed("name string table has no file data".to_string()));
        }
        Some(read_table_bytes(
            source,
            sh.sh_offset,
            sh.sh_size,
            "name string table",
        )?)
    };

    Ok(headers
        .iter()
        .enumerate()
        .map(|(index, sh)| {
            let name = match &strtab {
                Some(strtab) => name_from_strtab(strtab, sh.sh_name).unwrap_or_else(|| {
                    log::warn!("section #{index}: name offset {:#x} unresolvable", sh.sh_name);
                    String::new()
                }),
                None => String::new(),
            };
            Section::from_goblin_sh(index, name, sh)
        })
        .collect())
}
