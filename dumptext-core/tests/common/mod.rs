#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOBITS: u32 = 8;
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

pub struct FixtureSection {
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub data: Vec<u8>,
}

/// Writes small but well-formed ELF images for tests.
///
/// Layout: header, section data, name string table, then the section header
/// table. `headers_first` moves the table and string table ahead of the data.
pub struct ElfBuilder {
    pub is_64: bool,
    pub big_endian: bool,
    pub headers_first: bool,
    pub sections: Vec<FixtureSection>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self {
            is_64: true,
            big_endian: false,
            headers_first: false,
            sections: Vec::new(),
        }
    }

    pub fn elf32(mut self) -> Self {
        self.is_64 = false;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn headers_first(mut self) -> Self {
        self.headers_first = true;
        self
    }

    pub fn section(mut self, name: &str, sh_type: u32, flags: u64, data: &[u8]) -> Self {
        self.sections.push(FixtureSection {
            name: name.to_string(),
            sh_type,
            flags,
            data: data.to_vec(),
        });
        self
    }

    pub fn text(self, data: &[u8]) -> Self {
        self.section(".text", SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, data)
    }

    pub fn build(&self) -> Vec<u8> {
        if self.big_endian {
            self.build_with::<BigEndian>()
        } else {
            self.build_with::<LittleEndian>()
        }
    }

    fn ehdr_size(&self) -> u64 {
        if self.is_64 { 64 } else { 52 }
    }

    fn shdr_size(&self) -> u64 {
        if self.is_64 { 64 } else { 40 }
    }

    fn build_with<B: ByteOrder>(&self) -> Vec<u8> {
        // Null section, user sections, then .shstrtab.
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for s in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(s.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let shnum = self.sections.len() as u64 + 2;
        let table_size = shnum * self.shdr_size();

        let mut cursor = self.ehdr_size();
        let mut shoff = 0;
        let mut shstrtab_offset = 0;
        if self.headers_first {
            shoff = cursor;
            cursor += table_size;
            shstrtab_offset = cursor;
            cursor += shstrtab.len() as u64;
        }
        let mut data_offsets = Vec::new();
        for s in &self.sections {
            data_offsets.push(cursor);
            if s.sh_type != SHT_NOBITS {
                cursor += s.data.len() as u64;
            }
        }
        if !self.headers_first {
            shstrtab_offset = cursor;
            cursor += shstrtab.len() as u64;
            shoff = cursor;
        }

        let mut out = Vec::new();
        self.write_ehdr::<B>(&mut out, shoff, shnum as u16, (shnum - 1) as u16);

        let mut table = Vec::new();
        self.write_shdr::<B>(&mut table, 0, 0, 0, 0, 0, 0);
        for (i, s) in self.sections.iter().enumerate() {
            self.write_shdr::<B>(
                &mut table,
                name_offsets[i],
                s.sh_type,
                s.flags,
                data_offsets[i],
                s.data.len() as u64,
                0,
            );
        }
        self.write_shdr::<B>(
            &mut table,
            shstrtab_name,
            SHT_STRTAB,
            0,
            shstrtab_offset,
            shstrtab.len() as u64,
            0,
        );

        if self.headers_first {
            out.extend_from_slice(&table);
            out.extend_from_slice(&shstrtab);
        }
        for s in &self.sections {
            if s.sh_type != SHT_NOBITS {
                out.extend_from_slice(&s.data);
            }
        }
        if !self.headers_first {
            out.extend_from_slice(&shstrtab);
            out.extend_from_slice(&table);
        }
        out
    }

    fn write_ehdr<B: ByteOrder>(&self, out: &mut Vec<u8>, shoff: u64, shnum: u16, shstrndx: u16) {
        let class = if self.is_64 { 2 } else { 1 };
        let data = if self.big_endian { 2 } else { 1 };
        out.write_all(&[0x7f, b'E', b'L', b'F', class, data, 1, 0]).unwrap();
        out.write_all(&[0; 8]).unwrap();

        out.write_u16::<B>(1).unwrap(); // ET_REL
        out.write_u16::<B>(62).unwrap(); // EM_X86_64
        out.write_u32::<B>(1).unwrap();
        self.write_word::<B>(out, 0); // e_entry
        self.write_word::<B>(out, 0); // e_phoff
        self.write_word::<B>(out, shoff);
        out.write_u32::<B>(0).unwrap();
        out.write_u16::<B>(self.ehdr_size() as u16).unwrap();
        out.write_u16::<B>(0).unwrap();
        out.write_u16::<B>(0).unwrap();
        out.write_u16::<B>(self.shdr_size() as u16).unwrap();
        out.write_u16::<B>(shnum).unwrap();
        out.write_u16::<B>(shstrndx).unwrap();
    }

    #[allow(clippy::too_many_arguments)]
    fn write_shdr<B: ByteOrder>(
        &self,
        out: &mut Vec<u8>,
        name: u32,
        sh_type: u32,
        flags: u64,
        offset: u64,
        size: u64,
        link: u32,
    ) {
        out.write_u32::<B>(name).unwrap();
        out.write_u32::<B>(sh_type).unwrap();
        self.write_word::<B>(out, flags);
        self.write_word::<B>(out, 0); // sh_addr
        self.write_word::<B>(out, offset);
        self.write_word::<B>(out, size);
        out.write_u32::<B>(link).unwrap();
        out.write_u32::<B>(0).unwrap();
        self.write_word::<B>(out, 1); // sh_addralign
        self.write_word::<B>(out, 0); // sh_entsize
    }

    fn write_word<B: ByteOrder>(&self, out: &mut Vec<u8>, v: u64) {
        if self.is_64 {
            out.write_u64::<B>(v).unwrap();
        } else {
            out.write_u32::<B>(v as u32).unwrap();
        }
    }
}

/// The minimal image used by most tests: one `.text` holding `de ad be ef`.
pub fn deadbeef_elf() -> Vec<u8> {
    ElfBuilder::new().text(&[0xde, 0xad, 0xbe, 0xef]).build()
}

/// Offset of the `e_shoff` field in a 64-bit header.
pub const E_SHOFF_64: usize = 0x28;
/// Offsets of `e_shnum` and `e_shstrndx` in a 64-bit header.
pub const E_SHNUM_64: usize = 0x3c;
pub const E_SHSTRNDX_64: usize = 0x3e;
