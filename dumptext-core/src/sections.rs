use goblin::elf::section_header::{
    self, SectionHeader, SHF_COMPRESSED, SHF_EXECINSTR, SHT_NOBITS,
};

/// One entry of the section header table with its name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub vma: u64,
    pub file_offset: u64,
    pub size: u64,
}

impl Section {
    pub(crate) fn from_goblin_sh(index: usize, name: String, sh: &SectionHeader) -> Self {
        Section {
            index,
            name,
            sh_type: sh.sh_type,
            flags: sh.sh_flags,
            vma: sh.sh_addr,
            file_offset: sh.sh_offset,
            size: sh.sh_size,
        }
    }

    /// True when the section takes no space in the file (e.g. `.bss`).
    pub fn is_nobits(&self) -> bool {
        self.sh_type == SHT_NOBITS
    }

    pub fn is_executable(&self) -> bool {
        self.flags & u64::from(SHF_EXECINSTR) != 0
    }

    /// Stored behind an ELF compression header.
    pub fn is_compressed(&self) -> bool {
        self.flags & u64::from(SHF_COMPRESSED) != 0
    }

    /// Short name of the section type, e.g. `PROGBITS`.
    pub fn type_name(&self) -> &'static str {
        let name = section_header::sht_to_str(self.sh_type);
        name.strip_prefix("SHT_").unwrap_or(name)
    }
}

/// Returns the NUL-terminated name starting at `offset` in a string table.
pub(crate) fn name_from_strtab(strtab: &[u8], offset: usize) -> Option<String> {
    let tail = strtab.get(offset..)?;
    let end = tail.iter().position(|&b| b == 0)?;
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}
