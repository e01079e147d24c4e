use std::io;

/// Failures raised by a byte source while serving a random-access read.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("short read at offset {offset:#x}: wanted {wanted} bytes, only {available} available")]
    ShortRead {
        offset: u64,
        wanted: u64,
        available: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The byte source does not hold a usable ELF container.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("bad ELF magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("truncated ELF header: only {available} bytes available")]
    TruncatedHeader { available: u64 },

    #[error("unsupported ELF class {0:#x}")]
    UnsupportedClass(u8),

    #[error("unsupported ELF data encoding {0:#x}")]
    UnsupportedEncoding(u8),

    #[error("malformed section header table: {0}")]
    MalformedSectionTable(String),

    #[error("goblin: {0}")]
    Goblin(#[from] goblin::error::Error),
}

/// All errors produced by the extraction pipeline.
///
/// Every variant is fatal for the current invocation; there is no retry.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read input: {0}")]
    Source(#[from] SourceError),

    #[error("failed to parse ELF container: {0}")]
    Parse(#[from] ParseError),

    #[error("section `{0}` not found")]
    SectionNotFound(String),

    #[error("failed to read data of section `{section}`: {source}")]
    Extract {
        section: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to decompress section `{section}`: {reason}")]
    Decompress { section: String, reason: String },

    #[error("section `{0}` occupies no bytes in the file")]
    NoBits(String),

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    #[error("null bytes found at indices: {0:?}")]
    NullBytes(Vec<usize>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
