use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dumptext_core::{BufferingReader, Config, ElfContainer, ReadAt, SeekableSource, TEXT_SECTION};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Dump the code section of an ELF binary
#[derive(Parser)]
#[command(
    name = "dumptext",
    about = "Reads the .text section from an ELF binary and dumps (optionally formatted) bytes to stdout.",
    override_usage = "dumptext path/to/elf/binary\n       cat path/to/elf/binary | dumptext",
    after_help = "Environment:\n  \
        FORMAT=escape(default)|dump|raw  output format\n  \
        VALIDATE=1                       fail if the data contains null bytes",
    version
)]
struct Cli {
    /// Path to the ELF binary; piped stdin is read when omitted
    path: Option<PathBuf>,

    /// Section to extract
    #[arg(long, default_value = TEXT_SECTION)]
    section: String,

    /// Print the section table instead of dumping
    #[arg(long)]
    list_sections: bool,
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "VMA")]
    vma: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

/// Where the ELF image comes from.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    File(PathBuf),
    Stdin,
    Usage,
}

/// A path argument wins; otherwise stdin is read unless it is a terminal.
fn select_input(path: Option<&Path>, stdin_is_terminal: bool) -> Input {
    match path {
        Some(path) => Input::File(path.to_path_buf()),
        None if !stdin_is_terminal => Input::Stdin,
        None => Input::Usage,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::from_lookup(|key| std::env::var(key).ok()).with_section(&cli.section);
    log::debug!("resolved {config:?}");

    let mut out = BufWriter::new(io::stdout().lock());
    match select_input(cli.path.as_deref(), io::stdin().is_terminal()) {
        Input::File(path) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            run(&cli, &config, SeekableSource::new(file), &mut out)
        }
        Input::Stdin => run(
            &cli,
            &config,
            BufferingReader::new(io::stdin().lock()),
            &mut out,
        ),
        Input::Usage => print_usage_and_exit(),
    }
}

fn run<S: ReadAt, W: Write>(cli: &Cli, config: &Config, source: S, out: &mut W) -> Result<()> {
    if cli.list_sections {
        let elf = ElfContainer::open(source).context("failed to parse ELF input")?;
        print_sections(out, &elf)?;
        out.flush()?;
        return Ok(());
    }

    dumptext_core::dump(config, source, out)
        .with_context(|| format!("failed to dump {}", config.section))
}

fn print_sections<S: ReadAt, W: Write>(out: &mut W, elf: &ElfContainer<S>) -> Result<()> {
    writeln!(
        out,
        "ELF{} {}-endian {}, machine {:#x}, entry 0x{:x}",
        if elf.is_64() { 64 } else { 32 },
        if elf.is_little_endian() { "little" } else { "big" },
        if elf.is_executable() { "executable" } else { "object" },
        elf.machine(),
        elf.entry_point()
    )?;

    if elf.sections().is_empty() {
        writeln!(out, "No sections found (possibly stripped binary).")?;
        return Ok(());
    }

    let rows = elf.sections().iter().map(|s| SectionRow {
        name: s.name.clone(),
        kind: s.type_name(),
        vma: format!("0x{:x}", s.vma),
        offset: format!("0x{:x}", s.file_offset),
        size: format!("0x{:x}", s.size),
        flags: format!("0x{:x}", s.flags),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    writeln!(out, "{table}")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../dumptext-core/tests/common/mod.rs"]
mod fixture;

fn print_usage_and_exit() -> ! {
    let _ = Cli::command().print_help();
    std::process::exit(1);
}
