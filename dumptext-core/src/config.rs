use std::fmt;

/// Environment variable selecting the output [`Format`].
pub const FORMAT_VAR: &str = "FORMAT";
/// Environment variable enabling null-byte validation when set to `1`.
pub const VALIDATE_VAR: &str = "VALIDATE";
/// Section extracted unless the caller asks for another.
pub const TEXT_SECTION: &str = ".text";

const TOGGLE_ON: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Bytes written unchanged.
    Raw,
    /// `\xHH` per byte.
    #[default]
    Escape,
    /// `hexdump -C` style listing.
    Dump,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Format::Raw),
            "escape" => Ok(Format::Escape),
            "dump" => Ok(Format::Dump),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Raw => "raw",
            Format::Escape => "escape",
            Format::Dump => "dump",
        };
        write!(f, "{}", name)
    }
}

/// Settings for one extraction, resolved once by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub format: Format,
    pub validate: bool,
    pub section: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::default(),
            validate: false,
            section: TEXT_SECTION.to_string(),
        }
    }
}

impl Config {
    /// Resolves `FORMAT` and `VALIDATE` through `lookup`.
    ///
    /// The caller decides where values come from (usually the process
    /// environment). An empty or unknown format falls back to `escape`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(FORMAT_VAR).as_deref() {
            None | Some("") => Format::default(),
            Some(value) => value.parse().unwrap_or_else(|err| {
                log::warn!("{err}; falling back to {}", Format::default());
                Format::default()
            }),
        };
        let validate = lookup(VALIDATE_VAR).as_deref() == Some(TOGGLE_ON);

        Self {
            format,
            validate,
            ..Self::default()
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }
}
