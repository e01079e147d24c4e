pub mod config;
pub mod container;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod sections;
pub mod source;
pub mod validate;

pub use config::*;
pub use container::ElfContainer;
pub use dump::*;
pub use error::*;
pub use sections::Section;
pub use source::*;
