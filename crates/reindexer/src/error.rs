use std::{io, path::PathBuf};

use oo_format::FormatError;

use crate::mesh::obj::parser::MalformedReason;
use crate::reindex::Attribute;

pub type Result<T> = ::std::result::Result<T, ReindexError>;

#[derive(thiserror::Error, Debug)]
pub enum ReindexError {
    #[error("Could not read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read model.")]
    Io(#[from] io::Error),
    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: MalformedReason },
    #[error("{attribute} index {index} is out of range, only {len} parsed")]
    IndexOutOfRange {
        attribute: Attribute,
        index: usize,
        len: usize,
    },
    #[error("Mesh has more than {max} unique vertices, which do not fit 16-bit indices")]
    CapacityExceeded { max: usize },
    #[error("Invalid meta file `{}`", path.display())]
    Meta {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
}
