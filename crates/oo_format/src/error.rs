use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Not an `OoOo` container, found magic {found:?}")]
    InvalidContainerFormat { found: [u8; 4] },
    #[error("Component size mismatch for {component}: expected {expected} bytes, found {found}")]
    ComponentSizeMismatch {
        component: &'static str,
        expected: u32,
        found: u32,
    },
    #[error("Container is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: u64, found: u64 },
    #[error("Unexpected end of stream while reading {section}")]
    UnexpectedEof { section: &'static str },
    #[error("Container has trailing data: expected {expected} bytes, found {found}")]
    TrailingBytes { expected: u64, found: u64 },
    #[error("Too many {component} for a 32-bit count: {count}")]
    CountOverflow { component: &'static str, count: usize },
    #[error("{component} has {found} entries, expected {expected}")]
    AttributeMismatch {
        component: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Index {index} points past the last vertex ({vertex_count} vertices)")]
    IndexOutOfBounds { index: u16, vertex_count: usize },
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}
