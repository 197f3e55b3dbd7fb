use std::io;

use thiserror::Error;

use crate::bytestring::ByteString;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("bencode data must begin with a dictionary, found '{}'", .0.escape_default())]
    MalformedTopLevel(char),

    #[error("string length can not be a negative number")]
    NegativeLength,

    #[error("string length may not exceed the size of int64")]
    LengthOverflow,

    #[error("invalid string length: {0:?}")]
    InvalidLength(String),

    #[error("invalid integer: {0:?}")]
    MalformedInteger(String),

    #[error("unexpected byte '{}'", .0.escape_default())]
    UnexpectedByte(char),

    #[error("dictionary key '{0}' without value")]
    KeyWithoutValue(ByteString),

    #[error("dictionary keys must be byte strings, found '{}'", .0.escape_default())]
    NonStringKey(char),

    #[error("unexpected end of input")]
    Truncated,

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("duplicate dictionary key '{0}'")]
    DuplicateKey(ByteString),

    #[error("io error: {0}")]
    Io(#[source] io::Error),
}

// A reader running dry mid-value is a truncated document, not an I/O fault.
impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Io(err),
        }
    }
}
