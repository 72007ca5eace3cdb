use std::error;
use std::fmt;
use std::io;

/// Errors produced anywhere in this crate.
#[derive(Debug)]
pub enum Error {
    /// An underlying I/O operation failed, or returned fewer bytes than required.
    Io(io::Error),
    /// The tag or a frame payload is malformed.
    Format(FormatError),
    /// A caller passed an argument the operation cannot act on.
    Argument(String),
    /// The operation requires state the `TagData` does not have (e.g. a bound file for `save`).
    State(String),
}

/// Specific ways a tag or frame payload can be malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    UnsupportedVersion(u8),
    UnsupportedFeature(&'static str),
    UnknownEncodingByte(u8),
    UnterminatedString,
    InvalidSize,
    InvalidEncoding,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Format(err) => write!(f, "malformed tag data: {}", err),
            Error::Argument(msg) => write!(f, "invalid argument: {}", msg),
            Error::State(msg) => write!(f, "invalid state: {}", msg),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::UnsupportedVersion(major) => {
                write!(f, "unsupported ID3v2 major version {}", major)
            }
            FormatError::UnsupportedFeature(name) => write!(f, "unsupported feature: {}", name),
            FormatError::UnknownEncodingByte(byte) => {
                write!(f, "unknown encoding byte 0x{:02X}", byte)
            }
            FormatError::UnterminatedString => write!(f, "string is missing its null terminator"),
            FormatError::InvalidSize => write!(f, "frame or tag size is invalid"),
            FormatError::InvalidEncoding => write!(f, "bytes are not valid in the given encoding"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl error::Error for FormatError {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
