use std::path::PathBuf;

/// All errors that can occur during FITS I/O operations.
#[derive(Debug)]
pub enum Error {
    /// A required header keyword was not found.
    NotFound(String),
    /// An element index exceeds the HDU shape, or a transfer would
    /// overflow the data block.
    OutOfBounds,
    /// The 2880-byte header block has no record slot left.
    HeaderFull,
    /// A header value could not be converted to the requested type.
    Parse(String),
    /// A header block ended without an END record.
    MissingEnd,
    /// BITPIX value outside the supported set {8, 16, 32, 64, -32, -64}.
    UnsupportedBitpix(i64),
    /// A typed data access did not match the HDU's declared element type.
    TypeMismatch {
        /// BITPIX declared by the HDU.
        expected: i64,
        /// BITPIX of the caller-supplied element type.
        found: i64,
    },
    /// Structural violation while reading a FITS file.
    Format {
        /// Path of the offending file.
        path: PathBuf,
        /// The underlying violation.
        cause: Box<Error>,
    },
    /// An I/O error from the operating system.
    Io(std::io::Error),
    /// The operation was cancelled by stopping the engine.
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(key) => write!(f, "header keyword not found: {key}"),
            Error::OutOfBounds => write!(f, "index out of bounds"),
            Error::HeaderFull => write!(f, "no record slot left in the header block"),
            Error::Parse(key) => write!(f, "failed to convert header value of {key}"),
            Error::MissingEnd => write!(f, "header block has no END record"),
            Error::UnsupportedBitpix(v) => write!(f, "unsupported BITPIX value: {v}"),
            Error::TypeMismatch { expected, found } => write!(
                f,
                "element type mismatch: HDU declares BITPIX {expected}, caller supplied {found}"
            ),
            Error::Format { path, cause } => {
                write!(f, "malformed FITS file {}: {cause}", path.display())
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Format { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
