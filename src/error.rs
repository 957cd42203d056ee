use std::path::PathBuf;

/// An error that can occur when building, serializing or loading an r-index.
#[derive(Debug)]
pub enum Error {
    /// A construction input file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A `.len`/`.ssam`/`.esam`/`.spos` stream has a byte length that is not
    /// a multiple of the declared integer width.
    MalformedStream { path: PathBuf, width: usize },
    /// The `.head` and `.len` streams disagree on the number of runs.
    RunCountMismatch { heads: usize, lens: usize },
    /// The `.spos` stream is not a strictly increasing sequence of offsets,
    /// or does not end with the eBWT length as a sentinel.
    MalformedStringOffsets,
    /// Not every run-conjugate-array-order suffix (or, in `first` mode, not
    /// every string start) carries a sample that the predecessor structure
    /// needs to answer `Φ`.
    InsufficientSamples { string_index: usize },
    /// The archive does not start with the expected magic bytes, or was
    /// produced by an incompatible format version.
    BadArchiveHeader,
    /// The archive ended before all expected fields were read.
    TruncatedArchive,
    /// Failed to (de)serialize a structure's binary representation.
    Codec(bincode::Error),
    /// A generic read/write failure on a stream that isn't tied to a
    /// specific construction-input path (archives, pattern files).
    Stream(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Error::MalformedStream { path, width } => write!(
                f,
                "{}: length is not a multiple of the element width ({} bytes)",
                path.display(),
                width
            ),
            Error::RunCountMismatch { heads, lens } => write!(
                f,
                "run count mismatch between .head ({} runs) and .len ({} runs)",
                heads, lens
            ),
            Error::MalformedStringOffsets => {
                write!(f, ".spos stream is not strictly increasing, or missing its sentinel")
            }
            Error::InsufficientSamples { string_index } => write!(
                f,
                "sample missing for string {}; rebuild with sample_first_rotations enabled",
                string_index
            ),
            Error::BadArchiveHeader => write!(f, "archive header is missing or unrecognized"),
            Error::TruncatedArchive => write!(f, "archive ended before all fields were read"),
            Error::Codec(err) => write!(f, "failed to (de)serialize: {}", err),
            Error::Stream(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Codec(err) => Some(err.as_ref()),
            Error::Stream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Stream(err)
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Codec(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
