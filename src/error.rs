//! Module to contain code related to errors that could be produced by the
//! library.
use core::fmt::{Debug, Display};
use std::io;

/// Alias for a Result with the error type ytfetch::Error.
pub type Result<T> = core::result::Result<T, Error>;

/// Dynamic error type used to carry the cause of a component failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// This type represents all errors this library could produce.
pub struct Error {
    // This is boxed to avoid passing around very large errors - in the case of a component error
    // we want to provide the source error to the caller.
    inner: Box<ErrorKind>,
}

/// The kind of the error.
/// This list may grow over time, and it's not recommended to exhaustively match
/// on it.
#[non_exhaustive]
pub enum ErrorKind {
    /// An operation was given input it cannot act on, such as an empty
    /// identifier list or a missing transcoding source file.
    InvalidInput {
        message: String,
    },
    /// A search query produced zero usable results.
    NotFound {
        query: String,
    },
    /// The metadata provider failed - transport, status or decode.
    Provider {
        source: BoxError,
    },
    /// The byte transfer from the media source failed partway.
    Transfer {
        source: BoxError,
    },
    /// The transcoding engine failed or exited unsuccessfully.
    Transcode {
        source: BoxError,
    },
    /// The HTTP client could not be constructed.
    Web(reqwest::Error),
    /// General io error.
    Io(io::Error),
    /// The operation was cancelled by the caller before completing.
    Cancelled,
}
impl Error {
    /// Extract the inner kind from the error for pattern matching.
    pub fn into_kind(self) -> ErrorKind {
        *self.inner
    }
    /// Returns true if the error arose from unusable caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(*self.inner, ErrorKind::InvalidInput { .. })
    }
    /// Returns true if a search produced zero results.
    pub fn is_not_found(&self) -> bool {
        matches!(*self.inner, ErrorKind::NotFound { .. })
    }
    /// Returns true if the metadata provider failed.
    pub fn is_provider(&self) -> bool {
        matches!(*self.inner, ErrorKind::Provider { .. })
    }
    /// Returns true if the byte transfer stage failed.
    pub fn is_transfer(&self) -> bool {
        matches!(*self.inner, ErrorKind::Transfer { .. })
    }
    /// Returns true if the transcoding stage failed.
    pub fn is_transcode(&self) -> bool {
        matches!(*self.inner, ErrorKind::Transcode { .. })
    }
    /// Returns true if the operation was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.inner, ErrorKind::Cancelled)
    }
    pub(crate) fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self {
            inner: Box::new(ErrorKind::InvalidInput {
                message: message.into(),
            }),
        }
    }
    pub(crate) fn not_found<S: Into<String>>(query: S) -> Self {
        Self {
            inner: Box::new(ErrorKind::NotFound {
                query: query.into(),
            }),
        }
    }
    pub(crate) fn provider<E: Into<BoxError>>(source: E) -> Self {
        Self {
            inner: Box::new(ErrorKind::Provider {
                source: source.into(),
            }),
        }
    }
    pub(crate) fn transfer<E: Into<BoxError>>(source: E) -> Self {
        Self {
            inner: Box::new(ErrorKind::Transfer {
                source: source.into(),
            }),
        }
    }
    pub(crate) fn transcode<E: Into<BoxError>>(source: E) -> Self {
        Self {
            inner: Box::new(ErrorKind::Transcode {
                source: source.into(),
            }),
        }
    }
    pub(crate) fn web(err: reqwest::Error) -> Self {
        Self {
            inner: Box::new(ErrorKind::Web(err)),
        }
    }
    pub(crate) fn cancelled() -> Self {
        Self {
            inner: Box::new(ErrorKind::Cancelled),
        }
    }
}

impl std::error::Error for Error {}
impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidInput { message } => write!(f, "Invalid input - {message}."),
            ErrorKind::NotFound { query } => {
                write!(f, "No results found for query <{query}>.")
            }
            ErrorKind::Provider { source } => {
                write!(f, "Metadata provider error {source} received.")
            }
            ErrorKind::Transfer { source } => {
                write!(f, "Transfer error {source} received during download.")
            }
            ErrorKind::Transcode { source } => {
                write!(f, "Transcoding error {source} received.")
            }
            ErrorKind::Web(e) => write!(f, "Web error {e} received."),
            ErrorKind::Io(e) => write!(f, "IO error {e} received."),
            ErrorKind::Cancelled => write!(f, "Operation cancelled by caller."),
        }
    }
}
// As this is displayed when unwrapping, we don't want to end up including the
// entire format of this struct.
impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            inner: Box::new(ErrorKind::Io(err)),
        }
    }
}
