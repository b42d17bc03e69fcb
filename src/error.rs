use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Debug, Error)]
pub enum PatchError {
    /// The patch could not be parsed, or does not fit the base it is applied to.
    #[error("invalid patch format: {0}")]
    InvalidFormat(String),
    #[error("no such file: {}", path.display())]
    NoSuchFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the file {} already exists and must be deleted first", .0.display())]
    OutputExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PatchError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PatchError::InvalidFormat(message.into())
    }

    pub(crate) fn truncated() -> Self {
        PatchError::invalid("reached the end of the file unexpectedly")
    }

    /// Maps read failures inside a patch body onto format errors.
    pub(crate) fn from_body(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => PatchError::truncated(),
            io::ErrorKind::InvalidData => PatchError::InvalidFormat(err.to_string()),
            _ => PatchError::Io(err),
        }
    }
}
