use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StoreError {
    /// True when the caller supplied something unusable, as opposed to a
    /// failure of the underlying filesystem.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::InvalidName(_))
    }
}
