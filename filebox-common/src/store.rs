use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::StoreError;

/// A file read back from the store together with its sniffed MIME type.
#[derive(Debug, Clone)]
pub struct StoredContent {
    pub mime_type: String,
    pub content: Bytes,
}

/// Trait implemented by file storage backends.
///
/// The HTTP layer only deals in original names, stored names, and byte
/// streams; naming, placement, and content-type detection are the backend's
/// concern.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `content` under a name derived from `original_name` and the
    /// current time. Returns the stored name used to retrieve it later.
    async fn upload(
        &self,
        original_name: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<String, StoreError>;

    /// Read back a file previously returned by [`FileStore::upload`].
    async fn download(&self, stored_name: &str) -> Result<StoredContent, StoreError>;
}
