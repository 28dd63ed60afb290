//! Local directory file store.
//!
//! Files live as flat entries directly under a single base directory, named
//! by [`naming::stored_name`]. Uploads are created with create-new semantics
//! so a same-second name collision fails instead of clobbering an existing
//! file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::naming;
use crate::sniff;
use crate::store::{FileStore, StoredContent};

/// Source of Unix timestamps (seconds) used to name uploads.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Stores uploads as flat files directly under an injected base directory.
pub struct DirectoryStore {
    base_path: PathBuf,
    clock: Clock,
    extension_fallback: bool,
}

impl DirectoryStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
            extension_fallback: true,
        }
    }

    /// Replace the wall clock, e.g. to pin upload timestamps in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// When enabled, content that sniffs as `application/octet-stream` is
    /// given a type guessed from the stored name's extension instead.
    pub fn with_extension_fallback(mut self, enabled: bool) -> Self {
        self.extension_fallback = enabled;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn content_type(&self, stored_name: &str, data: &[u8]) -> String {
        let sniffed = sniff::detect_content_type(data);
        if sniffed == sniff::OCTET_STREAM && self.extension_fallback && !data.is_empty() {
            if let Some(guess) = mime_guess::from_path(stored_name).first() {
                return guess.to_string();
            }
        }
        sniffed.to_string()
    }
}

#[async_trait]
impl FileStore for DirectoryStore {
    async fn upload(
        &self,
        original_name: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<String, StoreError> {
        let name = naming::upload_basename(original_name)?;
        let stored = naming::stored_name((self.clock)(), name);
        let dest = self.base_path.join(&stored);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await?;

        let copied: io::Result<u64> = async {
            let n = tokio::io::copy(content, &mut file).await?;
            file.sync_all().await?;
            Ok(n)
        }
        .await;

        match copied {
            Ok(bytes) => {
                debug!(stored = %stored, bytes, "File stored");
                Ok(stored)
            }
            Err(e) => {
                drop(file);
                if let Err(rm) = tokio::fs::remove_file(&dest).await {
                    warn!(error = %rm, path = %dest.display(), "Failed to remove partial upload");
                }
                Err(e.into())
            }
        }
    }

    async fn download(&self, stored_name: &str) -> Result<StoredContent, StoreError> {
        naming::validate_stored_name(stored_name)?;
        let src = self.base_path.join(stored_name);

        let data = match tokio::fs::read(&src).await {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(stored_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mime_type = self.content_type(stored_name, &data);
        debug!(stored = %stored_name, bytes = data.len(), mime = %mime_type, "File read");
        Ok(StoredContent {
            mime_type,
            content: Bytes::from(data),
        })
    }
}
