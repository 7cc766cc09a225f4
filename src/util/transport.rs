use async_trait::async_trait;
use bytes::Bytes;

use crate::util::blob::Blob;

/// Fetches files relative to a repository's base location.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `Ok(None)` means the repository answered, but does not have a file at `path`.
    async fn get(&self, path: &str) -> anyhow::Result<Option<Blob>>;

    async fn get_bytes(&self, path: &str) -> anyhow::Result<Option<Bytes>> {
        match self.get(path).await? {
            Some(blob) => Ok(Some(blob.into_bytes().await?)),
            None => Ok(None),
        }
    }
}
