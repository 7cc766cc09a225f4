use std::path::PathBuf;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::{metadata, File};
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use crate::util::blob::Blob;
use crate::util::transport::Transport;

/// Serves a repository that lives in a local directory, addressed by a `file://` URL.
///
/// There are no checksum headers, so validation relies on sidecar files.
pub struct FileTransport {
    root: PathBuf,
}
impl FileTransport {
    pub fn new(base_uri: &str) -> anyhow::Result<FileTransport> {
        let Some(root) = base_uri.strip_prefix("file://") else {
            return Err(anyhow::anyhow!("not a file URL: {}", base_uri));
        };
        if root.is_empty() {
            return Err(anyhow::anyhow!("file URL without a path: {}", base_uri));
        }

        Ok(FileTransport {
            root: PathBuf::from(root),
        })
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Blob>> {
        let mut file_path = self.root.clone();
        file_path.extend(path.split('/').filter(|s| !s.is_empty()));

        trace!("reading {}", file_path.display());

        match metadata(&file_path).await {
            Ok(m) if m.is_file() => {}
            Ok(_) => {
                debug!("{} is not a file", file_path.display());
                return Ok(None);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found", file_path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let file = File::open(&file_path).await?;
        let data = ReaderStream::new(file)
            .map(|chunk| chunk.map_err(anyhow::Error::from));

        Ok(Some(Blob {
            data: Box::pin(data),
            md5: None,
            sha1: None,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/c.txt"), b"content").unwrap();

        let transport = FileTransport::new(&format!("file://{}/", dir.path().display())).unwrap();

        let bytes = transport.get_bytes("a/b/c.txt").await.unwrap().unwrap();
        assert_eq!(&bytes[..], b"content");

        assert!(transport.get("a/b/missing.txt").await.unwrap().is_none());
        assert!(transport.get("a/b").await.unwrap().is_none());
    }

    #[test]
    fn test_rejects_non_file_urls() {
        assert!(FileTransport::new("https://repo.maven.apache.org/maven2/").is_err());
        assert!(FileTransport::new("file://").is_err());
    }
}
