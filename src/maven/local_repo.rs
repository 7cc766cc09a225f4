use std::path::{Path, PathBuf};

use futures::StreamExt;
use sha1::{Digest, Sha1};
use tokio::fs::{create_dir_all, metadata, remove_file, rename, write, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, trace, warn};
use uuid::Uuid;

use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::paths::{as_relative_path, maven_file_name};
use crate::util::blob::Blob;

/// The local artifact cache, laid out like a Maven repository.
///
/// Files are written to a temporary name next to their final location and renamed when they are
///  complete, so a file at an artifact's path is always complete and validated.
pub struct LocalRepository {
    root: PathBuf,
}
impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> LocalRepository {
        LocalRepository {
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, artifact_ref: &MavenArtifactRef) -> PathBuf {
        self.root.join(as_relative_path(artifact_ref))
    }

    pub async fn find(&self, artifact_ref: &MavenArtifactRef) -> anyhow::Result<Option<PathBuf>> {
        let path = self.path_for(artifact_ref);
        match metadata(&path).await {
            Ok(m) if m.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Drains the blob into the cache, returning the artifact's path. If the blob's data fails
    ///  (transfer or validation error), nothing is left behind.
    pub async fn store(&self, artifact_ref: &MavenArtifactRef, blob: Blob) -> anyhow::Result<PathBuf> {
        let path = self.path_for(artifact_ref);
        let directory = path.parent()
            .ok_or_else(|| anyhow::anyhow!("no parent directory for {}", path.display()))?;
        create_dir_all(directory).await?;

        let temp_path = directory.join(format!("{}.{}.part", maven_file_name(artifact_ref), Uuid::new_v4().as_hyphenated()));
        trace!("storing {} via {}", artifact_ref, temp_path.display());

        let stored = match Self::do_store(&temp_path, blob).await {
            Ok(sha1) => rename(&temp_path, &path).await
                .map(|_| sha1)
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        let sha1 = match stored {
            Ok(sha1) => sha1,
            Err(e) => {
                if let Err(cleanup_error) = remove_file(&temp_path).await {
                    error!("error cleaning up {} after failed attempt to store {}: {}", temp_path.display(), artifact_ref, cleanup_error);
                }
                return Err(e);
            }
        };

        // the artifact itself is complete at this point, the sidecar is informational
        let mut sha1_path = path.clone().into_os_string();
        sha1_path.push(".sha1");
        if let Err(e) = write(&sha1_path, sha1).await {
            warn!("stored {} but could not write {}: {}", artifact_ref, Path::new(&sha1_path).display(), e);
        }

        Ok(path)
    }

    /// returns the hex encoded SHA1 of the data written
    async fn do_store(temp_path: &Path, blob: Blob) -> anyhow::Result<String> {
        let mut data = blob.data;

        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(temp_path)
            .await?;

        let mut sha1_hasher: Sha1 = Default::default();
        while let Some(chunk) = data.next().await {
            let chunk = chunk?;
            sha1_hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(hex::encode(sha1_hasher.finalize()))
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;

    fn blob(chunks: Vec<anyhow::Result<Bytes>>) -> Blob {
        Blob {
            data: Box::pin(futures::stream::iter(chunks)),
            md5: None,
            sha1: None,
        }
    }

    fn leftover_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir).unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_store_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let artifact = MavenArtifactRef::parse("org.example:lib:1.0").unwrap();

        assert!(repo.find(&artifact).await.unwrap().is_none());

        let path = repo.store(&artifact, blob(vec![Ok(Bytes::from_static(b"hel")), Ok(Bytes::from_static(b"lo"))])).await.unwrap();
        assert_eq!(path, dir.path().join("org/example/lib/1.0/lib-1.0.jar"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("org/example/lib/1.0/lib-1.0.jar.sha1")).unwrap(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d",
        );

        assert_eq!(repo.find(&artifact).await.unwrap(), Some(path));

        let mut names = leftover_files(&dir.path().join("org/example/lib/1.0"));
        names.sort();
        assert_eq!(names, vec!["lib-1.0.jar", "lib-1.0.jar.sha1"]);
    }

    #[tokio::test]
    async fn test_failed_store_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let artifact = MavenArtifactRef::parse("org.example:lib:1.0").unwrap();

        let result = repo.store(&artifact, blob(vec![Ok(Bytes::from_static(b"hel")), Err(anyhow::anyhow!("SHA1 mismatch"))])).await;
        assert!(result.is_err());

        assert!(repo.find(&artifact).await.unwrap().is_none());
        assert!(leftover_files(&dir.path().join("org/example/lib/1.0")).is_empty());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let artifact = MavenArtifactRef::parse("org.example:lib:1.0").unwrap();

        // a non-empty directory in the artifact's place makes the rename fail
        let version_dir = dir.path().join("org/example/lib/1.0");
        std::fs::create_dir_all(version_dir.join("lib-1.0.jar/occupied")).unwrap();

        let result = repo.store(&artifact, blob(vec![Ok(Bytes::from_static(b"hello"))])).await;
        assert!(result.is_err());
        assert_eq!(leftover_files(&version_dir), vec!["lib-1.0.jar"]);
    }

    #[tokio::test]
    async fn test_sidecar_failure_keeps_stored_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let artifact = MavenArtifactRef::parse("org.example:lib:1.0").unwrap();

        let version_dir = dir.path().join("org/example/lib/1.0");
        std::fs::create_dir_all(version_dir.join("lib-1.0.jar.sha1")).unwrap();

        let path = repo.store(&artifact, blob(vec![Ok(Bytes::from_static(b"hello"))])).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert_eq!(repo.find(&artifact).await.unwrap(), Some(path));
    }
}
