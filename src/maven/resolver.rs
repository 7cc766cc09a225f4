use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ResolutionError;
use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::local_repo::LocalRepository;
use crate::maven::remote_repo::{ChecksumPolicy, RemoteMavenRepo};
use crate::maven::repositories::RemoteRepositoryRef;
use crate::util::http_downloader::{new_http_client, HttpClient};

/// Turns coordinates into a local file, fetching it from one of the repositories if necessary
#[async_trait]
pub trait ArtifactResolver: Send + Sync {
    async fn resolve(&self, artifact_ref: &MavenArtifactRef, repositories: &[RemoteRepositoryRef]) -> Result<PathBuf, ResolutionError>;
}

/// Resolves single artifacts (no transitive dependencies) through a local cache.
pub struct MavenResolver {
    local_repo: LocalRepository,
    client: HttpClient,
    user_agent: String,
    policy: ChecksumPolicy,
}
impl MavenResolver {
    pub fn new(local_repo: LocalRepository, policy: ChecksumPolicy, user_agent: String) -> MavenResolver {
        MavenResolver {
            local_repo,
            client: new_http_client(),
            user_agent,
            policy,
        }
    }

    pub fn local_repository(&self) -> &LocalRepository {
        &self.local_repo
    }

    async fn download(&self, artifact_ref: &MavenArtifactRef, repository: &RemoteRepositoryRef) -> anyhow::Result<Option<PathBuf>> {
        let remote = RemoteMavenRepo::new(repository.clone(), &self.client, &self.user_agent, self.policy)?;
        match remote.get_artifact(artifact_ref).await? {
            Some(blob) => Ok(Some(self.local_repo.store(artifact_ref, blob).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ArtifactResolver for MavenResolver {
    async fn resolve(&self, artifact_ref: &MavenArtifactRef, repositories: &[RemoteRepositoryRef]) -> Result<PathBuf, ResolutionError> {
        let found = self.local_repo.find(artifact_ref).await
            .map_err(|e| ResolutionError::Cache {
                artifact: artifact_ref.to_string(),
                cause: e,
            })?;
        if let Some(path) = found {
            debug!("{} is cached at {}", artifact_ref, path.display());
            return Ok(path);
        }

        if repositories.is_empty() {
            return Err(ResolutionError::NoRepositories {
                artifact: artifact_ref.to_string(),
            });
        }

        let mut last_failure = None;
        for repository in repositories {
            debug!("trying to resolve {} from {}", artifact_ref, repository);
            match self.download(artifact_ref, repository).await {
                Ok(Some(path)) => {
                    info!("downloaded {} from {}", artifact_ref, repository.id);
                    return Ok(path);
                }
                Ok(None) => {
                    debug!("{} not found in {}", artifact_ref, repository);
                }
                Err(e) => {
                    warn!("failed to get {} from {}: {:#}", artifact_ref, repository, e);
                    last_failure = Some(ResolutionError::Transfer {
                        artifact: artifact_ref.to_string(),
                        repository: repository.id.clone(),
                        cause: e,
                    });
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| ResolutionError::NotFound {
            artifact: artifact_ref.to_string(),
            repositories: repositories.iter().map(|r| r.id.clone()).collect(),
        }))
    }
}
