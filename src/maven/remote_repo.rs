use tracing::{debug, trace, warn};

use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::paths::as_maven_path;
use crate::maven::repositories::RemoteRepositoryRef;
use crate::util::blob::Blob;
use crate::util::file_transport::FileTransport;
use crate::util::http_downloader::{HttpClient, HttpDownloader};
use crate::util::transport::Transport;
use crate::util::validating_body::{parse_sha1, BodyValidator, Md5BodyValidator, Sha1BodyValidator, ValidatingBody};

/// How to treat artifacts for which the repository provides no checksum
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum ChecksumPolicy {
    /// fail if there is no checksum
    Require,
    #[default]
    VerifyIfPresent,
    /// do not validate at all
    Ignore,
}

pub struct RemoteMavenRepo {
    repository: RemoteRepositoryRef,
    transport: Box<dyn Transport>,
    policy: ChecksumPolicy,
}

impl RemoteMavenRepo {
    /// picks the transport based on the repository URL's scheme
    pub fn new(repository: RemoteRepositoryRef, client: &HttpClient, user_agent: &str, policy: ChecksumPolicy) -> anyhow::Result<RemoteMavenRepo> {
        let url = repository.url.as_str();
        let transport: Box<dyn Transport> = if url.starts_with("file://") {
            Box::new(FileTransport::new(url)?)
        }
        else if url.starts_with("http://") || url.starts_with("https://") {
            Box::new(HttpDownloader::new(client.clone(), url.to_string(), user_agent.to_string())?)
        }
        else {
            return Err(anyhow::anyhow!("unsupported repository URL {:?} for repository {}", url, repository.id));
        };

        Ok(RemoteMavenRepo::with_transport(repository, transport, policy))
    }

    pub fn with_transport(repository: RemoteRepositoryRef, transport: Box<dyn Transport>, policy: ChecksumPolicy) -> RemoteMavenRepo {
        RemoteMavenRepo {
            repository,
            transport,
            policy,
        }
    }

    /// `Ok(None)` if the repository does not have the artifact. The returned blob's data fails
    ///  when it is consumed if it does not match the checksums.
    pub async fn get_artifact(&self, artifact_ref: &MavenArtifactRef) -> anyhow::Result<Option<Blob>> {
        let path = as_maven_path(artifact_ref);
        trace!("getting {} from repository {}", path, self.repository.id);

        let Some(blob) = self.transport.get(&path).await? else {
            return Ok(None);
        };

        if self.policy == ChecksumPolicy::Ignore {
            return Ok(Some(blob));
        }

        let mut sha1 = blob.sha1;
        let md5 = blob.md5;
        if sha1.is_none() && md5.is_none() {
            sha1 = self.get_sha1_file(&path).await;
        }

        let mut validators: Vec<Box<dyn BodyValidator>> = vec![];
        if let Some(hash) = sha1 {
            validators.push(Box::new(Sha1BodyValidator::new(hash)));
        }
        if let Some(hash) = md5 {
            validators.push(Box::new(Md5BodyValidator::new(hash)));
        }

        if validators.is_empty() {
            if self.policy == ChecksumPolicy::Require {
                return Err(anyhow::anyhow!("repository {} provides no checksum for {}", self.repository.id, path));
            }
            warn!("repository {} provides no checksum for {} - not validating", self.repository.id, path);
        }

        Ok(Some(Blob {
            data: Box::pin(ValidatingBody::new(blob.data, validators)),
            md5,
            sha1,
        }))
    }

    async fn get_sha1_file(&self, path: &str) -> Option<[u8;20]> {
        let sha1_path = format!("{}.sha1", path);
        match self.transport.get_bytes(&sha1_path).await {
            Ok(Some(bytes)) => {
                let parsed = std::str::from_utf8(&bytes).ok().and_then(parse_sha1);
                if parsed.is_none() {
                    debug!("ignoring malformed checksum file {}", sha1_path);
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                debug!("failed to retrieve checksum file {}: {:#}", sha1_path, e);
                None
            }
        }
    }
}
