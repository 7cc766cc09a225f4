use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::LoadError;
use crate::extension::ExtensionLoader;
use crate::manifest::Directive;
use crate::maven::coordinates::MavenArtifactRef;
use crate::maven::repositories::{RemoteRepositoryRef, RepositoryList};
use crate::maven::resolver::ArtifactResolver;

/// The artifacts a loader installed successfully, in installation order.
///
/// A registry lives as long as the loader it is passed to; a restarted host starts with an empty
///  one. The loader only records into it and never consults it - callers that want to skip
///  duplicates check [DependencyLoader::is_artifact_loaded] themselves.
#[derive(Debug, Default)]
pub struct LoadedArtifacts {
    entries: Vec<(MavenArtifactRef, PathBuf)>,
}
impl LoadedArtifacts {
    pub fn new() -> LoadedArtifacts {
        Default::default()
    }

    pub fn record(&mut self, artifact_ref: MavenArtifactRef, path: PathBuf) {
        if !self.contains(&artifact_ref) {
            self.entries.push((artifact_ref, path));
        }
    }

    pub fn contains(&self, artifact_ref: &MavenArtifactRef) -> bool {
        self.entries.iter().any(|(a, _)| a == artifact_ref)
    }

    pub fn path_of(&self, artifact_ref: &MavenArtifactRef) -> Option<&Path> {
        self.entries.iter()
            .find(|(a, _)| a == artifact_ref)
            .map(|(_, p)| p.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(MavenArtifactRef, PathBuf)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Outcome of applying one manifest's directives
#[derive(Debug, Default)]
pub struct LoadReport {
    pub repositories_added: Vec<String>,
    pub loaded: Vec<PathBuf>,
    /// coordinate string as written in the manifest, and why it could not be loaded
    pub failed: Vec<(String, LoadError)>,
}
impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolves artifacts against a list of repositories and installs them through the host's
///  extension loader.
///
/// Unless constructed with an explicit repository list, Maven Central is available from the
///  start. Further repositories are added by id, the first registration of an id wins.
pub struct DependencyLoader<R: ArtifactResolver, E: ExtensionLoader> {
    resolver: R,
    extensions: E,
    repositories: RepositoryList,
    registry: LoadedArtifacts,
}

impl <R: ArtifactResolver, E: ExtensionLoader> DependencyLoader<R, E> {
    pub fn new(resolver: R, extensions: E, registry: LoadedArtifacts) -> DependencyLoader<R, E> {
        Self::with_repositories(resolver, extensions, registry, RepositoryList::with_maven_central())
    }

    /// starts with exactly the given repositories instead of Maven Central
    pub fn with_repositories(resolver: R, extensions: E, registry: LoadedArtifacts, repositories: RepositoryList) -> DependencyLoader<R, E> {
        DependencyLoader {
            resolver,
            extensions,
            repositories,
            registry,
        }
    }

    /// returns `false` if the id was registered already, the existing URL stays in effect
    pub fn add_repository(&mut self, id: &str, url: &str) -> bool {
        self.repositories.add(RemoteRepositoryRef::new(id, url))
    }

    pub fn repositories(&self) -> &RepositoryList {
        &self.repositories
    }

    pub fn registry(&self) -> &LoadedArtifacts {
        &self.registry
    }

    pub fn extensions(&self) -> &E {
        &self.extensions
    }

    pub fn is_artifact_loaded(&self, artifact_ref: &MavenArtifactRef) -> bool {
        self.registry.contains(artifact_ref)
    }

    /// loads `<group_id>:<artifact_id>:jar:<version>`
    pub async fn load(&mut self, group_id: &str, artifact_id: &str, version: &str) -> Result<PathBuf, LoadError> {
        self.load_coordinates(&format!("{}:{}:{}", group_id, artifact_id, version)).await
    }

    /// loads `<groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>`
    pub async fn load_coordinates(&mut self, coordinates: &str) -> Result<PathBuf, LoadError> {
        info!("loading artifact {}", coordinates);
        let artifact_ref = MavenArtifactRef::parse(coordinates)
            .map_err(|e| {
                error!("{}", e);
                LoadError::from(e)
            })?;
        self.load_artifact(&artifact_ref).await
    }

    /// Resolves the artifact and installs it. Failures are logged and returned, there is no
    ///  retry. Calling this twice for the same artifact resolves and installs it twice.
    pub async fn load_artifact(&mut self, artifact_ref: &MavenArtifactRef) -> Result<PathBuf, LoadError> {
        let path = match self.resolver.resolve(artifact_ref, self.repositories.as_slice()).await {
            Ok(path) => path,
            Err(e) => {
                error!("failed to resolve {}: {}", artifact_ref, e);
                return Err(e.into());
            }
        };

        if let Err(e) = self.extensions.install(&path) {
            error!("failed to install {}: {}", artifact_ref, e);
            return Err(e.into());
        }

        info!("loaded {} from {}", artifact_ref, path.display());
        self.registry.record(artifact_ref.clone(), path.clone());
        Ok(path)
    }

    /// Processes directives in order. A failing artifact is recorded in the report, the
    ///  remaining directives are processed regardless.
    pub async fn apply(&mut self, directives: &[Directive]) -> LoadReport {
        let mut report = LoadReport::default();

        for directive in directives {
            match directive {
                Directive::AddRepository { id, url } => {
                    if self.add_repository(id, url) {
                        info!("added repository {} ({})", id, url);
                        report.repositories_added.push(id.clone());
                    }
                }
                Directive::LoadArtifact { coordinates } => {
                    match self.load_coordinates(coordinates).await {
                        Ok(path) => report.loaded.push(path),
                        Err(e) => report.failed.push((coordinates.clone(), e)),
                    }
                }
            }
        }

        if !report.is_success() {
            warn!("{} of {} artifacts could not be loaded", report.failed.len(), report.failed.len() + report.loaded.len());
        }
        report
    }
}
