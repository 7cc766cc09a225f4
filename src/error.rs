use std::path::PathBuf;

use thiserror::Error;

/// A coordinate string that does not have the form
///  `<groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>`
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid artifact coordinates {0:?}, expected <groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>")]
pub struct CoordinateParseError(pub String);

/// Reading the manifest of a single plugin archive failed. The archive is skipped.
#[derive(Debug, Error)]
pub enum ManifestReadError {
    #[error("cannot open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path:?} is not a readable archive: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("cannot read {entry} from {path:?}: {source}")]
    Entry {
        path: PathBuf,
        entry: String,
        source: std::io::Error,
    },

    #[error("{entry} in {path:?} is not valid UTF-8")]
    Encoding {
        path: PathBuf,
        entry: String,
    },
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no repositories to resolve {artifact} from")]
    NoRepositories {
        artifact: String,
    },

    #[error("artifact {artifact} not found in repositories {repositories:?}")]
    NotFound {
        artifact: String,
        repositories: Vec<String>,
    },

    #[error("failed to transfer {artifact} from repository {repository}: {cause:#}")]
    Transfer {
        artifact: String,
        repository: String,
        cause: anyhow::Error,
    },

    #[error("local repository error for {artifact}: {cause:#}")]
    Cache {
        artifact: String,
        cause: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("cannot install {path:?}: not an existing file")]
    Missing {
        path: PathBuf,
    },

    #[error("cannot install {path:?}: {reason}")]
    Rejected {
        path: PathBuf,
        reason: String,
    },
}

/// Loading a single artifact failed - the artifact is not available, but other artifacts are not
///  affected
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Coordinates(#[from] CoordinateParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Install(#[from] InstallError),
}
