//! The `dependencies.conf` format: one directive per line.
//!
//! ```text
//! repository=<id>:<url>
//! artifact=<groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>
//! ```
//!
//! Other lines are ignored. Nothing is validated here; coordinates and URLs are checked when they
//! are used.

use std::fmt;

use tracing::warn;

/// The manifest's name inside a plugin archive
pub const MANIFEST_ENTRY: &str = "dependencies.conf";

pub const REPOSITORY_PREFIX: &str = "repository=";
pub const ARTIFACT_PREFIX: &str = "artifact=";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Directive {
    AddRepository {
        id: String,
        url: String,
    },
    LoadArtifact {
        coordinates: String,
    },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::AddRepository { id, url } => write!(f, "{}{}:{}", REPOSITORY_PREFIX, id, url),
            Directive::LoadArtifact { coordinates } => write!(f, "{}{}", ARTIFACT_PREFIX, coordinates),
        }
    }
}

pub fn parse_manifest(text: &str) -> Vec<Directive> {
    text.lines()
        .filter_map(parse_line)
        .collect()
}

pub fn parse_line(line: &str) -> Option<Directive> {
    if line.starts_with(REPOSITORY_PREFIX) {
        parse_repository(line)
    }
    else if line.starts_with(ARTIFACT_PREFIX) {
        parse_artifact(line)
    }
    else {
        None
    }
}

/// Splits at the first ':' only - everything after it is the URL, which has colons of its own
pub fn parse_repository(line: &str) -> Option<Directive> {
    let rest = line.strip_prefix(REPOSITORY_PREFIX)?;
    match rest.split_once(':') {
        Some((id, url)) => Some(Directive::AddRepository {
            id: id.to_string(),
            url: url.to_string(),
        }),
        None => {
            warn!("ignoring repository line without '<id>:<url>': {:?}", line);
            None
        }
    }
}

pub fn parse_artifact(line: &str) -> Option<Directive> {
    line.strip_prefix(ARTIFACT_PREFIX)
        .map(|coordinates| Directive::LoadArtifact {
            coordinates: coordinates.to_string(),
        })
}

pub fn to_manifest_string(directives: &[Directive]) -> String {
    directives.iter()
        .map(|d| format!("{}\n", d))
        .collect()
}
