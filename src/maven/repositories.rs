use std::fmt;

use tracing::warn;

pub const MAVEN_CENTRAL_ID: &str = "central";
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct RemoteRepositoryRef {
    pub id: String,
    pub url: String,
}
impl RemoteRepositoryRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> RemoteRepositoryRef {
        RemoteRepositoryRef {
            id: id.into(),
            url: url.into(),
        }
    }

    pub fn maven_central() -> RemoteRepositoryRef {
        RemoteRepositoryRef::new(MAVEN_CENTRAL_ID, MAVEN_CENTRAL_URL)
    }
}
impl fmt::Display for RemoteRepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// The repositories to resolve against, in the order they are asked.
///
/// Repositories are identified by their id: adding an id that is already present is a no-op, so
///  a later declaration can not redirect an id to a different URL.
#[derive(Clone, Debug, Default)]
pub struct RepositoryList {
    repositories: Vec<RemoteRepositoryRef>,
}
impl RepositoryList {
    pub fn new() -> RepositoryList {
        Default::default()
    }

    pub fn with_maven_central() -> RepositoryList {
        let mut result = RepositoryList::new();
        result.add(RemoteRepositoryRef::maven_central());
        result
    }

    /// returns `false` if a repository with the same id was present already
    pub fn add(&mut self, repository: RemoteRepositoryRef) -> bool {
        if let Some(existing) = self.get(&repository.id) {
            if existing.url != repository.url {
                warn!("ignoring repository {}: id is already registered for {}", repository, existing.url);
            }
            return false;
        }
        self.repositories.push(repository);
        true
    }

    pub fn get(&self, id: &str) -> Option<&RemoteRepositoryRef> {
        self.repositories.iter().find(|r| r.id == id)
    }

    pub fn as_slice(&self) -> &[RemoteRepositoryRef] {
        &self.repositories
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dedup_by_id_keeps_first() {
        let mut list = RepositoryList::with_maven_central();
        assert!(list.add(RemoteRepositoryRef::new("jitpack", "https://jitpack.io")));
        assert!(!list.add(RemoteRepositoryRef::new("central", "https://evil.example.com/")));
        assert!(!list.add(RemoteRepositoryRef::new("jitpack", "https://jitpack.io")));

        let ids: Vec<&str> = list.as_slice().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["central", "jitpack"]);
        assert_eq!(list.get("central").unwrap().url, MAVEN_CENTRAL_URL);
    }

    #[test]
    fn test_empty() {
        let list = RepositoryList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
