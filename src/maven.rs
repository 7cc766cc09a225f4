pub mod coordinates;
pub mod local_repo;
pub mod paths;
pub mod remote_repo;
pub mod repositories;
pub mod resolver;

pub use coordinates::MavenArtifactRef;
pub use local_repo::LocalRepository;
pub use remote_repo::ChecksumPolicy;
pub use repositories::{RemoteRepositoryRef, RepositoryList};
pub use resolver::{ArtifactResolver, MavenResolver};
