use std::path::PathBuf;

use crate::maven::remote_repo::ChecksumPolicy;

/// Name of the loader's own data directory inside the plugin directory
pub const DATA_DIR_NAME: &str = "DependencyLoader";

/// Name of the local repository directory inside the data directory
pub const LOCAL_REPO_DIR_NAME: &str = ".m2";

pub const DEFAULT_USER_AGENT: &str = concat!("dependency-loader/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// the directory containing the plugin archives
    pub plugins_dir: PathBuf,
    pub data_dir: PathBuf,
    pub checksum_policy: ChecksumPolicy,
    pub user_agent: String,
}

impl LoaderConfig {
    /// data directory inside the plugin directory, everything else default
    pub fn for_plugins_dir(plugins_dir: impl Into<PathBuf>) -> LoaderConfig {
        let plugins_dir = plugins_dir.into();
        LoaderConfig {
            data_dir: plugins_dir.join(DATA_DIR_NAME),
            plugins_dir,
            checksum_policy: ChecksumPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn local_repository_root(&self) -> PathBuf {
        self.data_dir.join(LOCAL_REPO_DIR_NAME)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig::for_plugins_dir("plugins")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.plugins_dir, PathBuf::from("plugins"));
        assert_eq!(config.local_repository_root(), PathBuf::from("plugins/DependencyLoader/.m2"));
        assert_eq!(config.checksum_policy, ChecksumPolicy::VerifyIfPresent);
        assert!(config.user_agent.starts_with("dependency-loader/"));
    }
}
