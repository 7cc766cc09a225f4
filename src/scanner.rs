//! Finds the plugin archives in the host's plugin directory and loads what their manifests declare.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use zip::result::ZipError;

use crate::error::ManifestReadError;
use crate::extension::ExtensionLoader;
use crate::loader::{DependencyLoader, LoadReport};
use crate::manifest::{parse_manifest, MANIFEST_ENTRY};
use crate::maven::resolver::ArtifactResolver;

/// Access to the host's plugin archives
pub trait PluginArchives {
    fn list_archives(&self, directory: &Path) -> std::io::Result<Vec<PathBuf>>;

    /// `Ok(None)` if the archive has no entry with that name
    fn read_entry(&self, archive: &Path, name: &str) -> Result<Option<Vec<u8>>, ManifestReadError>;
}

/// Plugin archives are the `*.jar` files directly inside the plugin directory
pub struct JarArchives;

impl PluginArchives for JarArchives {
    fn list_archives(&self, directory: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            let is_jar = path.extension().is_some_and(|ext| ext == "jar");
            if is_jar && path.is_file() {
                result.push(path);
            }
        }
        result.sort();
        Ok(result)
    }

    fn read_entry(&self, archive: &Path, name: &str) -> Result<Option<Vec<u8>>, ManifestReadError> {
        let file = File::open(archive)
            .map_err(|e| ManifestReadError::Open { path: archive.to_path_buf(), source: e })?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| ManifestReadError::Archive { path: archive.to_path_buf(), source: e })?;

        let mut entry = match zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ManifestReadError::Archive { path: archive.to_path_buf(), source: e }),
        };

        let mut data = Vec::new();
        entry.read_to_end(&mut data)
            .map_err(|e| ManifestReadError::Entry { path: archive.to_path_buf(), entry: name.to_string(), source: e })?;
        Ok(Some(data))
    }
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    /// the archive declares no dependencies
    NoManifest,
    Unreadable(ManifestReadError),
    Processed(LoadReport),
}

#[derive(Debug)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    pub outcome: ArchiveOutcome,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub archives: Vec<ArchiveReport>,
}
impl ScanReport {
    pub fn processed(&self) -> impl Iterator<Item = (&Path, &LoadReport)> {
        self.archives.iter()
            .filter_map(|a| match &a.outcome {
                ArchiveOutcome::Processed(report) => Some((a.archive.as_path(), report)),
                _ => None,
            })
    }

    pub fn failed_artifacts(&self) -> usize {
        self.processed()
            .map(|(_, r)| r.failed.len())
            .sum()
    }
}

pub fn read_manifest(archives: &impl PluginArchives, archive: &Path) -> Result<Option<String>, ManifestReadError> {
    match archives.read_entry(archive, MANIFEST_ENTRY)? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| ManifestReadError::Encoding { path: archive.to_path_buf(), entry: MANIFEST_ENTRY.to_string() }),
        None => Ok(None),
    }
}

/// Loads the dependencies of every plugin archive in `directory`, one archive after the other.
///
/// Problems with a single archive or artifact are logged and reported, but do not stop the scan.
///  Only failure to list the directory is returned as an error.
pub async fn scan<R: ArtifactResolver, E: ExtensionLoader>(
    archives: &impl PluginArchives,
    directory: &Path,
    loader: &mut DependencyLoader<R, E>,
) -> std::io::Result<ScanReport> {
    let archive_paths = archives.list_archives(directory)
        .map_err(|e| {
            error!("cannot list plugin archives in {}: {}", directory.display(), e);
            e
        })?;
    debug!("found {} plugin archives in {}", archive_paths.len(), directory.display());

    let mut report = ScanReport::default();
    for archive in archive_paths {
        let outcome = match read_manifest(archives, &archive) {
            Ok(None) => {
                debug!("{} has no {}", archive.display(), MANIFEST_ENTRY);
                ArchiveOutcome::NoManifest
            }
            Ok(Some(text)) => {
                info!("loading artifacts for {}", archive.display());
                ArchiveOutcome::Processed(loader.apply(&parse_manifest(&text)).await)
            }
            Err(e) => {
                error!("skipping {}: {}", archive.display(), e);
                ArchiveOutcome::Unreadable(e)
            }
        };
        report.archives.push(ArchiveReport { archive, outcome });
    }

    Ok(report)
}
