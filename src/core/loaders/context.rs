use std::path::PathBuf;

use crate::core::downloader::Downloader;

/// Shared locations and tools an installation runs with.
pub struct InstallContext<'a> {
    pub downloader: &'a Downloader,
    /// Per-version manifests, shared by all instances.
    pub versions_dir: PathBuf,
    /// Mod loader installer jars, shared by all instances.
    pub installers_dir: PathBuf,
    /// `launcher.json`, home of the installer registry.
    pub config_path: PathBuf,
    pub java: PathBuf,
}
