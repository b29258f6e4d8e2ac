use std::path::PathBuf;

use super::config::LauncherConfig;
use crate::core::downloader::Downloader;
use crate::core::error::LauncherResult;
use crate::core::loaders::{InstallContext, InstallationPlanner};
use crate::core::version::{ManifestCache, ManifestSnapshot};

const APP_DIR_NAME: &str = "mcserver";
const CONFIG_FILE: &str = "launcher.json";

/// Layout of the data directory.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    data_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn installers_dir(&self) -> PathBuf {
        self.data_dir.join("installers")
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.data_dir.join("instances")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}

/// Everything one run of the manager works with: paths, the launcher
/// configuration as read at startup, the HTTP stack, and the manifest cache.
pub struct AppState {
    pub paths: LauncherPaths,
    pub config: LauncherConfig,
    pub downloader: Downloader,
    pub manifests: ManifestCache,
    refresh: bool,
}

impl AppState {
    pub async fn with_downloader(
        data_dir: PathBuf,
        refresh: bool,
        downloader: Downloader,
    ) -> LauncherResult<Self> {
        let paths = LauncherPaths::new(data_dir);
        let config = LauncherConfig::load(&paths.config_path()).await?;
        let endpoints = config.endpoints.clone().unwrap_or_default();
        let manifests = ManifestCache::new(paths.cache_dir(), endpoints);

        Ok(Self {
            paths,
            config,
            downloader,
            manifests,
            refresh,
        })
    }

    /// The manifest snapshot of this run, loading it on first use.
    pub async fn snapshot(&self) -> LauncherResult<&ManifestSnapshot> {
        self.manifests
            .ensure_ready(&self.downloader, self.refresh)
            .await
    }

    pub async fn planner(&self) -> LauncherResult<InstallationPlanner<'_>> {
        let snapshot = self.snapshot().await?;
        Ok(InstallationPlanner::new(
            snapshot,
            InstallContext {
                downloader: &self.downloader,
                versions_dir: self.manifests.versions_dir(),
                installers_dir: self.paths.installers_dir(),
                config_path: self.paths.config_path(),
                java: self.config.java_binary(),
            },
        ))
    }

    /// Re-read `launcher.json` after another part of the run changed it.
    pub async fn reload_config(&mut self) -> LauncherResult<()> {
        self.config = LauncherConfig::load(&self.paths.config_path()).await?;
        Ok(())
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
