use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lock::acquire_file_lock;
use crate::core::downloader::ResourceLocation;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::LoaderKind;
use crate::core::version::ManifestEndpoints;

/// `launcher.json`: everything shared between instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Instance name → instance folder.
    #[serde(default)]
    pub instances: BTreeMap<String, PathBuf>,
    /// Installer registered for each mod loader.
    #[serde(default)]
    pub mod_loaders: BTreeMap<LoaderKind, ResourceLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<ManifestEndpoints>,
}

impl LauncherConfig {
    /// Read the configuration; a missing file yields the defaults.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Read-modify-write under the configuration lock.
    ///
    /// The new contents are written to a temporary file and renamed over the
    /// old one, so an interrupted update leaves either the old or the new file.
    pub async fn update<T>(
        path: &Path,
        modify: impl FnOnce(&mut LauncherConfig) -> LauncherResult<T>,
    ) -> LauncherResult<(LauncherConfig, T)> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LauncherError::io(parent))?;
        }

        let _guard = acquire_file_lock(&sibling(path, "lock")).await?;
        let mut config = Self::load(path).await?;
        let value = modify(&mut config)?;
        config.write_atomic(path).await?;
        debug!("Updated {:?}", path);

        Ok((config, value))
    }

    async fn write_atomic(&self, path: &Path) -> LauncherResult<()> {
        let tmp = sibling(path, "tmp");
        let payload = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(LauncherError::io(&tmp))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(LauncherError::io(path))
    }

    /// Java binary used for installers and servers.
    pub fn java_binary(&self) -> PathBuf {
        self.java_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::core::java::DEFAULT_JAVA))
    }
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}
