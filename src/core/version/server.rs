use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::manifest::VersionEntry;
use super::version_file::VersionJson;
use crate::core::downloader::{DownloadOutcome, Downloader, ResourceLocation};
use crate::core::error::{LauncherError, LauncherResult};

/// A vanilla server: its per-version manifest and, once that has been read,
/// the server jar it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinecraftServerVersion {
    pub version: String,
    pub version_manifest: ResourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_jar: Option<ResourceLocation>,
}

impl MinecraftServerVersion {
    pub fn from_entry(entry: &VersionEntry) -> Self {
        let mut version_manifest = ResourceLocation::new(&entry.url);
        if let Some(sha1) = &entry.sha1 {
            version_manifest = version_manifest.with_sha1(sha1);
        }
        Self {
            version: entry.id.clone(),
            version_manifest,
            version_jar: None,
        }
    }

    /// Fetch the per-version manifest into `versions_dir`, read its server
    /// download, and fetch the jar into `folder`.
    ///
    /// Returns the outcomes for the manifest and the jar, in that order.
    pub async fn download(
        &mut self,
        downloader: &Downloader,
        versions_dir: &Path,
        folder: &Path,
        force: bool,
        check: bool,
    ) -> LauncherResult<(DownloadOutcome, DownloadOutcome)> {
        let manifest_outcome = self
            .version_manifest
            .download(downloader, versions_dir, force, check)
            .await?;

        let version_json = VersionJson::load(&self.version_manifest.path_in(versions_dir)).await?;
        let mut jar = version_json
            .server_resource()
            .ok_or_else(|| LauncherError::NoServerDownload(self.version.clone()))?;
        debug!("{} server jar is {}", self.version, jar);

        let jar_outcome = jar.download(downloader, folder, force, check).await?;
        self.version_jar = Some(jar);

        Ok((manifest_outcome, jar_outcome))
    }

    /// Both the per-version manifest and the jar are present and intact.
    pub async fn check(&self, versions_dir: &Path, folder: &Path) -> bool {
        let Some(jar) = &self.version_jar else {
            return false;
        };
        self.version_manifest.check(versions_dir).await && jar.check(folder).await
    }

    /// File name of the server jar, once known.
    pub fn jar_filename(&self) -> Option<&str> {
        self.version_jar.as_ref().map(|jar| jar.filename())
    }
}

impl std::fmt::Display for MinecraftServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MC server {}", self.version)
    }
}
