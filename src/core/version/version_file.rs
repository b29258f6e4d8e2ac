// ─── Version File ───
// Per-version Mojang JSON, read for its server download.

use std::path::Path;

use serde::Deserialize;

use crate::core::downloader::ResourceLocation;
use crate::core::error::{LauncherError, LauncherResult};

/// The parts of a Mojang version JSON a server install cares about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub version_type: Option<String>,
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub major_version: u32,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

impl From<&DownloadArtifact> for ResourceLocation {
    fn from(artifact: &DownloadArtifact) -> Self {
        ResourceLocation::new(&artifact.url)
            .with_sha1(&artifact.sha1)
            .with_size(artifact.size)
    }
}

impl VersionJson {
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(LauncherError::io(path))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `downloads.server` as a resource, if this version ships a server.
    pub fn server_resource(&self) -> Option<ResourceLocation> {
        self.downloads
            .as_ref()
            .and_then(|d| d.server.as_ref())
            .map(ResourceLocation::from)
    }

    /// Java major version the server needs, 8 for versions that predate the field.
    pub fn required_java_major(&self) -> u32 {
        self.java_version
            .as_ref()
            .map(|j| j.major_version)
            .unwrap_or(8)
    }
}
