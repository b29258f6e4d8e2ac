// ─── Version Manifest ───
// Mojang version manifest v2 and the Fabric/Quilt meta "versions" documents.

use serde::Deserialize;

pub const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub compliance_level: Option<u32>,
    #[serde(default)]
    pub release_time: Option<String>,
}

impl VersionManifest {
    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }
}

/// Fabric and Quilt publish the same shape; Quilt has no `stable` flag and
/// lists newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderManifest {
    #[serde(default)]
    pub installer: Vec<InstallerEntry>,
    #[serde(default)]
    pub loader: Vec<LoaderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerEntry {
    pub url: String,
    pub version: String,
    #[serde(default)]
    pub maven: Option<String>,
    #[serde(default)]
    pub stable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderEntry {
    pub version: String,
    #[serde(default)]
    pub maven: Option<String>,
    #[serde(default)]
    pub build: Option<u64>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub stable: Option<bool>,
}

impl LoaderManifest {
    /// First installer flagged stable; entries without a flag count as stable.
    pub fn latest_installer(&self) -> Option<&InstallerEntry> {
        self.installer.iter().find(|i| i.stable.unwrap_or(true))
    }

    pub fn lists_installer(&self, url: &str) -> bool {
        self.installer.iter().any(|i| i.url == url)
    }

    /// First loader flagged stable; entries without a flag count as stable.
    pub fn latest_loader(&self) -> Option<&LoaderEntry> {
        self.loader.iter().find(|l| l.stable.unwrap_or(true))
    }

    pub fn find_loader(&self, version: &str) -> Option<&LoaderEntry> {
        self.loader.iter().find(|l| l.version == version)
    }
}
