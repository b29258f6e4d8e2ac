// ─── Manifest Cache ───
// Keeps the Mojang, Fabric and Quilt manifests on disk and hands out one
// parsed snapshot per run.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::manifest::{LoaderManifest, VersionManifest, VERSION_MANIFEST_URL};
use super::resolver::VersionResolver;
use crate::core::downloader::{Downloader, ResourceLocation};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::fabric::FABRIC_META_VERSIONS;
use crate::core::loaders::quilt::QUILT_META_VERSIONS;
use crate::core::loaders::LoaderKind;

/// Cached manifests older than this are refetched.
pub const STALENESS_THRESHOLD: Duration = Duration::from_secs(6 * 60 * 60);

pub const MINECRAFT_MANIFEST_FILE: &str = "minecraft_manifest.json";
pub const FABRIC_MANIFEST_FILE: &str = "fabric_manifest.json";
pub const QUILT_MANIFEST_FILE: &str = "quilt_manifest.json";

const STAGING_DIR: &str = ".staging";

/// Where the three manifests are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEndpoints {
    pub minecraft: String,
    pub fabric: String,
    pub quilt: String,
}

impl Default for ManifestEndpoints {
    fn default() -> Self {
        Self {
            minecraft: VERSION_MANIFEST_URL.to_string(),
            fabric: FABRIC_META_VERSIONS.to_string(),
            quilt: QUILT_META_VERSIONS.to_string(),
        }
    }
}

impl ManifestEndpoints {
    fn resources(&self) -> [ResourceLocation; 3] {
        [
            ResourceLocation::new(&self.minecraft).with_filename(MINECRAFT_MANIFEST_FILE),
            ResourceLocation::new(&self.fabric).with_filename(FABRIC_MANIFEST_FILE),
            ResourceLocation::new(&self.quilt).with_filename(QUILT_MANIFEST_FILE),
        ]
    }
}

/// "Latest" pointers derived once the manifests are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPointers {
    pub minecraft_release: String,
    pub minecraft_snapshot: String,
    pub fabric_installer: String,
    pub fabric_loader: String,
    pub quilt_installer: String,
    pub quilt_loader: String,
}

/// One consistent view of the three manifests.
#[derive(Debug)]
pub struct ManifestSnapshot {
    pub minecraft: VersionManifest,
    pub fabric: LoaderManifest,
    pub quilt: LoaderManifest,
    pub latest: LatestPointers,
    /// Loaded from disk after a failed refresh.
    pub stale: bool,
}

impl ManifestSnapshot {
    pub fn from_manifests(
        minecraft: VersionManifest,
        fabric: LoaderManifest,
        quilt: LoaderManifest,
        stale: bool,
    ) -> Result<Self, String> {
        let latest_of = |manifest: &LoaderManifest, loader: LoaderKind| {
            let installer = manifest
                .latest_installer()
                .ok_or_else(|| format!("no {loader} installer listed"))?;
            let version = manifest
                .latest_loader()
                .ok_or_else(|| format!("no {loader} loader listed"))?;
            Ok::<_, String>((installer.version.clone(), version.version.clone()))
        };
        let (fabric_installer, fabric_loader) = latest_of(&fabric, LoaderKind::Fabric)?;
        let (quilt_installer, quilt_loader) = latest_of(&quilt, LoaderKind::Quilt)?;

        let latest = LatestPointers {
            minecraft_release: minecraft.latest.release.clone(),
            minecraft_snapshot: minecraft.latest.snapshot.clone(),
            fabric_installer,
            fabric_loader,
            quilt_installer,
            quilt_loader,
        };

        Ok(Self {
            minecraft,
            fabric,
            quilt,
            latest,
            stale,
        })
    }

    pub fn loader_manifest(&self, loader: LoaderKind) -> &LoaderManifest {
        match loader {
            LoaderKind::Fabric => &self.fabric,
            LoaderKind::Quilt => &self.quilt,
        }
    }

    pub fn latest_loader(&self, loader: LoaderKind) -> &str {
        match loader {
            LoaderKind::Fabric => &self.latest.fabric_loader,
            LoaderKind::Quilt => &self.latest.quilt_loader,
        }
    }

    pub fn resolver(&self) -> VersionResolver<'_> {
        VersionResolver::new(self)
    }
}

/// Disk-backed manifest cache. Constructed once per run; the first
/// `ensure_ready` decides between refresh and cache, later calls reuse the
/// same snapshot.
pub struct ManifestCache {
    dir: PathBuf,
    endpoints: ManifestEndpoints,
    snapshot: OnceCell<ManifestSnapshot>,
}

impl ManifestCache {
    pub fn new(dir: PathBuf, endpoints: ManifestEndpoints) -> Self {
        Self {
            dir,
            endpoints,
            snapshot: OnceCell::new(),
        }
    }

    /// Shared cache of per-version manifests.
    pub fn versions_dir(&self) -> PathBuf {
        self.dir.join("versions")
    }

    pub async fn ensure_ready(
        &self,
        downloader: &Downloader,
        refresh: bool,
    ) -> LauncherResult<&ManifestSnapshot> {
        self.snapshot
            .get_or_try_init(|| self.load(downloader, refresh))
            .await
    }

    async fn load(&self, downloader: &Downloader, refresh: bool) -> LauncherResult<ManifestSnapshot> {
        let mut stale = false;

        if let Some(reason) = self.refresh_reason(refresh, SystemTime::now()) {
            info!("Refreshing version manifests ({})", reason);
            if let Err(e) = self.refresh(downloader).await {
                if !self.has_cache() {
                    warn!("Manifest refresh failed: {}", e);
                    return Err(LauncherError::ManifestsUnavailable);
                }
                warn!(
                    "Using cached version manifests as Mojang, FabricMC or QuiltMC manifests are \
                     unreachable ({}); check your internet connection",
                    e
                );
                stale = true;
            }
        } else {
            debug!("Version manifests in {:?} are fresh", self.dir);
        }

        self.read_snapshot(stale).await
    }

    fn has_cache(&self) -> bool {
        self.dir.join(MINECRAFT_MANIFEST_FILE).is_file()
    }

    /// Why the cache must be refetched at `now`, `None` when it is usable as is.
    pub fn refresh_reason(&self, refresh: bool, now: SystemTime) -> Option<&'static str> {
        if refresh {
            return Some("refresh requested");
        }
        let modified = std::fs::metadata(self.dir.join(MINECRAFT_MANIFEST_FILE))
            .and_then(|m| m.modified());
        let Ok(modified) = modified else {
            return Some("no cached manifests");
        };
        // a timestamp in the future counts as brand new
        let age = now.duration_since(modified).unwrap_or_default();
        if age >= STALENESS_THRESHOLD {
            return Some("cached manifests are older than 6 hours");
        }
        None
    }

    /// Fetch all three manifests into a staging folder and move them into
    /// place only once every one of them arrived and parsed.
    async fn refresh(&self, downloader: &Downloader) -> LauncherResult<()> {
        let staging = self.dir.join(STAGING_DIR);
        if staging.exists() {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(LauncherError::io(&staging))?;
        }

        let staged = self.stage(downloader, &staging).await;
        if let Err(e) = staged {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        tokio::fs::create_dir_all(self.versions_dir())
            .await
            .map_err(LauncherError::io(self.versions_dir()))?;
        for file in [MINECRAFT_MANIFEST_FILE, FABRIC_MANIFEST_FILE, QUILT_MANIFEST_FILE] {
            let target = self.dir.join(file);
            tokio::fs::rename(staging.join(file), &target)
                .await
                .map_err(LauncherError::io(&target))?;
        }
        let _ = tokio::fs::remove_dir_all(&staging).await;

        info!("Version manifests refreshed");
        Ok(())
    }

    async fn stage(&self, downloader: &Downloader, staging: &Path) -> LauncherResult<()> {
        for mut resource in self.endpoints.resources() {
            resource.download(downloader, staging, true, false).await?;
        }
        // reject anything that is not a manifest (captive portals, error pages)
        read_json::<VersionManifest>(&staging.join(MINECRAFT_MANIFEST_FILE)).await?;
        read_json::<LoaderManifest>(&staging.join(FABRIC_MANIFEST_FILE)).await?;
        read_json::<LoaderManifest>(&staging.join(QUILT_MANIFEST_FILE)).await?;
        Ok(())
    }

    async fn read_snapshot(&self, stale: bool) -> LauncherResult<ManifestSnapshot> {
        let minecraft = read_json(&self.dir.join(MINECRAFT_MANIFEST_FILE)).await?;
        let fabric = read_json(&self.dir.join(FABRIC_MANIFEST_FILE)).await?;
        let quilt = read_json(&self.dir.join(QUILT_MANIFEST_FILE)).await?;

        let snapshot = ManifestSnapshot::from_manifests(minecraft, fabric, quilt, stale).map_err(
            |reason| LauncherError::CorruptManifestCache {
                path: self.dir.clone(),
                reason,
            },
        )?;

        info!(
            "Loaded {} Minecraft versions (latest release {}, snapshot {})",
            snapshot.minecraft.versions.len(),
            snapshot.latest.minecraft_release,
            snapshot.latest.minecraft_snapshot
        );
        Ok(snapshot)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> LauncherResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LauncherError::CorruptManifestCache {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    serde_json::from_str(&raw).map_err(|e| LauncherError::CorruptManifestCache {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
