use tracing::debug;

use super::cache::ManifestSnapshot;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::LoaderKind;

/// Keyword that always means "whatever is newest".
pub const LATEST: &str = "latest";

/// Resolves user supplied version strings against one manifest snapshot.
///
/// Unknown Minecraft ids are refused instead of falling back to the latest
/// release; a typo must never silently install a different version.
#[derive(Clone, Copy)]
pub struct VersionResolver<'a> {
    snapshot: &'a ManifestSnapshot,
}

impl<'a> VersionResolver<'a> {
    pub fn new(snapshot: &'a ManifestSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn resolve_minecraft_version(
        &self,
        requested: Option<&str>,
        allow_snapshots: bool,
    ) -> LauncherResult<String> {
        match requested {
            Some(id) if self.snapshot.minecraft.find_version(id).is_some() => Ok(id.to_string()),
            Some(id) if !id.eq_ignore_ascii_case(LATEST) => {
                Err(LauncherError::invalid_version(id, "minecraft"))
            }
            _ => {
                let latest = if allow_snapshots {
                    &self.snapshot.latest.minecraft_snapshot
                } else {
                    &self.snapshot.latest.minecraft_release
                };
                debug!("Using latest Minecraft version {}", latest);
                Ok(latest.clone())
            }
        }
    }

    pub fn resolve_loader_version(
        &self,
        loader: LoaderKind,
        requested: Option<&str>,
    ) -> LauncherResult<String> {
        let manifest = self.snapshot.loader_manifest(loader);
        match requested {
            Some(version) if manifest.find_loader(version).is_some() => Ok(version.to_string()),
            Some(version) if !version.eq_ignore_ascii_case(LATEST) => {
                Err(LauncherError::invalid_version(version, loader))
            }
            _ => {
                let latest = self.snapshot.latest_loader(loader);
                debug!("Using latest {} loader {}", loader, latest);
                Ok(latest.to_string())
            }
        }
    }

    pub fn validate_minecraft_version(&self, version: &str) -> bool {
        self.resolve_minecraft_version(Some(version), true).is_ok()
    }

    pub fn validate_loader_version(&self, loader: LoaderKind, version: &str) -> bool {
        self.resolve_loader_version(loader, Some(version)).is_ok()
    }
}
