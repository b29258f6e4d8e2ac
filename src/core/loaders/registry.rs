use tracing::{debug, info, warn};

use super::context::InstallContext;
use super::LoaderKind;
use crate::core::downloader::{Downloader, ResourceLocation};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::LauncherConfig;
use crate::core::version::ManifestSnapshot;

/// Installer jar for `loader`: the registered one while the loader manifest
/// still lists it, else the loader's latest installer, which is registered on
/// the way.
pub async fn installer_for(
    ctx: &InstallContext<'_>,
    snapshot: &ManifestSnapshot,
    loader: LoaderKind,
) -> LauncherResult<ResourceLocation> {
    let manifest = snapshot.loader_manifest(loader);
    let config = LauncherConfig::load(&ctx.config_path).await?;
    if let Some(installer) = config.mod_loaders.get(&loader) {
        if manifest.lists_installer(&installer.url) {
            debug!("Using registered {} installer {}", loader, installer);
            return Ok(installer.clone());
        }
        info!(
            "Registered {} installer {} is no longer published, replacing it",
            loader, installer
        );
    }

    let candidate = latest_installer(ctx.downloader, snapshot, loader).await?;
    let (_, installer) = LauncherConfig::update(&ctx.config_path, |config| {
        // another run may have registered a listed one while we were probing
        let slot = config.mod_loaders.entry(loader).or_insert_with(|| candidate.clone());
        if !manifest.lists_installer(&slot.url) {
            *slot = candidate;
        }
        Ok(slot.clone())
    })
    .await?;

    info!("Registered {} installer {}", loader, installer);
    Ok(installer)
}

async fn latest_installer(
    downloader: &Downloader,
    snapshot: &ManifestSnapshot,
    loader: LoaderKind,
) -> LauncherResult<ResourceLocation> {
    let entry = snapshot
        .loader_manifest(loader)
        .latest_installer()
        .ok_or_else(|| LauncherError::Other(format!("no {loader} installer listed")))?;

    let mut installer = ResourceLocation::new(&entry.url);
    if let Some(sha1) = probe_sha1_sidecar(downloader, &entry.url).await {
        installer = installer.with_sha1(sha1);
    }
    Ok(installer)
}

/// Maven repositories publish `<artifact>.sha1` next to each artifact.
async fn probe_sha1_sidecar(downloader: &Downloader, url: &str) -> Option<String> {
    let sidecar = format!("{url}.sha1");
    match downloader.fetch_text(&sidecar).await {
        Ok(Some(body)) => parse_sha1_sidecar(&body),
        Ok(None) => {
            debug!("No checksum published at {}", sidecar);
            None
        }
        Err(e) => {
            warn!("Could not fetch {}: {}", sidecar, e);
            None
        }
    }
}

/// The digest is the first token; some repositories append the file name.
fn parse_sha1_sidecar(body: &str) -> Option<String> {
    let digest = body.split_whitespace().next()?;
    (digest.len() == 40 && digest.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| digest.to_ascii_lowercase())
}
