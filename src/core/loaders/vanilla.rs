use std::path::Path;

use tracing::{debug, info};

use super::context::InstallContext;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{ManifestSnapshot, MinecraftServerVersion};

/// Resolve `minecraft_version` against the cached manifest and fetch its
/// server jar into `destination`.
pub async fn fetch_server_jar(
    ctx: &InstallContext<'_>,
    snapshot: &ManifestSnapshot,
    minecraft_version: &str,
    destination: &Path,
    force: bool,
) -> LauncherResult<MinecraftServerVersion> {
    let entry = snapshot
        .minecraft
        .find_version(minecraft_version)
        .ok_or_else(|| LauncherError::invalid_version(minecraft_version, "minecraft"))?;

    let mut server = MinecraftServerVersion::from_entry(entry);
    let (manifest, jar) = server
        .download(ctx.downloader, &ctx.versions_dir, destination, force, true)
        .await?;

    if jar.performed() {
        info!(
            "Fetched {} ({} bytes) into {:?}",
            server,
            jar.bytes_transferred(),
            destination
        );
    } else {
        info!("{} already present in {:?}", server, destination);
    }
    if manifest.performed() {
        debug!("Cached version manifest for {}", server.version);
    }

    Ok(server)
}
