use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::context::InstallContext;
use super::{registry, vanilla, LoaderKind};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{ManifestSnapshot, MinecraftServerVersion};

/// Turns resolved versions into files on disk: vanilla server jars and the
/// output of the mod loader installers.
pub struct InstallationPlanner<'a> {
    snapshot: &'a ManifestSnapshot,
    ctx: InstallContext<'a>,
}

impl<'a> InstallationPlanner<'a> {
    pub fn new(snapshot: &'a ManifestSnapshot, ctx: InstallContext<'a>) -> Self {
        Self { snapshot, ctx }
    }

    pub fn snapshot(&self) -> &'a ManifestSnapshot {
        self.snapshot
    }

    pub fn context(&self) -> &InstallContext<'a> {
        &self.ctx
    }

    /// Fetch the per-version manifest into the shared versions cache and the
    /// server jar it names into `destination`. A correct jar already in place
    /// is left alone unless `force` is set.
    pub async fn plan_and_fetch_server_jar(
        &self,
        minecraft_version: &str,
        destination: &Path,
        force: bool,
    ) -> LauncherResult<MinecraftServerVersion> {
        vanilla::fetch_server_jar(&self.ctx, self.snapshot, minecraft_version, destination, force)
            .await
    }

    /// Fetch the loader's installer into the shared installers directory and
    /// run it against `destination`.
    pub async fn install_mod_loader(
        &self,
        loader: LoaderKind,
        minecraft_version: &str,
        loader_version: &str,
        destination: &Path,
    ) -> LauncherResult<()> {
        let mut installer = registry::installer_for(&self.ctx, self.snapshot, loader).await?;
        installer
            .download(self.ctx.downloader, &self.ctx.installers_dir, false, true)
            .await?;
        let installer_path = installer.path_in(&self.ctx.installers_dir);

        tokio::fs::create_dir_all(destination)
            .await
            .map_err(LauncherError::io(destination))?;

        let args = loader.installer_args(minecraft_version, loader_version, destination);
        info!(
            "Installing {} {} for Minecraft {} into {:?}",
            loader, loader_version, minecraft_version, destination
        );
        debug!("{:?} -jar {:?} {}", self.ctx.java, installer_path, args.join(" "));

        let output = Command::new(&self.ctx.java)
            .arg("-jar")
            .arg(&installer_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                LauncherError::JavaExecution(format!("{}: {}", self.ctx.java.display(), e))
            })?;

        if !output.status.success() {
            warn!(
                "{} installer output:\nSTDOUT:\n{}\nSTDERR:\n{}",
                loader,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(LauncherError::InstallerFailure {
                loader,
                code: output.status.code(),
            });
        }

        info!("{} {} installed", loader, loader_version);
        Ok(())
    }
}
