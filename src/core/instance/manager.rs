use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::model::{InstanceConfig, INSTANCE_CONFIG_FILE};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::InstallationPlanner;
use crate::core::state::LauncherConfig;

const EULA_FILE: &str = "eula.txt";

/// Manages the lifecycle of instances on disk.
///
/// Instance folders hold their own `config.json`; `launcher.json` maps each
/// instance name to its folder.
pub struct InstanceManager {
    /// Default parent of instance folders.
    instances_dir: PathBuf,
    registry_path: PathBuf,
}

impl InstanceManager {
    pub fn new(instances_dir: PathBuf, registry_path: PathBuf) -> Self {
        Self {
            instances_dir,
            registry_path,
        }
    }

    pub fn instances_dir(&self) -> &Path {
        &self.instances_dir
    }

    /// Create the instance folder, write its config and register it.
    pub async fn create(&self, instance: &InstanceConfig) -> LauncherResult<()> {
        if tokio::fs::try_exists(instance.config_path())
            .await
            .unwrap_or(false)
        {
            return Err(LauncherError::InstanceAlreadyExists(format!(
                "{} (folder {:?} is already in use)",
                instance.name, instance.folder
            )));
        }

        let name = instance.name.clone();
        let folder = instance.folder.clone();
        LauncherConfig::update(&self.registry_path, |config| {
            if config.instances.contains_key(&name) {
                return Err(LauncherError::InstanceAlreadyExists(name.clone()));
            }
            config.instances.insert(name.clone(), folder.clone());
            Ok(())
        })
        .await?;

        if let Err(e) = self.save(instance).await {
            // roll the registration back so the name can be reused
            let _ = self.unregister(&instance.name).await;
            return Err(e);
        }

        info!("Created instance '{}' in {:?}", instance.name, instance.folder);
        Ok(())
    }

    /// Save instance metadata to disk.
    pub async fn save(&self, instance: &InstanceConfig) -> LauncherResult<()> {
        tokio::fs::create_dir_all(&instance.folder)
            .await
            .map_err(LauncherError::io(&instance.folder))?;

        let json = serde_json::to_string_pretty(instance)?;
        let config_path = instance.config_path();
        tokio::fs::write(&config_path, json)
            .await
            .map_err(LauncherError::io(&config_path))?;

        debug!("Saved {:?}", config_path);
        Ok(())
    }

    /// Load a single instance by name.
    pub async fn load(&self, name: &str) -> LauncherResult<InstanceConfig> {
        let registry = LauncherConfig::load(&self.registry_path).await?;
        let folder = registry
            .instances
            .get(name)
            .ok_or_else(|| LauncherError::InstanceNotFound(name.to_string()))?;
        read_instance(name, folder).await
    }

    /// All registered instances; unreadable ones are skipped with a warning.
    pub async fn list(&self) -> LauncherResult<Vec<InstanceConfig>> {
        let registry = LauncherConfig::load(&self.registry_path).await?;
        let mut instances = Vec::with_capacity(registry.instances.len());

        for (name, folder) in &registry.instances {
            match read_instance(name, folder).await {
                Ok(instance) => instances.push(instance),
                Err(e) => warn!("Skipping instance '{}': {}", name, e),
            }
        }

        Ok(instances)
    }

    /// Unregister an instance and delete its folder.
    pub async fn delete(&self, name: &str) -> LauncherResult<()> {
        let folder = self.unregister(name).await?;
        if tokio::fs::try_exists(&folder).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&folder)
                .await
                .map_err(LauncherError::io(&folder))?;
        }

        info!("Deleted instance '{}' ({:?})", name, folder);
        Ok(())
    }

    pub async fn rename(&self, instance: &mut InstanceConfig, new_name: &str) -> LauncherResult<()> {
        let old_name = instance.name.clone();
        LauncherConfig::update(&self.registry_path, |config| {
            if config.instances.contains_key(new_name) {
                return Err(LauncherError::InstanceAlreadyExists(new_name.to_string()));
            }
            let folder = config
                .instances
                .remove(&old_name)
                .ok_or_else(|| LauncherError::InstanceNotFound(old_name.clone()))?;
            config.instances.insert(new_name.to_string(), folder);
            Ok(())
        })
        .await?;

        instance.name = new_name.to_string();
        self.save(instance).await?;
        info!("Renamed instance '{}' to '{}'", old_name, new_name);
        Ok(())
    }

    /// Move the instance folder and point the registry at the new place.
    pub async fn move_to(&self, instance: &mut InstanceConfig, destination: PathBuf) -> LauncherResult<()> {
        if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(LauncherError::Other(format!(
                "{:?} already exists, refusing to move '{}' there",
                destination, instance.name
            )));
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LauncherError::io(parent))?;
        }
        tokio::fs::rename(&instance.folder, &destination)
            .await
            .map_err(LauncherError::io(&instance.folder))?;

        let name = instance.name.clone();
        let new_folder = destination.clone();
        LauncherConfig::update(&self.registry_path, |config| {
            config.instances.insert(name, new_folder);
            Ok(())
        })
        .await?;

        info!("Moved instance '{}' from {:?} to {:?}", instance.name, instance.folder, destination);
        instance.folder = destination;
        self.save(instance).await
    }

    /// Bring the instance folder to a runnable state.
    pub async fn install(
        &self,
        instance: &mut InstanceConfig,
        planner: &InstallationPlanner<'_>,
        force: bool,
    ) -> LauncherResult<()> {
        let snapshot = planner.snapshot();
        let resolver = snapshot.resolver();

        if !resolver.validate_minecraft_version(&instance.minecraft_version) {
            return Err(LauncherError::invalid_version(
                &instance.minecraft_version,
                "minecraft",
            ));
        }
        if let (Some(loader), Some(version)) = (instance.mod_loader, &instance.mod_loader_version) {
            if !resolver.validate_loader_version(loader, version) {
                return Err(LauncherError::invalid_version(version.as_str(), loader));
            }
        }
        if let Some(loader) = instance.mod_loader {
            if instance.mod_loader_version.is_none() {
                instance.mod_loader_version = Some(snapshot.latest_loader(loader).to_string());
                self.save(instance).await?;
            }
        }

        if let Some(custom_jar) = instance.custom_jar.as_mut() {
            let outcome = custom_jar
                .download(planner.context().downloader, &instance.folder, force, true)
                .await?;
            debug!("Custom jar {}: {:?}", custom_jar, outcome);
        } else {
            let server = planner
                .plan_and_fetch_server_jar(&instance.minecraft_version, &instance.folder, force)
                .await?;
            instance.server = Some(server);
            self.save(instance).await?;

            if let (Some(loader), Some(version)) =
                (instance.mod_loader, instance.mod_loader_version.clone())
            {
                planner
                    .install_mod_loader(loader, &instance.minecraft_version, &version, &instance.folder)
                    .await?;
                instance.mod_loader_installed = true;
                self.save(instance).await?;
            }
        }

        accept_eula(&instance.folder).await?;
        instance.installed = true;
        self.save(instance).await?;
        info!("Instance '{}' installed ({})", instance.name, instance.describe());
        Ok(())
    }

    async fn unregister(&self, name: &str) -> LauncherResult<PathBuf> {
        let (_, folder) = LauncherConfig::update(&self.registry_path, |config| {
            config
                .instances
                .remove(name)
                .ok_or_else(|| LauncherError::InstanceNotFound(name.to_string()))
        })
        .await?;
        Ok(folder)
    }
}

async fn read_instance(name: &str, folder: &Path) -> LauncherResult<InstanceConfig> {
    let config_path = folder.join(INSTANCE_CONFIG_FILE);
    let json = match tokio::fs::read_to_string(&config_path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LauncherError::InstanceNotFound(format!(
                "{} (no {:?})",
                name, config_path
            )))
        }
        Err(source) => {
            return Err(LauncherError::Io {
                path: config_path,
                source,
            })
        }
    };
    Ok(serde_json::from_str(&json)?)
}

/// Write `eula=true` unless the folder already has an `eula.txt`.
pub async fn accept_eula(folder: &Path) -> LauncherResult<()> {
    let eula = folder.join(EULA_FILE);
    match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&eula)
        .await
    {
        Ok(mut file) => {
            file.write_all(b"eula=true\n")
                .await
                .map_err(LauncherError::io(&eula))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(LauncherError::Io { path: eula, source }),
    }
}
