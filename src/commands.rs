use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::{Change, CreateArgs};
use crate::core::downloader::{sha1_file, ResourceLocation};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::{InstanceConfig, InstanceManager};
use crate::core::java;
use crate::core::launch;
use crate::core::loaders::LoaderKind;
use crate::core::state::{AppState, LauncherConfig};

fn instance_manager(state: &AppState) -> InstanceManager {
    InstanceManager::new(state.paths.instances_dir(), state.paths.config_path())
}

pub async fn find_java(state: &mut AppState) -> LauncherResult<()> {
    let installation = java::detect_java().await?;
    let java_path = installation.path.clone();
    LauncherConfig::update(&state.paths.config_path(), |config| {
        config.java_path = Some(java_path);
        Ok(())
    })
    .await?;
    state.reload_config().await?;

    println!(
        "Using Java {} (major {}) at {}",
        installation.version,
        installation.major,
        installation.path.display()
    );
    Ok(())
}

pub async fn list_instances(state: &AppState) -> LauncherResult<()> {
    let instances = instance_manager(state).list().await?;
    if instances.is_empty() {
        println!("No instances yet, create one with \"create\"");
        return Ok(());
    }

    for instance in instances {
        println!(
            "{:<24} {:<32} {}",
            instance.name,
            instance.describe(),
            if instance.installed { "installed" } else { "not installed" }
        );
    }
    Ok(())
}

pub async fn show_versions(state: &AppState, snapshots: bool) -> LauncherResult<()> {
    let snapshot = state.snapshot().await?;
    let latest = &snapshot.latest;

    println!("Minecraft release:  {}", latest.minecraft_release);
    if snapshots {
        println!("Minecraft snapshot: {}", latest.minecraft_snapshot);
    }
    println!(
        "Fabric loader:      {} (installer {})",
        latest.fabric_loader, latest.fabric_installer
    );
    println!(
        "Quilt loader:       {} (installer {})",
        latest.quilt_loader, latest.quilt_installer
    );
    if snapshot.stale {
        println!("(manifests could not be refreshed, these may be out of date)");
    }
    Ok(())
}

pub async fn create_instance(state: &AppState, args: CreateArgs) -> LauncherResult<()> {
    let snapshot = state.snapshot().await?;
    let resolver = snapshot.resolver();

    let mut words = args.words;
    let mut requested_version = args.version;
    if requested_version.is_none() {
        if let Some(index) = words
            .iter()
            .position(|word| resolver.validate_minecraft_version(word))
        {
            requested_version = Some(words.remove(index));
        }
    }
    let minecraft_version =
        resolver.resolve_minecraft_version(requested_version.as_deref(), args.snapshot)?;

    let loader = match (args.fabric, args.quilt, args.mod_loader) {
        (Some(version), _, _) => Some((LoaderKind::Fabric, Some(version))),
        (_, Some(version), _) => Some((LoaderKind::Quilt, Some(version))),
        (_, _, Some(name)) => Some((name.parse::<LoaderKind>()?, args.mod_loader_version)),
        _ => None,
    };

    let name = if words.is_empty() {
        minecraft_version.clone()
    } else {
        words.join(" ")
    };

    let manager = instance_manager(state);
    let folder =
        InstanceConfig::resolve_folder(manager.instances_dir(), &name, args.folder.as_deref());
    let mut instance = InstanceConfig::new(name, folder, minecraft_version, args.snapshot);
    if let Some((loader, requested)) = loader {
        let version = resolver.resolve_loader_version(loader, requested.as_deref())?;
        instance = instance.with_mod_loader(loader, Some(version));
    }

    manager.create(&instance).await?;
    println!(
        "Created '{}' ({}) in {}",
        instance.name,
        instance.describe(),
        instance.folder.display()
    );
    Ok(())
}

pub async fn show_instance(state: &AppState, name: &str) -> LauncherResult<()> {
    let instance = instance_manager(state).load(name).await?;

    println!("name:               {}", instance.name);
    println!("folder:             {}", instance.folder.display());
    println!("minecraft version:  {}", instance.minecraft_version);
    if let Some(loader) = instance.mod_loader {
        println!(
            "mod loader:         {} {}",
            loader,
            instance.mod_loader_version.as_deref().unwrap_or("(latest)")
        );
    }
    if let Some(jar) = &instance.custom_jar {
        println!("custom jar:         {}", jar);
    }
    println!("java args:          {}", instance.java_args.join(" "));
    println!("server args:        {}", instance.server_args.join(" "));
    println!("installed:          {}", instance.installed);
    println!("created:            {}", instance.created_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}

pub async fn remove_instance(state: &AppState, name: &str, yes: bool) -> LauncherResult<()> {
    let manager = instance_manager(state);
    let instance = manager.load(name).await?;

    if !yes {
        print!(
            "This deletes {} and everything in it. Type the instance name to confirm: ",
            instance.folder.display()
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if answer.trim() != instance.name {
            println!("Names do not match, nothing was deleted");
            return Ok(());
        }
    }

    manager.delete(name).await?;
    println!("Removed '{}'", name);
    Ok(())
}

pub async fn install_instance(state: &AppState, name: &str, force: bool) -> LauncherResult<()> {
    let manager = instance_manager(state);
    let mut instance = manager.load(name).await?;
    let planner = state.planner().await?;

    manager.install(&mut instance, &planner, force).await?;
    println!("'{}' is installed", instance.name);
    Ok(())
}

pub async fn run_instance(state: &AppState, name: &str) -> LauncherResult<()> {
    let manager = instance_manager(state);
    let mut instance = manager.load(name).await?;

    if !instance.installed {
        info!("'{}' is not installed yet, installing first", instance.name);
        let planner = state.planner().await?;
        manager.install(&mut instance, &planner, false).await?;
    }

    let java_bin = state.config.java_binary();
    if let Some(server) = &instance.server {
        launch::check_java(&java_bin, &state.manifests.versions_dir(), server).await;
    }
    launch::launch(&instance, &java_bin).await
}

pub async fn modify_instance(state: &AppState, name: &str, change: Change) -> LauncherResult<()> {
    let manager = instance_manager(state);
    let mut instance = manager.load(name).await?;

    match change {
        Change::Name { new_name } => {
            manager.rename(&mut instance, &new_name).await?;
            println!("Renamed '{}' to '{}'", name, new_name);
            return Ok(());
        }
        Change::Move { folder } => {
            let destination =
                InstanceConfig::resolve_folder(manager.instances_dir(), &instance.name, Some(folder.as_path()));
            manager.move_to(&mut instance, destination).await?;
            println!("Moved '{}' to {}", instance.name, instance.folder.display());
            return Ok(());
        }
        Change::MinecraftVersion { version } => {
            let snapshot = state.snapshot().await?;
            instance.minecraft_version = snapshot
                .resolver()
                .resolve_minecraft_version(Some(version.as_str()), instance.snapshots)?;
            instance.reset_install();
        }
        Change::LoaderVersion { version } => {
            let loader = instance.mod_loader.ok_or_else(|| {
                LauncherError::Other(format!("'{}' has no mod loader", instance.name))
            })?;
            let snapshot = state.snapshot().await?;
            instance.mod_loader_version =
                Some(snapshot.resolver().resolve_loader_version(loader, Some(version.as_str()))?);
            instance.reset_install();
        }
        Change::Loader { loader } => {
            instance.mod_loader = if loader.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(loader.parse::<LoaderKind>()?)
            };
            instance.mod_loader_version = None;
            instance.reset_install();
        }
        Change::CustomJar { path, sha1 } => {
            instance.custom_jar = if path.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(custom_jar(&path, sha1).await?)
            };
            instance.reset_install();
        }
        Change::JavaArgs { args } => instance.java_args = args,
        Change::ServerArgs { args } => instance.server_args = args,
    }

    manager.save(&instance).await?;
    println!("Updated '{}' ({})", instance.name, instance.describe());
    Ok(())
}

/// A local jar is referenced by absolute path and hashed unless a digest is
/// given; a remote one is taken as is.
async fn custom_jar(path: &str, sha1: Option<String>) -> LauncherResult<ResourceLocation> {
    let mut jar = ResourceLocation::new(path);
    if !jar.is_remote() {
        let local = PathBuf::from(path);
        let absolute = tokio::fs::canonicalize(&local)
            .await
            .map_err(LauncherError::io(&local))?;
        jar = ResourceLocation::new(absolute.to_string_lossy());
    }

    let sha1 = match sha1 {
        Some(sha1) => Some(sha1),
        None if jar.is_remote() => {
            warn!("No SHA-1 given for {}, it will not be verified", jar);
            None
        }
        None => Some(sha1_file(std::path::Path::new(&jar.url)).await?),
    };
    if let Some(sha1) = sha1 {
        jar = jar.with_sha1(sha1);
    }
    Ok(jar)
}
