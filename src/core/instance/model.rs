use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::downloader::ResourceLocation;
use crate::core::loaders::LoaderKind;
use crate::core::version::MinecraftServerVersion;

pub const INSTANCE_CONFIG_FILE: &str = "config.json";

fn default_server_args() -> Vec<String> {
    vec!["-nogui".to_string()]
}

/// One server instance, persisted as `<folder>/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub folder: PathBuf,
    pub minecraft_version: String,
    /// Resolved vanilla server, filled in by the first install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<MinecraftServerVersion>,
    #[serde(default)]
    pub snapshots: bool,
    /// Replaces the vanilla jar and any mod loader when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_jar: Option<ResourceLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_loader: Option<LoaderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_loader_version: Option<String>,
    #[serde(default)]
    pub mod_loader_installed: bool,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub java_args: Vec<String>,
    #[serde(default = "default_server_args")]
    pub server_args: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl InstanceConfig {
    pub fn new(name: String, folder: PathBuf, minecraft_version: String, snapshots: bool) -> Self {
        Self {
            name,
            folder,
            minecraft_version,
            server: None,
            snapshots,
            custom_jar: None,
            mod_loader: None,
            mod_loader_version: None,
            mod_loader_installed: false,
            installed: false,
            java_args: Vec::new(),
            server_args: default_server_args(),
            created_at: Utc::now(),
        }
    }

    pub fn with_mod_loader(mut self, loader: LoaderKind, version: Option<String>) -> Self {
        self.mod_loader = Some(loader);
        self.mod_loader_version = version;
        self
    }

    /// `instances/<name with spaces as underscores>`, or `requested` when
    /// given; relative folders live under `instances_dir`.
    pub fn resolve_folder(instances_dir: &Path, name: &str, requested: Option<&Path>) -> PathBuf {
        let folder = match requested {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(name.replace(' ', "_")),
        };
        if folder.is_absolute() {
            folder
        } else {
            instances_dir.join(folder)
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.folder.join(INSTANCE_CONFIG_FILE)
    }

    /// Forget install progress after a version or loader change.
    pub fn reset_install(&mut self) {
        self.installed = false;
        self.mod_loader_installed = false;
        self.server = None;
    }

    /// Jar started by `java -jar`, relative to the instance folder.
    pub fn launch_jar(&self) -> Option<String> {
        if let Some(jar) = &self.custom_jar {
            return Some(jar.filename().to_string());
        }
        if let Some(loader) = self.mod_loader {
            return Some(loader.server_launch_jar().to_string());
        }
        self.server
            .as_ref()
            .and_then(|server| server.jar_filename())
            .map(str::to_string)
    }

    /// `1.20.4`, `1.20.4 + quilt 0.23.1`, `custom server.jar`.
    pub fn describe(&self) -> String {
        if let Some(jar) = &self.custom_jar {
            return format!("custom {}", jar.filename());
        }
        match (self.mod_loader, &self.mod_loader_version) {
            (Some(loader), Some(version)) => {
                format!("{} + {} {}", self.minecraft_version, loader, version)
            }
            (Some(loader), None) => format!("{} + {}", self.minecraft_version, loader),
            (None, _) => self.minecraft_version.clone(),
        }
    }
}
