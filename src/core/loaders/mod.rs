pub mod context;
pub mod fabric;
pub mod installer;
pub mod quilt;
pub mod registry;
pub mod vanilla;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::LauncherError;

pub use context::InstallContext;
pub use installer::InstallationPlanner;

/// Supported mod loaders, strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Fabric,
    Quilt,
}

impl LoaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderKind::Fabric => "fabric",
            LoaderKind::Quilt => "quilt",
        }
    }

    /// Arguments passed to the loader's installer jar after `-jar <installer>`.
    pub fn installer_args(
        &self,
        minecraft_version: &str,
        loader_version: &str,
        install_dir: &std::path::Path,
    ) -> Vec<String> {
        match self {
            LoaderKind::Fabric => fabric::installer_args(minecraft_version, loader_version, install_dir),
            LoaderKind::Quilt => quilt::installer_args(minecraft_version, loader_version, install_dir),
        }
    }

    /// Jar the loader's installer leaves in the instance folder for launching.
    pub fn server_launch_jar(&self) -> &'static str {
        match self {
            LoaderKind::Fabric => fabric::SERVER_LAUNCH_JAR,
            LoaderKind::Quilt => quilt::SERVER_LAUNCH_JAR,
        }
    }
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoaderKind {
    type Err = LauncherError;

    /// Accepts `fabric`/`quilt` in any case, with or without an `mc` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.strip_suffix("mc").unwrap_or(&lower) {
            "fabric" => Ok(LoaderKind::Fabric),
            "quilt" => Ok(LoaderKind::Quilt),
            _ => Err(LauncherError::UnknownLoader(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_loaders_only() {
        assert_eq!("fabric".parse::<LoaderKind>().unwrap(), LoaderKind::Fabric);
        assert_eq!("QuiltMC".parse::<LoaderKind>().unwrap(), LoaderKind::Quilt);
        assert_eq!("FabricMC".parse::<LoaderKind>().unwrap(), LoaderKind::Fabric);
        assert!(matches!(
            "forge".parse::<LoaderKind>(),
            Err(LauncherError::UnknownLoader(name)) if name == "forge"
        ));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LoaderKind::Quilt).unwrap(), r#""quilt""#);
        let parsed: LoaderKind = serde_json::from_str(r#""fabric""#).unwrap();
        assert_eq!(parsed, LoaderKind::Fabric);
    }
}
