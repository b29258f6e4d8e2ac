use std::path::Path;

pub const FABRIC_META_VERSIONS: &str = "https://meta.fabricmc.net/v2/versions";

pub const SERVER_LAUNCH_JAR: &str = "fabric-server-launch.jar";

/// `install server <mc> <loader> -dir=<folder>`
pub fn installer_args(minecraft_version: &str, loader_version: &str, install_dir: &Path) -> Vec<String> {
    vec![
        "install".to_string(),
        "server".to_string(),
        minecraft_version.to_string(),
        loader_version.to_string(),
        format!("-dir={}", install_dir.display()),
    ]
}
