use std::path::Path;

pub const QUILT_META_VERSIONS: &str = "https://meta.quiltmc.org/v3/versions";

pub const SERVER_LAUNCH_JAR: &str = "quilt-server-launch.jar";

/// `install server <mc> <loader> --install-dir=<folder>`
pub fn installer_args(minecraft_version: &str, loader_version: &str, install_dir: &Path) -> Vec<String> {
    vec![
        "install".to_string(),
        "server".to_string(),
        minecraft_version.to_string(),
        loader_version.to_string(),
        format!("--install-dir={}", install_dir.display()),
    ]
}
