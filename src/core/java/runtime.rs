use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::core::error::{LauncherError, LauncherResult};

/// Java binary used when the launcher configuration names none.
pub const DEFAULT_JAVA: &str = "java";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaInstallation {
    pub path: PathBuf,
    pub version: String,
    pub major: u32,
}

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// First `java` executable on `PATH`.
pub fn find_java_on_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_java_in(std::env::split_paths(&path_var))
}

fn find_java_in(dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(java_exe()))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run `<java> -version` and read the version it reports.
#[instrument]
pub async fn probe_java(path: &Path) -> LauncherResult<JavaInstallation> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .await
        .map_err(|e| LauncherError::JavaExecution(format!("{}: {}", path.display(), e)))?;

    // `java -version` prints to stderr; some wrappers use stdout.
    let version_output = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );
    debug!(
        "Probing {:?}: {}",
        path,
        version_output.lines().next().unwrap_or("")
    );

    let version = parse_version_string(&version_output).ok_or_else(|| {
        LauncherError::JavaExecution(format!(
            "{} did not report a version",
            path.display()
        ))
    })?;
    let major = parse_major_version(&version);

    Ok(JavaInstallation {
        path: path.to_path_buf(),
        version,
        major,
    })
}

/// Locate Java on `PATH` and probe it.
pub async fn detect_java() -> LauncherResult<JavaInstallation> {
    let path = find_java_on_path()
        .ok_or_else(|| LauncherError::JavaExecution("no java executable on PATH".into()))?;
    let installation = probe_java(&path).await?;
    info!(
        "Found Java {} (major {}) at {:?}",
        installation.version, installation.major, installation.path
    );
    Ok(installation)
}

fn parse_version_string(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let start = line.find('"')?;
        let end = line[start + 1..].find('"')?;
        Some(line[start + 1..start + 1 + end].to_string())
    })
}

fn parse_major_version(version: &str) -> u32 {
    let first_part = version.split('.').next().unwrap_or("0");
    let major: u32 = first_part.parse().unwrap_or(0);

    if major == 1 {
        version
            .split('.')
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(major)
    } else {
        major
    }
}
