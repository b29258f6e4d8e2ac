// ─── Launch Task ───
// Runs a server instance in its folder and waits for it to stop.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::InstanceConfig;
use crate::core::java;
use crate::core::version::{MinecraftServerVersion, VersionJson};

/// `java [java_args] -jar <jar> [server_args]`, run from the instance folder.
pub fn build_command(instance: &InstanceConfig, java_bin: &Path) -> LauncherResult<Command> {
    let jar = instance.launch_jar().ok_or_else(|| {
        LauncherError::Other(format!(
            "Instance '{}' has no server jar yet, run \"install\" first",
            instance.name
        ))
    })?;

    let mut cmd = Command::new(java_bin);
    cmd.args(&instance.java_args)
        .arg("-jar")
        .arg(&jar)
        .args(&instance.server_args)
        .current_dir(&instance.folder)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    Ok(cmd)
}

/// Start the server with the console attached and wait for it to exit.
pub async fn launch(instance: &InstanceConfig, java_bin: &Path) -> LauncherResult<()> {
    let mut cmd = build_command(instance, java_bin)?;

    info!("Starting '{}' ({}) with {:?}", instance.name, instance.describe(), java_bin);
    debug!("Command (copy/paste): {}", format_command_for_logs(cmd.as_std()));

    let status = cmd
        .status()
        .await
        .map_err(|e| LauncherError::JavaExecution(format!("{}: {}", java_bin.display(), e)))?;

    if !status.success() {
        return Err(LauncherError::ServerExited {
            name: instance.name.clone(),
            code: status.code(),
        });
    }

    info!("Server '{}' stopped", instance.name);
    Ok(())
}

/// Warn when `java_bin` is older than the Java the version manifest asks for.
pub async fn check_java(java_bin: &Path, versions_dir: &Path, server: &MinecraftServerVersion) {
    let manifest = server.version_manifest.path_in(versions_dir);
    let required = match VersionJson::load(&manifest).await {
        Ok(version) => version.required_java_major(),
        Err(e) => {
            debug!("Cannot read {:?}: {}", manifest, e);
            return;
        }
    };

    match java::probe_java(java_bin).await {
        Ok(found) if found.major < required => warn!(
            "{} needs Java {} but {:?} is Java {}, the server will probably not start",
            server, required, java_bin, found.major
        ),
        Ok(found) => debug!("Java {} satisfies {} (needs {})", found.major, server, required),
        Err(e) => debug!("Could not check the Java version: {}", e),
    }
}

fn format_command_for_logs(cmd: &std::process::Command) -> String {
    let program = shell_escape(&cmd.get_program().to_string_lossy());
    let args = cmd
        .get_args()
        .map(|arg| shell_escape(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
