use std::path::PathBuf;
use thiserror::Error;

use crate::core::loaders::LoaderKind;

/// Central error type for the whole manager.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Resource {filename} ({url}) could not be found")]
    ResourceNotFound { url: String, filename: String },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Manifests ───────────────────────────────────────
    #[error(
        "Neither are manifests cached nor are they reachable (Mojang, FabricMC or QuiltMC \
         manifests could not be fetched); check your internet connection"
    )]
    ManifestsUnavailable,

    #[error("Failed to read cached manifest {path:?} ({reason}), try running again with --refresh")]
    CorruptManifestCache { path: PathBuf, reason: String },

    // ── Versions ────────────────────────────────────────
    #[error(
        "Version {version} does not seem to be in the {component} version manifest, \
         please check the instance with \"show\" and fix it with \"modify\" if needed"
    )]
    InvalidVersion { version: String, component: String },

    #[error("Unknown mod loader \"{0}\", supported loaders are fabric and quilt")]
    UnknownLoader(String),

    #[error("Minecraft {0} does not provide a server download")]
    NoServerDownload(String),

    // ── Installer / Java ────────────────────────────────
    #[error("The {loader} installer failed (exit code {})", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    InstallerFailure { loader: LoaderKind, code: Option<i32> },

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Server {name} exited with code {}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ServerExited { name: String, code: Option<i32> },

    // ── Instance ────────────────────────────────────────
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Instance already exists: {0}")]
    InstanceAlreadyExists(String),

    // ── Config ──────────────────────────────────────────
    #[error("Could not lock launcher configuration at {0:?}")]
    ConfigLock(PathBuf),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    pub fn invalid_version(version: impl Into<String>, component: impl ToString) -> Self {
        LauncherError::InvalidVersion {
            version: version.into(),
            component: component.to_string(),
        }
    }

    /// Shorthand for the `map_err` closures wrapping filesystem calls.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| LauncherError::Io { path, source }
    }
}
