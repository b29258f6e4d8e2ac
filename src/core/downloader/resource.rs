use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{sha1_file, DownloadOutcome, Downloader};
use crate::core::error::{LauncherError, LauncherResult};

/// A single downloadable artifact: remote URL or local path, plus optional
/// integrity metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLocation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
}

impl ResourceLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sha1: None,
            size: None,
            filename: None,
        }
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Local file name: the override if set, else the last segment of the URL.
    pub fn filename(&self) -> &str {
        if let Some(name) = &self.filename {
            return name;
        }
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(path)
    }

    pub fn path_in(&self, folder: &Path) -> PathBuf {
        folder.join(self.filename())
    }

    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    fn local_source(&self) -> PathBuf {
        PathBuf::from(self.url.strip_prefix("file://").unwrap_or(&self.url))
    }

    /// True when the file exists in `folder` and, if a digest is known, matches it.
    pub async fn check(&self, folder: &Path) -> bool {
        let path = self.path_in(folder);
        if !path.is_file() {
            return false;
        }
        let Some(expected) = &self.sha1 else {
            return true;
        };
        match Downloader::validate_sha1(&path, expected).await {
            Ok(valid) => valid,
            Err(e) => {
                debug!("Cannot hash {:?}: {}", path, e);
                false
            }
        }
    }

    /// Make sure the artifact is present and valid in `folder`.
    ///
    /// Nothing is transferred when the file already exists and `force` is off,
    /// unless `check` is on and the existing file fails its digest.
    pub async fn download(
        &mut self,
        downloader: &Downloader,
        folder: &Path,
        force: bool,
        check: bool,
    ) -> LauncherResult<DownloadOutcome> {
        tokio::fs::create_dir_all(folder)
            .await
            .map_err(LauncherError::io(folder))?;

        let dest = self.path_in(folder);
        if !force && dest.is_file() && (!check || self.check(folder).await) {
            debug!("{} is in place, skipping", self.filename());
            return Ok(DownloadOutcome::Skipped);
        }

        if self.is_remote() {
            let bytes = downloader
                .download_file(&self.url, &dest, self.sha1.as_deref(), self.size)
                .await
                .map_err(|e| match e {
                    LauncherError::DownloadFailed { status: 404, .. } => {
                        LauncherError::ResourceNotFound {
                            url: self.url.clone(),
                            filename: self.filename().to_string(),
                        }
                    }
                    other => other,
                })?;
            self.size.get_or_insert(bytes);
            return Ok(DownloadOutcome::Downloaded { bytes });
        }

        let source = self.local_source();
        if !source.is_file() {
            return Err(LauncherError::ResourceNotFound {
                url: self.url.clone(),
                filename: self.filename().to_string(),
            });
        }

        if is_same_file(&source, &dest).await {
            // the artifact already lives in `folder`, copying would truncate it
            if check && !self.check(folder).await {
                let actual = sha1_file(&dest).await?;
                return Err(LauncherError::IntegrityMismatch {
                    path: dest,
                    expected: self.sha1.clone().unwrap_or_default(),
                    actual,
                });
            }
            debug!("{} is its own source, nothing to copy", self.filename());
            return Ok(DownloadOutcome::Skipped);
        }

        let bytes = downloader
            .copy_local(&source, &dest, self.sha1.as_deref())
            .await?;
        self.size.get_or_insert(bytes);
        Ok(DownloadOutcome::Copied { bytes })
    }
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl std::fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.filename())?;
        if let Some(size) = self.size {
            write!(f, " ({} bytes)", size)?;
        }
        Ok(())
    }
}
