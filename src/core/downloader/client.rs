use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use sha1::{Digest, Sha1};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::progress::TransferProgress;
use crate::core::error::{LauncherError, LauncherResult};

const READ_CHUNK: usize = 64 * 1024;

/// What a download call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was already in place and valid.
    Skipped,
    /// The file was fetched over HTTP.
    Downloaded { bytes: u64 },
    /// The file was copied from a local path.
    Copied { bytes: u64 },
}

impl DownloadOutcome {
    /// Whether anything was written to the target folder.
    pub fn performed(&self) -> bool {
        !matches!(self, DownloadOutcome::Skipped)
    }

    pub fn bytes_transferred(&self) -> u64 {
        match self {
            DownloadOutcome::Skipped => 0,
            DownloadOutcome::Downloaded { bytes } | DownloadOutcome::Copied { bytes } => *bytes,
        }
    }
}

/// Sequential, SHA-1 validated downloader.
///
/// Every transfer is streamed to a `.part` file next to the destination while
/// being hashed, and renamed into place only once the digest matched.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    /// Draw progress bars on stderr.
    show_progress: bool,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    // ── Remote ──────────────────────────────────────────

    /// Stream `url` into `dest`, validating SHA-1 when `sha1_expected` is set.
    ///
    /// Returns the number of bytes written. On any failure the partial file is
    /// removed and `dest` is left untouched.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
        size_hint: Option<u64>,
    ) -> LauncherResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LauncherError::io(parent))?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = size_hint.or(response.content_length());
        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        info!("Downloading {}", file_name);

        let part = part_path(dest);
        let progress = TransferProgress::new(&file_name, total, self.show_progress);
        let started = Instant::now();

        let result = stream_to_file(response, &part, &progress).await;
        let (bytes, actual) = match result {
            Ok(done) => done,
            Err(e) => {
                progress.abandon();
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        };
        progress.finish();

        if let Some(expected) = sha1_expected {
            if !actual.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(LauncherError::IntegrityMismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(LauncherError::io(dest))?;

        info!(
            "Downloaded {} in {:.2?}, {} bytes",
            file_name,
            started.elapsed(),
            bytes
        );
        Ok(bytes)
    }

    // ── Local ───────────────────────────────────────────

    /// Copy a local file into `dest`, keeping its permissions and modification
    /// time. Like a download, the copy lands in a `.part` file first and only
    /// replaces `dest` once it matched `sha1_expected`.
    pub async fn copy_local(
        &self,
        source: &Path,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> LauncherResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LauncherError::io(parent))?;
        }

        let part = part_path(dest);
        let bytes = match copy_verified(source, &part, dest, sha1_expected).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&part, dest)
            .await
            .map_err(LauncherError::io(dest))?;

        debug!("Copied {:?} -> {:?} ({} bytes)", source, dest, bytes);
        Ok(bytes)
    }

    // ── Validation ──────────────────────────────────────

    /// Validate an existing file's SHA-1.
    pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<bool> {
        let actual = sha1_file(path).await?;
        Ok(actual.eq_ignore_ascii_case(expected))
    }

    /// Fetch a small text document, `None` when the server does not have it.
    pub async fn fetch_text(&self, url: &str) -> LauncherResult<Option<String>> {
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

async fn stream_to_file(
    response: reqwest::Response,
    part: &Path,
    progress: &TransferProgress,
) -> LauncherResult<(u64, String)> {
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(LauncherError::io(part))?;
    let mut hasher = Sha1::new();
    let mut written = 0_u64;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(LauncherError::io(part))?;
        written += chunk.len() as u64;
        progress.advance(chunk.len() as u64);
    }

    file.flush().await.map_err(LauncherError::io(part))?;
    // the handle has to be closed before the rename on Windows
    drop(file);

    Ok((written, hex::encode(hasher.finalize())))
}

async fn copy_verified(
    source: &Path,
    part: &Path,
    dest: &Path,
    sha1_expected: Option<&str>,
) -> LauncherResult<u64> {
    let bytes = tokio::fs::copy(source, part)
        .await
        .map_err(LauncherError::io(source))?;

    let source_path = source.to_path_buf();
    let target = part.to_path_buf();
    tokio::task::spawn_blocking(move || -> LauncherResult<()> {
        let modified = std::fs::metadata(&source_path)
            .and_then(|m| m.modified())
            .map_err(LauncherError::io(&source_path))?;
        std::fs::File::options()
            .write(true)
            .open(&target)
            .and_then(|f| f.set_modified(modified))
            .map_err(LauncherError::io(&target))
    })
    .await
    .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))??;

    if let Some(expected) = sha1_expected {
        let actual = sha1_file(part).await?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(LauncherError::IntegrityMismatch {
                path: dest.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
    }
    Ok(bytes)
}

/// Hex SHA-1 of a file, read in fixed-size chunks.
pub async fn sha1_file(path: &Path) -> LauncherResult<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(LauncherError::io(path))?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0_u8; READ_CHUNK];
    loop {
        let read = file.read(&mut buf).await.map_err(LauncherError::io(path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_byte_counts() {
        assert_eq!(DownloadOutcome::Skipped.bytes_transferred(), 0);
        assert!(!DownloadOutcome::Skipped.performed());
        assert_eq!(
            DownloadOutcome::Downloaded { bytes: 42 }.bytes_transferred(),
            42
        );
        assert!(DownloadOutcome::Copied { bytes: 0 }.performed());
    }

    #[test]
    fn part_file_sits_next_to_destination() {
        let dest = Path::new("/tmp/server/server.jar");
        assert_eq!(part_path(dest), PathBuf::from("/tmp/server/server.jar.part"));
    }

    #[tokio::test]
    async fn sha1_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let digest = sha1_file(&path).await.unwrap();
        assert_eq!(digest, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert!(
            Downloader::validate_sha1(&path, "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED")
                .await
                .unwrap()
        );
    }
}
