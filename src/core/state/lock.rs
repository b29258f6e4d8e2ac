use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Locks older than this are assumed abandoned.
const LOCK_STALE_SECS: i64 = 60;
const LOCK_RETRY: Duration = Duration::from_millis(250);
const LOCK_ATTEMPTS: u32 = 80;

/// Advisory lock held as an exclusively created file containing the owner's
/// pid and a timestamp. Removed on drop.
pub struct FileLockGuard {
    path: PathBuf,
}

pub async fn acquire_file_lock(lock_path: &Path) -> LauncherResult<FileLockGuard> {
    let mut attempts = 0_u32;
    loop {
        attempts += 1;
        match tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(lock_path)
            .await
        {
            Ok(mut file) => {
                let payload = serde_json::json!({
                    "pid": std::process::id(),
                    "timestamp": Utc::now().timestamp(),
                });
                file.write_all(payload.to_string().as_bytes())
                    .await
                    .map_err(LauncherError::io(lock_path))?;
                return Ok(FileLockGuard {
                    path: lock_path.to_path_buf(),
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                cleanup_stale_lock(lock_path).await;
                if attempts >= LOCK_ATTEMPTS {
                    return Err(LauncherError::ConfigLock(lock_path.to_path_buf()));
                }
                if attempts % 20 == 0 {
                    info!("Waiting for lock at {:?}", lock_path);
                }
                tokio::time::sleep(LOCK_RETRY).await;
            }
            Err(source) => {
                return Err(LauncherError::Io {
                    path: lock_path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

async fn cleanup_stale_lock(lock_path: &Path) {
    let Ok(content) = tokio::fs::read_to_string(lock_path).await else {
        return;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) else {
        // its owner may still be writing it, only the file age tells
        if lock_age(lock_path).await > Some(Duration::from_secs(LOCK_STALE_SECS as u64)) {
            warn!("Removing unreadable stale lock {:?}", lock_path);
            let _ = tokio::fs::remove_file(lock_path).await;
        }
        return;
    };

    let pid = value.get("pid").and_then(|v| v.as_u64()).unwrap_or_default() as u32;
    let timestamp = value
        .get("timestamp")
        .and_then(|v| v.as_i64())
        .unwrap_or_default();
    let expired = Utc::now().timestamp().saturating_sub(timestamp) > LOCK_STALE_SECS;

    #[cfg(target_os = "linux")]
    let dead = !PathBuf::from(format!("/proc/{pid}")).exists();
    #[cfg(not(target_os = "linux"))]
    let dead = false;

    if expired || dead {
        warn!("Removing stale lock {:?} (pid {})", lock_path, pid);
        let _ = tokio::fs::remove_file(lock_path).await;
    }
}

async fn lock_age(lock_path: &Path) -> Option<Duration> {
    let modified = tokio::fs::metadata(lock_path).await.ok()?.modified().ok()?;
    modified.elapsed().ok()
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(source) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove lock {:?}: {}", self.path, source);
        }
    }
}
