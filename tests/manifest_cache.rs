mod common;

use std::path::Path;
use std::time::{Duration, SystemTime};

use common::{downloader, FixtureServer, UNREACHABLE};
use mcserver_lib::core::error::LauncherError;
use mcserver_lib::core::version::{ManifestCache, ManifestEndpoints};

const MANIFESTS: [&str; 3] = [
    "/mc/version_manifest_v2.json",
    "/fabric/v2/versions",
    "/quilt/v3/versions",
];

fn manifest_hits(fixture: &FixtureServer) -> usize {
    MANIFESTS.iter().map(|path| fixture.hits(path)).sum()
}

fn age_manifest(cache_dir: &Path, age: Duration) {
    std::fs::File::options()
        .write(true)
        .open(cache_dir.join("minecraft_manifest.json"))
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

fn unreachable_endpoints() -> ManifestEndpoints {
    ManifestEndpoints {
        minecraft: format!("{UNREACHABLE}/mc.json"),
        fabric: format!("{UNREACHABLE}/fabric.json"),
        quilt: format!("{UNREACHABLE}/quilt.json"),
    }
}

/// Populate `cache_dir` from the fixture and hand back the fixture.
async fn warm_cache(cache_dir: &Path) -> FixtureServer {
    let fixture = FixtureServer::with_manifests();
    let cache = ManifestCache::new(cache_dir.to_path_buf(), fixture.endpoints());
    cache.ensure_ready(&downloader(), false).await.unwrap();
    fixture
}

#[tokio::test]
async fn first_run_fetches_everything() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let cache = ManifestCache::new(dir.path().join("cache"), fixture.endpoints());

    let snapshot = cache.ensure_ready(&downloader(), false).await.unwrap();
    assert!(!snapshot.stale);
    assert_eq!(snapshot.latest.minecraft_release, "1.20.4");
    assert_eq!(snapshot.latest.minecraft_snapshot, "24w06a");
    assert_eq!(snapshot.latest.fabric_installer, "1.0.0");
    assert_eq!(snapshot.latest.fabric_loader, "0.15.6");
    assert_eq!(snapshot.latest.quilt_installer, "0.9.1");
    assert_eq!(snapshot.latest.quilt_loader, "0.23.1");
    assert_eq!(manifest_hits(&fixture), 3);

    for file in ["minecraft_manifest.json", "fabric_manifest.json", "quilt_manifest.json"] {
        assert!(dir.path().join("cache").join(file).is_file(), "{file}");
    }
    assert!(!dir.path().join("cache/.staging").exists());
}

#[tokio::test]
async fn fresh_cache_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;
    age_manifest(&cache_dir, Duration::from_secs(5 * 60 * 60));

    let cache = ManifestCache::new(cache_dir, fixture.endpoints());
    cache.ensure_ready(&downloader(), false).await.unwrap();
    assert_eq!(manifest_hits(&fixture), 3);
}

#[tokio::test]
async fn old_cache_is_refreshed() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;
    age_manifest(&cache_dir, Duration::from_secs(7 * 60 * 60));

    let cache = ManifestCache::new(cache_dir.clone(), fixture.endpoints());
    let snapshot = cache.ensure_ready(&downloader(), false).await.unwrap();
    assert!(!snapshot.stale);
    assert_eq!(manifest_hits(&fixture), 6);

    let modified = std::fs::metadata(cache_dir.join("minecraft_manifest.json"))
        .unwrap()
        .modified()
        .unwrap();
    assert!(SystemTime::now().duration_since(modified).unwrap_or_default() < Duration::from_secs(60));
}

#[tokio::test]
async fn refresh_flag_forces_a_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;

    let cache = ManifestCache::new(cache_dir, fixture.endpoints());
    cache.ensure_ready(&downloader(), true).await.unwrap();
    assert_eq!(manifest_hits(&fixture), 6);
}

#[tokio::test]
async fn ensure_ready_runs_once_per_cache() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let cache = ManifestCache::new(dir.path().join("cache"), fixture.endpoints());
    let downloader = downloader();

    let first = cache.ensure_ready(&downloader, true).await.unwrap() as *const _;
    let second = cache.ensure_ready(&downloader, true).await.unwrap() as *const _;
    assert_eq!(first, second);
    assert_eq!(manifest_hits(&fixture), 3);
}

#[tokio::test]
async fn offline_with_cache_uses_stale_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    drop(warm_cache(&cache_dir).await);

    let cache = ManifestCache::new(cache_dir, unreachable_endpoints());
    let snapshot = cache.ensure_ready(&downloader(), true).await.unwrap();
    assert!(snapshot.stale);
    assert_eq!(snapshot.latest.minecraft_release, "1.20.4");
}

#[tokio::test]
async fn offline_without_cache_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ManifestCache::new(dir.path().join("cache"), unreachable_endpoints());

    let err = cache.ensure_ready(&downloader(), false).await.unwrap_err();
    assert!(matches!(err, LauncherError::ManifestsUnavailable), "{err}");
    assert!(!dir.path().join("cache/minecraft_manifest.json").exists());
}

#[tokio::test]
async fn partial_failure_keeps_the_old_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;
    let before = std::fs::read(cache_dir.join("minecraft_manifest.json")).unwrap();

    // Mojang answers with a new manifest, Quilt is down
    fixture.route(
        "/mc/version_manifest_v2.json",
        200,
        r#"{"latest": {"release": "9.9", "snapshot": "9.9"}, "versions": []}"#,
    );
    fixture.route("/quilt/v3/versions", 503, "maintenance");

    let cache = ManifestCache::new(cache_dir.clone(), fixture.endpoints());
    let snapshot = cache.ensure_ready(&downloader(), true).await.unwrap();
    assert!(snapshot.stale);
    assert_eq!(snapshot.latest.minecraft_release, "1.20.4");
    assert_eq!(
        std::fs::read(cache_dir.join("minecraft_manifest.json")).unwrap(),
        before
    );
    assert!(!cache_dir.join(".staging").exists());
}

#[tokio::test]
async fn garbage_from_the_network_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;
    fixture.route("/fabric/v2/versions", 200, "<html>captive portal</html>");

    let cache = ManifestCache::new(cache_dir.clone(), fixture.endpoints());
    let snapshot = cache.ensure_ready(&downloader(), true).await.unwrap();
    assert!(snapshot.stale);
    assert_eq!(snapshot.latest.fabric_loader, "0.15.6");
}

#[tokio::test]
async fn malformed_cache_asks_for_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let fixture = warm_cache(&cache_dir).await;
    std::fs::write(cache_dir.join("quilt_manifest.json"), "{ not json").unwrap();

    let cache = ManifestCache::new(cache_dir, fixture.endpoints());
    let err = cache.ensure_ready(&downloader(), false).await.unwrap_err();
    assert!(
        matches!(err, LauncherError::CorruptManifestCache { .. }),
        "{err}"
    );
    assert!(err.to_string().contains("--refresh"));
}
