mod common;

use common::{downloader, sha1_hex, FixtureServer, SERVER_JAR};
use mcserver_lib::core::downloader::{DownloadOutcome, ResourceLocation};
use mcserver_lib::core::error::LauncherError;

#[tokio::test]
async fn second_download_transfers_nothing() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let downloader = downloader();
    let mut jar =
        ResourceLocation::new(fixture.url("/objects/server.jar")).with_sha1(sha1_hex(SERVER_JAR));

    let first = jar.download(&downloader, dir.path(), false, true).await.unwrap();
    assert_eq!(
        first,
        DownloadOutcome::Downloaded {
            bytes: SERVER_JAR.len() as u64
        }
    );
    assert_eq!(jar.size, Some(SERVER_JAR.len() as u64));

    let second = jar.download(&downloader, dir.path(), false, true).await.unwrap();
    assert_eq!(second, DownloadOutcome::Skipped);
    assert_eq!(second.bytes_transferred(), 0);
    assert_eq!(fixture.hits("/objects/server.jar"), 1);
    assert!(!dir.path().join("server.jar.part").exists());
}

#[tokio::test]
async fn corrupted_file_fails_check_and_is_refetched() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let downloader = downloader();
    let mut jar =
        ResourceLocation::new(fixture.url("/objects/server.jar")).with_sha1(sha1_hex(SERVER_JAR));

    jar.download(&downloader, dir.path(), false, true).await.unwrap();
    assert!(jar.check(dir.path()).await);

    let path = dir.path().join("server.jar");
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] ^= 0xff;
    std::fs::write(&path, bytes).unwrap();
    assert!(!jar.check(dir.path()).await);

    // without check the damaged file is trusted
    let unchecked = jar.download(&downloader, dir.path(), false, false).await.unwrap();
    assert_eq!(unchecked, DownloadOutcome::Skipped);

    let repaired = jar.download(&downloader, dir.path(), false, true).await.unwrap();
    assert!(repaired.performed());
    assert!(jar.check(dir.path()).await);
    assert_eq!(fixture.hits("/objects/server.jar"), 2);
}

#[tokio::test]
async fn force_downloads_even_when_valid() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let downloader = downloader();
    let mut jar = ResourceLocation::new(fixture.url("/objects/server.jar"));

    jar.download(&downloader, dir.path(), false, true).await.unwrap();
    let forced = jar.download(&downloader, dir.path(), true, true).await.unwrap();
    assert!(forced.performed());
    assert_eq!(fixture.hits("/objects/server.jar"), 2);
}

#[tokio::test]
async fn digest_mismatch_leaves_no_file_behind() {
    let fixture = FixtureServer::with_manifests();
    let dir = tempfile::tempdir().unwrap();
    let mut jar =
        ResourceLocation::new(fixture.url("/objects/server.jar")).with_sha1(sha1_hex(b"other"));

    let err = jar
        .download(&downloader(), dir.path(), false, true)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::IntegrityMismatch { .. }), "{err}");
    assert!(!dir.path().join("server.jar").exists());
    assert!(!dir.path().join("server.jar.part").exists());
}

#[tokio::test]
async fn missing_resources_are_reported_as_not_found() {
    let fixture = FixtureServer::start();
    let dir = tempfile::tempdir().unwrap();
    let downloader = downloader();

    let mut remote = ResourceLocation::new(fixture.url("/nothing/here.jar"));
    let err = remote
        .download(&downloader, dir.path(), false, true)
        .await
        .unwrap_err();
    assert!(
        matches!(&err, LauncherError::ResourceNotFound { filename, .. } if filename == "here.jar"),
        "{err}"
    );

    fixture.route("/broken.jar", 500, "boom");
    let mut broken = ResourceLocation::new(fixture.url("/broken.jar"));
    let err = broken
        .download(&downloader, dir.path(), false, true)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::DownloadFailed { status: 500, .. }), "{err}");

    let mut local = ResourceLocation::new(dir.path().join("absent.jar").to_string_lossy());
    let err = local
        .download(&downloader, &dir.path().join("out"), false, true)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::ResourceNotFound { .. }), "{err}");
}

#[tokio::test]
async fn local_files_are_copied_with_their_mtime() {
    let source_dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let source = source_dir.path().join("custom.jar");
    std::fs::write(&source, SERVER_JAR).unwrap();
    let old = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
    std::fs::File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(old)
        .unwrap();

    let mut jar = ResourceLocation::new(source.to_string_lossy()).with_sha1(sha1_hex(SERVER_JAR));
    let outcome = jar
        .download(&downloader(), target.path(), false, true)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        DownloadOutcome::Copied {
            bytes: SERVER_JAR.len() as u64
        }
    );

    let copied = target.path().join("custom.jar");
    assert_eq!(std::fs::read(&copied).unwrap(), SERVER_JAR);
    let copied_mtime = std::fs::metadata(&copied).unwrap().modified().unwrap();
    let delta = copied_mtime
        .duration_since(old)
        .unwrap_or_else(|e| e.duration());
    assert!(delta < std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn forced_copy_of_a_file_onto_itself_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let jar_path = dir.path().join("paper.jar");
    std::fs::write(&jar_path, SERVER_JAR).unwrap();

    let mut jar = ResourceLocation::new(jar_path.to_string_lossy()).with_sha1(sha1_hex(SERVER_JAR));
    let outcome = jar
        .download(&downloader(), dir.path(), true, true)
        .await
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Skipped);
    assert_eq!(std::fs::read(&jar_path).unwrap(), SERVER_JAR);

    // same through a path that only canonicalizes to the folder
    let mut unhashed = ResourceLocation::new(
        dir.path().join(".").join("paper.jar").to_string_lossy(),
    );
    unhashed
        .download(&downloader(), dir.path(), true, true)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&jar_path).unwrap(), SERVER_JAR);
    assert!(!dir.path().join("paper.jar.part").exists());
}

#[tokio::test]
async fn local_copy_with_wrong_digest_leaves_nothing_behind() {
    let source_dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let source = source_dir.path().join("custom.jar");
    std::fs::write(&source, SERVER_JAR).unwrap();

    let mut jar = ResourceLocation::new(source.to_string_lossy()).with_sha1(sha1_hex(b"other"));
    let err = jar
        .download(&downloader(), target.path(), false, true)
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::IntegrityMismatch { .. }), "{err}");
    assert!(!target.path().join("custom.jar").exists());
    assert!(!target.path().join("custom.jar.part").exists());

    // a forced copy that fails keeps the file that was there before
    std::fs::write(target.path().join("custom.jar"), b"previous").unwrap();
    jar.download(&downloader(), target.path(), true, true)
        .await
        .unwrap_err();
    assert_eq!(
        std::fs::read(target.path().join("custom.jar")).unwrap(),
        b"previous"
    );
    assert!(!target.path().join("custom.jar.part").exists());
    assert_eq!(std::fs::read(&source).unwrap(), SERVER_JAR);
}
