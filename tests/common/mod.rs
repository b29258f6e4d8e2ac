#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use mcserver_lib::core::downloader::Downloader;
use mcserver_lib::core::http::build_http_client;
use mcserver_lib::core::version::ManifestEndpoints;
use sha1::{Digest, Sha1};
use tiny_http::{Response, Server};

pub const SERVER_JAR: &[u8] = b"pretend this is a minecraft server jar";
pub const QUILT_INSTALLER: &[u8] = b"pretend this is the quilt installer";
pub const FABRIC_INSTALLER: &[u8] = b"pretend this is the fabric installer";

/// Never listens; connections are refused straight away.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

pub fn downloader() -> Downloader {
    Downloader::new(build_http_client().unwrap()).with_progress(false)
}

type Routes = Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>;

/// Local HTTP server with fixed responses per path and a request counter.
pub struct FixtureServer {
    pub base: String,
    server: Arc<Server>,
    routes: Routes,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    worker: Option<JoinHandle<()>>,
}

impl FixtureServer {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let routes: Routes = Arc::default();
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();

        let worker = {
            let server = Arc::clone(&server);
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    let path = request.url().to_string();
                    *hits.lock().unwrap().entry(path.clone()).or_default() += 1;
                    let route = routes.lock().unwrap().get(&path).cloned();
                    let response = match route {
                        Some((status, body)) => Response::from_data(body).with_status_code(status),
                        None => Response::from_data(b"not found".to_vec()).with_status_code(404),
                    };
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            base: format!("http://{addr}"),
            server,
            routes,
            hits,
            worker: Some(worker),
        }
    }

    /// Server with the Mojang, Fabric and Quilt documents a full install needs.
    pub fn with_manifests() -> Self {
        let fixture = Self::start();
        fixture.serve_manifests();
        fixture
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn endpoints(&self) -> ManifestEndpoints {
        ManifestEndpoints {
            minecraft: self.url("/mc/version_manifest_v2.json"),
            fabric: self.url("/fabric/v2/versions"),
            quilt: self.url("/quilt/v3/versions"),
        }
    }

    pub fn serve_manifests(&self) {
        let version_json = serde_json::json!({
            "id": "1.20.4",
            "type": "release",
            "downloads": {
                "server": {
                    "sha1": sha1_hex(SERVER_JAR),
                    "size": SERVER_JAR.len(),
                    "url": self.url("/objects/server.jar"),
                }
            }
        })
        .to_string();
        let ancient_json = serde_json::json!({
            "id": "1.2.5",
            "type": "release",
            "downloads": {}
        })
        .to_string();

        let manifest = serde_json::json!({
            "latest": { "release": "1.20.4", "snapshot": "24w06a" },
            "versions": [
                {
                    "id": "24w06a",
                    "type": "snapshot",
                    "url": self.url("/v1/packages/24w06a.json"),
                    "sha1": sha1_hex(b"unused"),
                },
                {
                    "id": "1.20.4",
                    "type": "release",
                    "url": self.url("/v1/packages/1.20.4.json"),
                    "sha1": sha1_hex(version_json.as_bytes()),
                },
                {
                    "id": "1.2.5",
                    "type": "release",
                    "url": self.url("/v1/packages/1.2.5.json"),
                    "sha1": sha1_hex(ancient_json.as_bytes()),
                }
            ]
        });

        let fabric = serde_json::json!({
            "installer": [
                { "url": self.url("/maven/fabric-installer-1.0.1.jar"), "version": "1.0.1", "stable": false },
                { "url": self.url("/maven/fabric-installer-1.0.0.jar"), "version": "1.0.0", "stable": true }
            ],
            "loader": [
                { "version": "0.15.7", "stable": false },
                { "version": "0.15.6", "stable": true }
            ]
        });
        let quilt = serde_json::json!({
            "installer": [
                { "url": self.url("/maven/quilt-installer-0.9.1.jar"), "version": "0.9.1" }
            ],
            "loader": [
                { "version": "0.23.1" },
                { "version": "0.23.0" }
            ]
        });

        self.route("/mc/version_manifest_v2.json", 200, manifest.to_string());
        self.route("/fabric/v2/versions", 200, fabric.to_string());
        self.route("/quilt/v3/versions", 200, quilt.to_string());
        self.route("/v1/packages/1.20.4.json", 200, version_json);
        self.route("/v1/packages/1.2.5.json", 200, ancient_json);
        self.route("/objects/server.jar", 200, SERVER_JAR);
        self.route("/maven/quilt-installer-0.9.1.jar", 200, QUILT_INSTALLER);
        self.route(
            "/maven/quilt-installer-0.9.1.jar.sha1",
            200,
            sha1_hex(QUILT_INSTALLER),
        );
        self.route("/maven/fabric-installer-1.0.0.jar", 200, FABRIC_INSTALLER);
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Shell script standing in for `java`: records its arguments in
/// `<dir>/java-args.txt` and exits with `exit_code`.
#[cfg(unix)]
pub fn fake_java(dir: &Path, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("java");
    let log = dir.join("java-args.txt");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\nexit {}\n",
            log.display(),
            exit_code
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Invocations recorded by [`fake_java`], one line each.
pub fn java_invocations(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("java-args.txt"))
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
