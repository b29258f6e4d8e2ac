// ─── mcserver Core ───
// Minecraft server instance manager.
//
// Architecture:
//   core/
//     downloader/ — Resource locations, streamed SHA-1 verified downloads
//     version/    — Manifest cache, version resolution, per-version files
//     loaders/    — Fabric/Quilt installers and the installation planner
//     instance/   — Instance config + CRUD manager + install flow
//     launch/     — Server process runner
//     java/       — Java discovery on PATH
//     state/      — Paths, launcher.json, file locks

pub mod downloader;
pub mod error;
pub mod http;
pub mod instance;
pub mod java;
pub mod launch;
pub mod loaders;
pub mod state;
pub mod version;
