pub mod cache;
pub mod manifest;
pub mod resolver;
pub mod server;
pub mod version_file;

pub use cache::{LatestPointers, ManifestCache, ManifestEndpoints, ManifestSnapshot, STALENESS_THRESHOLD};
pub use manifest::{InstallerEntry, LoaderEntry, LoaderManifest, VersionEntry, VersionManifest};
pub use resolver::VersionResolver;
pub use server::MinecraftServerVersion;
pub use version_file::VersionJson;
