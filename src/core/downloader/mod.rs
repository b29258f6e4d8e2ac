pub mod client;
pub mod progress;
pub mod resource;

pub use client::{sha1_file, DownloadOutcome, Downloader};
pub use resource::ResourceLocation;
