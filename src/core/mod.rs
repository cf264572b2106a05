// Core business logic module

pub mod binaries;
pub mod checksum;
pub mod config;
pub mod downloader;
pub mod importer;
pub mod installer;
pub mod jobs;
pub mod media_info;
pub mod options;
pub mod progress;
pub mod url_normalizer;
pub mod validation;

// Re-export commonly used items
pub use binaries::{BinarySource, Binaries, ResolvedBinary};
pub use checksum::Checksum;
pub use config::{AssetDirectories, Config};
pub use downloader::{DownloadJob, DownloadManager, DownloadResult, ManagerConfig, ScratchSnapshot};
pub use importer::{import_download, import_file, unique_destination};
pub use installer::Installer;
pub use jobs::{JobId, JobRegistry};
pub use media_info::{MediaFormat, VideoInfo};
pub use options::{AssetCategory, DownloadOptions, PostProcessing, Quality};
pub use progress::{ProgressEvent, ProgressTracker};
pub use url_normalizer::{extract_video_id, normalize_url};
