// assetdl Library - Public API

// Re-export error types
pub mod error;
pub use error::{MediaError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::downloader::{DownloadJob, DownloadManager, DownloadResult, ManagerConfig};
pub use core::options::{AssetCategory, DownloadOptions, Quality};

/// Initialize logging: `warn` by default, `debug` when verbose, `RUST_LOG` wins
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
