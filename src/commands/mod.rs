// Command handlers module
pub mod check;
pub mod config;
pub mod download;
pub mod import;
pub mod info;
pub mod install;
pub mod version;

use anyhow::{Context, Result};

use crate::core::{Config, DownloadManager};

// Re-exports for cleaner imports
pub use check::execute as check;
pub use download::execute as download;
pub use import::execute as import;
pub use info::execute as info;
pub use install::execute as install;
pub use version::execute as version;

/// Runtime for commands that drive the async download manager
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Manager built from the saved settings
pub(crate) fn load_manager() -> Result<DownloadManager> {
    let config = Config::load()?;
    Ok(DownloadManager::from_config(&config))
}
