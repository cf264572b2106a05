use anyhow::Result;
use colored::Colorize;

use super::{load_manager, runtime};

pub fn execute() -> Result<()> {
    println!("assetdl version {}", env!("CARGO_PKG_VERSION"));

    let manager = load_manager()?;
    let fetcher = runtime()?.block_on(manager.fetcher_version());
    match fetcher {
        Some(version) => println!("yt-dlp version {}", version),
        None => println!("{}", "yt-dlp not available".dimmed()),
    }

    Ok(())
}
