use anyhow::{bail, Result};
use colored::Colorize;

use super::{load_manager, runtime};
use crate::core::binaries::{BinarySource, ResolvedBinary};
use crate::ui;

fn describe(label: &str, binary: &ResolvedBinary) {
    let source = match (binary.source, binary.located) {
        (BinarySource::Bundled, true) => "bundled".green(),
        (BinarySource::System, true) => "system".cyan(),
        (_, false) => "not found".red(),
    };
    println!("  {:<8} {} ({})", label.white().bold(), binary.display_name(), source);
}

pub fn execute() -> Result<()> {
    let manager = load_manager()?;
    let binaries = manager.binaries();

    println!("{}", "Binaries:".white().bold());
    describe("yt-dlp", &binaries.fetcher);
    describe("ffmpeg", &binaries.processor);
    println!();

    let version = runtime()?.block_on(manager.fetcher_version());
    match version {
        Some(version) => {
            println!("{} {}", "✓ yt-dlp is available, version".green(), version.yellow());
            if binaries.processor_location().is_none() {
                ui::warn("ffmpeg was not found, audio extraction and remuxing will fail");
            }
            Ok(())
        }
        None => {
            ui::dimmed("Run 'assetdl install' to download the binaries.");
            bail!("yt-dlp is not available")
        }
    }
}
