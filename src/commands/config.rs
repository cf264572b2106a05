use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::config::KEYS;
use crate::core::{validation, Config};
use crate::ui;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set", sub_matches)) => set(sub_matches),
        Some(("reset", _)) => reset(),
        _ => {
            println!("Use 'assetdl config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{} {}", "Settings file:".white().bold(), path.display().to_string().dimmed());
    println!();

    let dirs = &config.asset_directories;
    println!("  {:<14} {}", "sound_effects", dirs.sound_effects.display());
    println!("  {:<14} {}", "music", dirs.music.display());
    println!("  {:<14} {}", "videos", dirs.videos.display());
    println!("  {:<14} {}", "downloads", dirs.downloads.display());
    println!("  {:<14} {}", "auto_import", config.auto_import);
    println!(
        "  {:<14} {}",
        "binaries_dir",
        config.binaries_dir.as_deref().unwrap_or("(next to executable)")
    );

    Ok(())
}

fn set(matches: &clap::ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    if !KEYS.contains(&key.as_str()) {
        bail!("Unknown setting '{}'. Valid keys: {}", key, KEYS.join(", "));
    }

    let mut config = Config::load()?;

    let clears_binaries_dir = key == "binaries_dir" && value.trim().is_empty();
    if key == "auto_import" || clears_binaries_dir {
        config.set_value(key, value)?;
    } else {
        validation::validate_directory_path(value)?;
        let path = Path::new(value);
        if !path.exists() {
            ui::warn(&format!("Path '{}' does not exist", value));
            ui::dimmed("It will be created when first used.");
        }
        let resolved = if path.exists() {
            path.canonicalize()
                .with_context(|| format!("Failed to resolve path: {}", value))?
                .to_string_lossy()
                .to_string()
        } else {
            value.clone()
        };
        config.set_value(key, &resolved)?;
    }

    config.save()?;
    println!("{} {} = {}", "✓ Saved".green(), key.white().bold(), value);
    Ok(())
}

fn reset() -> Result<()> {
    let mut config = Config::load()?;
    config.reset_to_defaults();
    config.save()?;
    ui::success("✓ Settings reset to defaults");
    Ok(())
}
