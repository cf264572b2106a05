use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::core::{import_file, AssetCategory, Config};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let category: AssetCategory = matches
        .get_one::<String>("category")
        .context("Category is required")?
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let files: Vec<PathBuf> = matches
        .get_many::<String>("files")
        .context("At least one file is required")?
        .map(PathBuf::from)
        .collect();

    let config = Config::load()?;
    let dest_dir = config.category_dir(category);

    let mut failed = 0;
    for file in &files {
        match import_file(file, dest_dir) {
            Ok(dest) => println!(
                "{} {} -> {}",
                "✓".green(),
                file.display(),
                dest.display().to_string().dimmed()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}", "✗".red(), e);
            }
        }
    }

    let imported = files.len() - failed;
    println!(
        "{}",
        format!("Imported {} file(s) into {}", imported, category.label()).green().bold()
    );

    if failed > 0 {
        bail!("{} file(s) could not be imported", failed);
    }

    Ok(())
}
