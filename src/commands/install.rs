use anyhow::Result;

use crate::core::{Binaries, Config, Installer};
use crate::ui;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let fetcher_only = matches.get_flag("fetcher-only");

    let config = Config::load()?;
    let binaries_dir = config.binaries_dir().unwrap_or_else(Binaries::default_dir);
    ui::info(&format!("Installing into {}", binaries_dir.display()));
    println!();

    let installer = Installer::new(binaries_dir)?;
    installer.install_fetcher()?;

    if !fetcher_only {
        println!();
        installer.install_processor()?;
    }

    Ok(())
}
