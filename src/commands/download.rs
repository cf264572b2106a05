use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;

use super::{load_manager, runtime};
use crate::core::{validation, AssetCategory, DownloadManager, DownloadOptions, DownloadResult, Quality};
use crate::error::MediaError;
use crate::ui::{clear_line, format_size, show_progress_bar};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .context("URL is required")?;
    validation::validate_url(url).with_context(|| format!("Invalid URL: {}", url))?;

    let options = build_options(matches)?;
    let manager = load_manager()?;

    let result = runtime()?.block_on(run(manager, url, options));

    match result {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("{}", "Download cancelled".yellow().bold());
            Err(e.into())
        }
        // Already reads "Download failed: <diagnostic>"
        Err(e @ MediaError::Execution(_)) => Err(e.into()),
        Err(e) => Err(anyhow::Error::new(e).context("Download failed")),
    }
}

fn build_options(matches: &clap::ArgMatches) -> Result<DownloadOptions> {
    let mut options = DownloadOptions::default();

    if let Some(category) = matches.get_one::<String>("category") {
        options.asset_category = if category == "none" {
            None
        } else {
            Some(category.parse::<AssetCategory>().map_err(|e| anyhow!(e))?)
        };
    }
    if let Some(quality) = matches.get_one::<String>("quality") {
        options.quality = quality.parse::<Quality>().map_err(|e| anyhow!(e))?;
    }
    if let Some(output) = matches.get_one::<String>("output") {
        validation::validate_output_template(output)
            .with_context(|| format!("Invalid output template: {}", output))?;
        options.output_template = output.clone();
    }
    options.format = matches.get_one::<String>("format").cloned();
    options.audio_only = matches.get_flag("audio-only");
    if matches.get_flag("no-import") {
        options.auto_import = Some(false);
    }

    Ok(options)
}

async fn run(
    manager: DownloadManager,
    url: &str,
    options: DownloadOptions,
) -> crate::error::Result<DownloadResult> {
    // Subscribe first so no event of this job is missed
    let mut events = manager.subscribe();
    let job = manager.start_download(url, options).await?;
    let id = job.id().clone();

    {
        let manager = manager.clone();
        let id = id.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!("{}", "Cancellation requested...".yellow().bold());
            manager.cancel_download(&id);
        }) {
            log::warn!("Failed to set Ctrl+C handler: {}", e);
        }
    }

    println!("{} {}", "Downloading".cyan(), url);
    show_progress_bar(0.0, "Progress");

    let outcome = job.wait();
    tokio::pin!(outcome);

    let result = loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Ok(event) if event.job_id == id => show_progress_bar(event.progress, "Progress"),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break (&mut outcome).await,
            },
            result = &mut outcome => break result,
        }
    };

    match &result {
        Ok(_) => clear_line(),
        Err(_) => println!(),
    }
    result
}

fn print_result(result: &DownloadResult) {
    println!(
        "{} {} ({})",
        "✓ Downloaded".green().bold(),
        result.file_name.white().bold(),
        format_size(result.file_size)
    );
    println!("  {}", result.file_path.display().to_string().dimmed());

    match result.imported_to {
        Some(category) => println!("  {} {}", "Imported into".green(), category.label()),
        None => println!("  {}", "Left in the download directory".dimmed()),
    }
}
