use anyhow::{Context, Result};
use colored::Colorize;

use super::{load_manager, runtime};
use crate::core::media_info::{MediaFormat, VideoInfo};
use crate::core::validation;
use crate::ui::{format_duration, format_size};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .context("URL is required")?;
    let show_formats = matches.get_flag("formats");

    validation::validate_url(url).with_context(|| format!("Invalid URL: {}", url))?;

    let manager = load_manager()?;
    let info = runtime()?
        .block_on(manager.get_video_info(url))
        .context("Could not load info")?;

    print_info(&info);
    if show_formats {
        print_formats(&info.formats);
    }

    Ok(())
}

fn print_info(info: &VideoInfo) {
    println!("{} {}", "Title:".white().bold(), info.title);
    if let Some(duration) = info.duration {
        println!("{} {}", "Duration:".white().bold(), format_duration(duration));
    }
    if let Some(uploader) = &info.uploader {
        println!("{} {}", "Uploader:".white().bold(), uploader);
    }
    if let Some(thumbnail) = &info.thumbnail {
        println!("{} {}", "Thumbnail:".white().bold(), thumbnail.dimmed());
    }
    println!("{} {}", "Formats:".white().bold(), info.formats.len());
}

fn print_formats(formats: &[MediaFormat]) {
    if formats.is_empty() {
        return;
    }

    println!();
    println!(
        "{}",
        format!("{:<12} {:<6} {:<12} {:>10}", "ID", "EXT", "STREAMS", "SIZE").dimmed()
    );

    for format in formats {
        let streams = match (format.has_audio(), format.has_video()) {
            (true, true) => "audio+video",
            (true, false) => "audio",
            (false, true) => "video",
            (false, false) => "-",
        };
        let size = format
            .filesize
            .map(format_size)
            .unwrap_or_else(|| "?".to_string());

        println!(
            "{:<12} {:<6} {:<12} {:>10}",
            format.format_id,
            format.ext.as_deref().unwrap_or("-"),
            streams,
            size
        );
    }
}
