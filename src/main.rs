use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use assetdl::commands;
use assetdl::ui;

fn cli() -> Command {
    Command::new("assetdl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download, classify and import sound effects, music and video")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show debug logging (RUST_LOG overrides)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("check").about("Check that yt-dlp and ffmpeg can be found"))
        .subcommand(
            Command::new("info")
                .about("Show metadata of a remote video without downloading it")
                .arg(
                    Arg::new("url")
                        .help("Video URL")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("formats")
                        .short('f')
                        .long("formats")
                        .help("List the available formats")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("download")
                .about("Download a video or its audio and import it into the library")
                .arg(
                    Arg::new("url")
                        .help("Video URL")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .value_name("CATEGORY")
                        .help("Library category: music, sfx, vfx or none (default: music)")
                        .value_parser(["music", "sfx", "vfx", "none"]),
                )
                .arg(
                    Arg::new("quality")
                        .short('q')
                        .long("quality")
                        .value_name("QUALITY")
                        .help("best, worst, an audio quality (0-10), a bitrate (128k) or a height (720p)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("TEMPLATE")
                        .help("Output template below the download directory (default: %(title)s.%(ext)s)"),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Explicit yt-dlp format code"),
                )
                .arg(
                    Arg::new("audio-only")
                        .short('a')
                        .long("audio-only")
                        .help("Extract audio (only used with --category none)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-import")
                        .long("no-import")
                        .help("Leave the file in the download directory")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Copy local files into a library category")
                .arg(
                    Arg::new("files")
                        .help("Files to import")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .value_name("CATEGORY")
                        .help("Library category: music, sfx or vfx")
                        .required(true)
                        .value_parser(["music", "sfx", "vfx"]),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings (use 'assetdl config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show current settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(
                            Arg::new("key")
                                .help("sound_effects, music, videos, downloads, auto_import or binaries_dir")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value")
                                .required(true)
                                .allow_hyphen_values(true)
                                .index(2),
                        ),
                )
                .subcommand(Command::new("reset").about("Restore default settings")),
        )
        .subcommand(
            Command::new("install")
                .about("Download yt-dlp (and ffmpeg where available) into the binaries directory")
                .arg(
                    Arg::new("fetcher-only")
                        .long("fetcher-only")
                        .help("Only install yt-dlp")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("check", _)) => commands::check(),
        Some(("info", sub_matches)) => commands::info(sub_matches),
        Some(("download", sub_matches)) => commands::download(sub_matches),
        Some(("import", sub_matches)) => commands::import(sub_matches),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        Some(("install", sub_matches)) => commands::install(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Welcome to assetdl!");
            println!("Use 'assetdl --help' for more information.");
            Ok(())
        }
    }
}

fn main() {
    let matches = cli().get_matches();
    assetdl::init_logging(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
