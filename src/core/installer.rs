// Installer - downloads the fetcher and processor into the bundled binaries layout
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::core::binaries::{FETCHER_NAME, PROCESSOR_NAME};
use crate::core::checksum::Checksum;
use crate::platform::{executable_name, platform_dir};

const FETCHER_RELEASE_BASE: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download";
const FETCHER_SUMS: &str = "SHA2-256SUMS";
const USER_AGENT: &str = concat!("assetdl/", env!("CARGO_PKG_VERSION"));

/// Where the processor comes from on this platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorSource {
    /// Zip archive containing the executable somewhere inside
    Zip { url: &'static str, entry: &'static str },
    /// No portable build is fetched; the system package manager should be used
    SystemPackage,
}

/// Release asset name of the fetcher for this platform
pub fn fetcher_asset_name() -> Option<&'static str> {
    if cfg!(target_os = "windows") {
        Some("yt-dlp.exe")
    } else if cfg!(target_os = "macos") {
        Some("yt-dlp_macos")
    } else if cfg!(target_os = "linux") {
        Some("yt-dlp")
    } else {
        None
    }
}

pub fn processor_source() -> ProcessorSource {
    if cfg!(target_os = "windows") {
        ProcessorSource::Zip {
            url: "https://www.gyan.dev/ffmpeg/builds/packages/ffmpeg-7.1.1-essentials_build.zip",
            entry: "ffmpeg.exe",
        }
    } else if cfg!(target_os = "macos") {
        ProcessorSource::Zip {
            url: "https://evermeet.cx/ffmpeg/ffmpeg-6.1.zip",
            entry: "ffmpeg",
        }
    } else {
        ProcessorSource::SystemPackage
    }
}

/// Read the first archive entry whose file name is `entry_name`
pub fn extract_from_zip(bytes: &[u8], entry_name: &str) -> Result<Vec<u8>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("Failed to read ZIP archive")?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if !file.is_file() {
            continue;
        }
        let matches = Path::new(file.name())
            .file_name()
            .is_some_and(|name| name == entry_name);
        if matches {
            log::debug!("Extracting {} from archive", file.name());
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)?;
            return Ok(buffer);
        }
    }

    Err(anyhow!("{} not found in ZIP archive", entry_name))
}

pub struct Installer {
    binaries_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl Installer {
    pub fn new(binaries_dir: PathBuf) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            binaries_dir,
            client,
        })
    }

    /// Platform directory executables are installed into
    pub fn install_dir(&self) -> Result<PathBuf> {
        let dir = platform_dir().ok_or_else(|| anyhow!("No bundled binaries for this platform"))?;
        Ok(self.binaries_dir.join(dir))
    }

    /// Download the latest fetcher release
    ///
    /// The binary is checked against the release's published sums when they
    /// can be fetched.
    pub fn install_fetcher(&self) -> Result<PathBuf> {
        let asset = fetcher_asset_name()
            .ok_or_else(|| anyhow!("No {} release for this platform", FETCHER_NAME))?;
        let url = format!("{}/{}", FETCHER_RELEASE_BASE, asset);

        println!("{}", format!("Downloading {}...", FETCHER_NAME).cyan());
        println!("{} {}", "URL:".dimmed(), url.dimmed());
        let data = self.fetch_bytes(&url)?;
        println!("{} {} bytes", "Downloaded:".green(), data.len());

        let target = self.install_dir()?.join(executable_name(FETCHER_NAME));
        let expected = self.fetch_expected_hash(asset);
        write_executable(&target, &data, expected.as_deref())?;

        println!("{} {}", "✓ Installed".green(), target.display());
        Ok(target)
    }

    /// Download and unpack the processor. Returns `None` where a system
    /// package is expected instead.
    pub fn install_processor(&self) -> Result<Option<PathBuf>> {
        let (url, entry) = match processor_source() {
            ProcessorSource::Zip { url, entry } => (url, entry),
            ProcessorSource::SystemPackage => {
                println!(
                    "{}",
                    format!(
                        "{} is not bundled on this platform, install it with your package manager (e.g. apt install ffmpeg)",
                        PROCESSOR_NAME
                    )
                    .yellow()
                );
                return Ok(None);
            }
        };

        println!("{}", format!("Downloading {}...", PROCESSOR_NAME).cyan());
        println!("{} {}", "URL:".dimmed(), url.dimmed());
        let archive = self.fetch_bytes(url)?;
        println!("{} {} bytes", "Downloaded:".green(), archive.len());

        println!("{}", "Extracting...".cyan());
        let data = extract_from_zip(&archive, entry)?;

        let target = self.install_dir()?.join(executable_name(PROCESSOR_NAME));
        write_executable(&target, &data, None)?;

        println!("{} {}", "✓ Installed".green(), target.display());
        Ok(Some(target))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} while downloading {}", response.status(), url);
        }

        Ok(response.bytes()?.to_vec())
    }

    fn fetch_expected_hash(&self, asset: &str) -> Option<String> {
        let url = format!("{}/{}", FETCHER_RELEASE_BASE, FETCHER_SUMS);
        let sums = match self.fetch_bytes(&url) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
            Err(e) => {
                log::warn!("Could not fetch {}: {}; skipping verification", FETCHER_SUMS, e);
                return None;
            }
        };

        let hash = Checksum::find_in_sums(&sums, asset);
        if hash.is_none() {
            log::warn!("{} has no entry for {}", FETCHER_SUMS, asset);
        }
        hash
    }
}

/// Write `data` to `target`, verifying it first when a hash is given
///
/// The file is staged next to the target so a failed verification never
/// replaces a working binary.
pub fn write_executable(target: &Path, data: &[u8], expected_hash: Option<&str>) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let staged = target.with_extension("download");
    fs::write(&staged, data).with_context(|| format!("Failed to write {:?}", staged))?;

    if let Some(expected) = expected_hash {
        if let Err(e) = Checksum::verify(&staged, expected) {
            let _ = fs::remove_file(&staged);
            return Err(e.context(format!("Checksum verification failed for {:?}", target)));
        }
        log::info!("Checksum verified for {:?}", target);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&staged, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to mark {:?} executable", staged))?;
    }

    fs::rename(&staged, target)
        .with_context(|| format!("Failed to move {:?} into place", target))?;

    Ok(())
}
